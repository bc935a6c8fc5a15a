// SPDX-License-Identifier: CC0-1.0

//! Elliptic curve Diffie-Hellman over the supported curves.
//!
//! Every supported curve has cofactor one, so cofactor ECDH and plain ECDH
//! agree. The shared secret is the big-endian affine x-coordinate of the
//! shared point, as wide as the field.

use alloc::vec::Vec;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, Rng};
use secp256k1::{Secp256k1, Signing};
use zeroize::Zeroizing;

use crate::curve::Curve;
use crate::Error;

/// Shortest scalar encoding accepted before left padding, as in the RustCrypto curves.
const MIN_SECRET_KEY_LEN: usize = 24;

/// Raw ECDH output, wiped on drop.
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Shared secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A validated public key on one of the supported curves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(secp256k1::PublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

impl PublicKey {
    /// Decode a SEC1 encoded point, compressed or uncompressed, and check it
    /// lies on `curve`.
    ///
    /// # Errors
    ///
    /// * `InvalidPublicKey` - Bytes are not a valid encoding of a point on the curve.
    pub fn from_sec1_bytes(curve: Curve, bytes: &[u8]) -> Result<Self, Error> {
        let key = match curve {
            Curve::Secp256k1 => secp256k1::PublicKey::from_slice(bytes)
                .map(PublicKey::Secp256k1)
                .ok(),
            Curve::Prime256v1 => p256::PublicKey::from_sec1_bytes(bytes).map(PublicKey::P256).ok(),
            Curve::Secp384r1 => p384::PublicKey::from_sec1_bytes(bytes).map(PublicKey::P384).ok(),
            Curve::Secp521r1 => p521::PublicKey::from_sec1_bytes(bytes).map(PublicKey::P521).ok(),
        };
        key.ok_or(Error::InvalidPublicKey)
    }

    /// Curve the key belongs to.
    pub fn curve(&self) -> Curve {
        match self {
            PublicKey::Secp256k1(_) => Curve::Secp256k1,
            PublicKey::P256(_) => Curve::Prime256v1,
            PublicKey::P384(_) => Curve::Secp384r1,
            PublicKey::P521(_) => Curve::Secp521r1,
        }
    }

    /// Uncompressed SEC1 encoding, `0x04 || x || y`.
    pub fn to_uncompressed(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(pk) => pk.serialize_uncompressed().to_vec(),
            PublicKey::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            PublicKey::P384(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            PublicKey::P521(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        }
    }
}

/// A private scalar on one of the supported curves.
pub enum SecretKey {
    Secp256k1(secp256k1::SecretKey),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl SecretKey {
    /// Parse a big-endian private scalar for `curve`.
    ///
    /// Encodings shorter than the field width, down to 24 bytes, are left
    /// padded with zeros on every curve.
    ///
    /// # Errors
    ///
    /// * `InvalidSecretKey` - Bytes are not a non-zero scalar below the group order.
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self, Error> {
        let key = match curve {
            Curve::Secp256k1 => {
                if !(MIN_SECRET_KEY_LEN..=32).contains(&bytes.len()) {
                    return Err(Error::InvalidSecretKey);
                }
                let mut secret_key_buffer = Zeroizing::new([0u8; 32]);
                secret_key_buffer[32 - bytes.len()..].copy_from_slice(bytes);
                secp256k1::SecretKey::from_slice(&secret_key_buffer[..])
                    .map(SecretKey::Secp256k1)
                    .ok()
            }
            Curve::Prime256v1 => p256::SecretKey::from_slice(bytes).map(SecretKey::P256).ok(),
            Curve::Secp384r1 => p384::SecretKey::from_slice(bytes).map(SecretKey::P384).ok(),
            Curve::Secp521r1 => p521::SecretKey::from_slice(bytes).map(SecretKey::P521).ok(),
        };
        key.ok_or(Error::InvalidSecretKey)
    }

    /// Generate a random private scalar for `curve`.
    pub(crate) fn generate<R: Rng + CryptoRng>(curve: Curve, rng: &mut R) -> Self {
        match curve {
            Curve::Secp256k1 => {
                let mut secret_key_buffer = Zeroizing::new([0u8; 32]);
                // Out-of-range values are astronomically rare, draw again.
                loop {
                    rng.fill(&mut secret_key_buffer[..]);
                    if let Ok(sk) = secp256k1::SecretKey::from_slice(&secret_key_buffer[..]) {
                        return SecretKey::Secp256k1(sk);
                    }
                }
            }
            Curve::Prime256v1 => SecretKey::P256(p256::SecretKey::random(rng)),
            Curve::Secp384r1 => SecretKey::P384(p384::SecretKey::random(rng)),
            Curve::Secp521r1 => SecretKey::P521(p521::SecretKey::random(rng)),
        }
    }

    /// Curve the key belongs to.
    pub fn curve(&self) -> Curve {
        match self {
            SecretKey::Secp256k1(_) => Curve::Secp256k1,
            SecretKey::P256(_) => Curve::Prime256v1,
            SecretKey::P384(_) => Curve::Secp384r1,
            SecretKey::P521(_) => Curve::Secp521r1,
        }
    }

    /// Public key matching this secret.
    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        match self {
            SecretKey::Secp256k1(sk) => {
                PublicKey::Secp256k1(secp256k1::PublicKey::from_secret_key(secp, sk))
            }
            SecretKey::P256(sk) => PublicKey::P256(sk.public_key()),
            SecretKey::P384(sk) => PublicKey::P384(sk.public_key()),
            SecretKey::P521(sk) => PublicKey::P521(sk.public_key()),
        }
    }

    /// Compute the ECDH shared secret with a peer's public key.
    ///
    /// # Errors
    ///
    /// * `InvalidPublicKey` - Peer key is on a different curve.
    pub fn diffie_hellman(&self, peer: &PublicKey) -> Result<SharedSecret, Error> {
        let secret = match (self, peer) {
            (SecretKey::Secp256k1(sk), PublicKey::Secp256k1(pk)) => {
                // x || y of the shared point, keep x.
                let point = Zeroizing::new(secp256k1::ecdh::shared_secret_point(pk, sk));
                point[..32].to_vec()
            }
            (SecretKey::P256(sk), PublicKey::P256(pk)) => {
                p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            (SecretKey::P384(sk), PublicKey::P384(pk)) => {
                p384::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            (SecretKey::P521(sk), PublicKey::P521(pk)) => {
                p521::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            _ => return Err(Error::InvalidPublicKey),
        };

        Ok(SharedSecret(Zeroizing::new(secret)))
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        // The RustCrypto keys wipe themselves.
        if let SecretKey::Secp256k1(sk) = self {
            sk.non_secure_erase();
        }
    }
}

/// Single use key pair generated for one encryption.
pub struct EphemeralKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a fresh key pair on `curve`.
    pub fn generate<R: Rng + CryptoRng, C: Signing>(
        curve: Curve,
        rng: &mut R,
        secp: &Secp256k1<C>,
    ) -> Self {
        let secret = SecretKey::generate(curve, rng);
        let public = secret.public_key(secp);
        EphemeralKeyPair { secret, public }
    }

    /// Public half of the pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Agree on a shared secret with the recipient, consuming the pair.
    ///
    /// The private scalar is dropped as soon as the secret is computed.
    ///
    /// # Returns
    ///
    /// The shared secret and the uncompressed encoding of the ephemeral public key.
    pub fn agree(self, recipient: &PublicKey) -> Result<(SharedSecret, Vec<u8>), Error> {
        let shared_secret = self.secret.diffie_hellman(recipient)?;
        Ok((shared_secret, self.public.to_uncompressed()))
    }
}
