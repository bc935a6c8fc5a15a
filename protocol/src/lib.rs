// SPDX-License-Identifier: CC0-1.0

//! ECIES with cofactor ECDH, the ANSI X9.63 SHA-256 KDF and AES-GCM.
//!
//! This crate implements the elliptic curve integrated encryption scheme in the
//! layout known as `ECIESEncryptionCofactorX963SHA256AESGCM`. A sender encrypts a
//! message to a recipient's public key and only the holder of the matching private
//! key can decrypt it. Every message carries its own ephemeral key, so encrypting the
//! same message twice gives two unrelated envelopes.
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(feature = "std")]
//! # fn main() -> Result<(), ecies_x963::Error> {
//! use ecies_x963::secp256k1::Secp256k1;
//! use ecies_x963::{Curve, Ecies, SecretKey};
//!
//! // The recipient's key pair, generated and stored elsewhere.
//! let secret = [0x42u8; 32];
//! let secret_key = SecretKey::from_bytes(Curve::Secp256k1, &secret)?;
//! let public_key = secret_key.public_key(&Secp256k1::signing_only()).to_uncompressed();
//!
//! let ecies = Ecies::from_name("secp256k1")?;
//! let envelope = ecies.encrypt(&public_key, "hello")?;
//! let message = ecies.decrypt(&secret, &envelope)?;
//! assert_eq!(message, "hello");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```
//!
//! Keys and envelopes given as text are read as base64, messages given as text are
//! read as UTF-8. See [`Input`].
//!
//! # Advanced Usage
//!
//! For more control, such as no-std environments, you can use the lower level components.
//!
//! - [`Engine`] - Type-safe state machine for a single message.
//! - [`Envelope`] - Split and join the wire format.
//! - [`kdf`] - The X9.63 key derivation function.
//!
//! # Protocol Details
//!
//! The sender generates an ephemeral key pair on the recipient's curve and computes
//! the ECDH shared secret. The X9.63 KDF over SHA-256 turns that secret into an AES
//! key, with the ephemeral public key as shared info. AES-GCM with a 16-byte all-zero
//! nonce seals the message. Base64 of the following is sent.
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | Ephemeral key | 65, 97 or 133 bytes | Uncompressed SEC1 point |
//! | Ciphertext | Variable | Same length as the message |
//! | Tag | 16 bytes | Authentication tag |
//!
//! | Curve | AES key |
//! |-------|---------|
//! | secp256k1, prime256v1 | 128 bits |
//! | secp384r1, secp521r1 | 256 bits |
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod agreement;
mod curve;
mod engine;
mod envelope;
mod gcm;
mod input;
pub mod kdf;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use log::debug;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

pub use secp256k1;

pub use agreement::{EphemeralKeyPair, PublicKey, SecretKey, SharedSecret};
pub use curve::{Curve, CurveParameters, KeySize, NONCE_LEN};
pub use engine::{Ciphered, Engine, Initialized, KeyAgreed, KeyDerived};
pub use envelope::Envelope;
pub use gcm::TAG_LEN;
pub use input::Input;

/// Errors encountered while encrypting or decrypting a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The curve identifier is not one of the supported curves.
    UnsupportedCurve,
    /// The recipient public key is not a valid point on the configured curve.
    InvalidPublicKey,
    /// The recipient secret key is not a valid scalar for the configured curve.
    InvalidSecretKey,
    /// The envelope is too short to hold a key and a tag, returns
    /// the size of the smallest possible envelope.
    MalformedEnvelope { required_bytes: usize },
    /// The envelope did not authenticate, no plaintext is released.
    AuthenticationFailed,
    /// The engine was asked for the output of the other role.
    ProtocolState { role: Role },
    /// The KDF cannot produce this many bytes.
    OutputLength { requested: usize },
    /// The cipher refused to seal the message.
    Encryption,
    /// A message is not valid base64, or plaintext requested as text is not UTF-8.
    Encoding,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedCurve => write!(f, "Curve is not supported."),
            Error::InvalidPublicKey => {
                write!(f, "Public key is not a valid point on the curve.")
            }
            Error::InvalidSecretKey => write!(f, "Secret key is not valid for the curve."),
            Error::MalformedEnvelope { required_bytes } => write!(
                f,
                "Envelope is malformed, need at least {required_bytes} bytes."
            ),
            Error::AuthenticationFailed => write!(f, "Envelope failed authentication."),
            Error::ProtocolState { role } => {
                write!(f, "Operation is not available to the {role:?} role.")
            }
            Error::OutputLength { requested } => write!(
                f,
                "Cannot derive {requested} bytes of key material."
            ),
            Error::Encryption => write!(f, "Message cannot be encrypted."),
            Error::Encoding => write!(f, "Message is not correctly encoded."),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Role of an engine in the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Encrypting a message to a recipient.
    Sender,
    /// Decrypting a message addressed to us.
    Recipient,
}

/// The scheme configured for one curve.
///
/// Holds nothing but a reference into the static parameter table, so it is
/// cheap to copy and safe to share between threads. Every call runs its own
/// [`Engine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ecies {
    params: &'static CurveParameters,
}

impl Ecies {
    /// Configure the scheme for `curve`.
    pub fn new(curve: Curve) -> Self {
        Ecies {
            params: curve.parameters(),
        }
    }

    /// Configure the scheme from a curve name such as `secp256k1` or `P-384`.
    ///
    /// # Errors
    ///
    /// * `UnsupportedCurve` - Name does not match a supported curve.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        let curve = name.parse::<Curve>().map_err(|e| {
            debug!("Unsupported curve {name:?}");
            e
        })?;
        Ok(Self::new(curve))
    }

    /// Curve this instance encrypts on.
    pub fn curve(&self) -> Curve {
        self.params.curve()
    }

    /// Key and tag sizes for the curve.
    pub fn parameters(&self) -> &'static CurveParameters {
        self.params
    }

    /// Encrypt a message to a recipient, returning the base64 envelope.
    ///
    /// # Arguments
    ///
    /// * `recipient_public_key` - SEC1 encoded point, raw or base64.
    /// * `message` - Bytes, UTF-8 text, or base64 text.
    ///
    /// # Errors
    ///
    /// * `InvalidPublicKey` - Key does not decode to a point on the curve.
    /// * `Encoding` - Message given as base64 does not decode.
    #[cfg(feature = "std")]
    pub fn encrypt<'k, 'm>(
        &self,
        recipient_public_key: impl Into<Input<'k>>,
        message: impl Into<Input<'m>>,
    ) -> Result<String, Error> {
        self.encrypt_with_rng(recipient_public_key, message, &mut rand::thread_rng())
    }

    /// Encrypt a message to a recipient with a supplied RNG, returning the base64 envelope.
    ///
    /// # Errors
    ///
    /// See [`Ecies::encrypt`].
    pub fn encrypt_with_rng<'k, 'm>(
        &self,
        recipient_public_key: impl Into<Input<'k>>,
        message: impl Into<Input<'m>>,
        rng: &mut (impl Rng + CryptoRng),
    ) -> Result<String, Error> {
        self.seal(recipient_public_key.into(), message.into(), rng)
            .map(|envelope| envelope.to_base64())
    }

    /// Encrypt a message to a recipient, returning the raw envelope bytes.
    ///
    /// # Errors
    ///
    /// See [`Ecies::encrypt`].
    #[cfg(feature = "std")]
    pub fn encrypt_to_vec<'k, 'm>(
        &self,
        recipient_public_key: impl Into<Input<'k>>,
        message: impl Into<Input<'m>>,
    ) -> Result<Vec<u8>, Error> {
        self.encrypt_to_vec_with_rng(recipient_public_key, message, &mut rand::thread_rng())
    }

    /// Encrypt a message to a recipient with a supplied RNG, returning the raw envelope bytes.
    ///
    /// # Errors
    ///
    /// See [`Ecies::encrypt`].
    pub fn encrypt_to_vec_with_rng<'k, 'm>(
        &self,
        recipient_public_key: impl Into<Input<'k>>,
        message: impl Into<Input<'m>>,
        rng: &mut (impl Rng + CryptoRng),
    ) -> Result<Vec<u8>, Error> {
        self.seal(recipient_public_key.into(), message.into(), rng)
            .map(|envelope| envelope.encode())
    }

    /// Decrypt an envelope and return the message as text.
    ///
    /// # Arguments
    ///
    /// * `recipient_secret_key` - Big-endian private scalar, raw or base64.
    /// * `envelope` - Envelope as base64 text or raw bytes.
    ///
    /// # Errors
    ///
    /// * `InvalidSecretKey` - Key is not a valid scalar for the curve.
    /// * `MalformedEnvelope` - Envelope is not base64 or is too short.
    /// * `AuthenticationFailed` - Envelope was altered or is not addressed to this key.
    /// * `Encoding` - The authenticated message is not UTF-8.
    pub fn decrypt<'k, 'e>(
        &self,
        recipient_secret_key: impl Into<Input<'k>>,
        envelope: impl Into<Input<'e>>,
    ) -> Result<String, Error> {
        let plaintext = self.decrypt_to_vec(recipient_secret_key, envelope)?;
        String::from_utf8(plaintext).map_err(|_| Error::Encoding)
    }

    /// Decrypt an envelope and return the raw message bytes.
    ///
    /// # Errors
    ///
    /// See [`Ecies::decrypt`], except that any bytes are accepted.
    pub fn decrypt_to_vec<'k, 'e>(
        &self,
        recipient_secret_key: impl Into<Input<'k>>,
        envelope: impl Into<Input<'e>>,
    ) -> Result<Vec<u8>, Error> {
        let recipient_secret_key: Input<'k> = recipient_secret_key.into();
        let envelope: Input<'e> = envelope.into();

        let secret = Zeroizing::new(
            recipient_secret_key
                .to_binary_bytes()
                .map_err(|_| Error::InvalidSecretKey)?
                .into_owned(),
        );
        let secret_key = SecretKey::from_bytes(self.curve(), &secret)?;
        let envelope = envelope.to_binary_bytes().map_err(|_| {
            debug!("Envelope is not valid base64");
            Error::MalformedEnvelope {
                required_bytes: Envelope::encoded_len(self.params.encoded_public_key_len(), 0),
            }
        })?;

        Engine::recipient(self.params, secret_key, &envelope)?
            .agree()?
            .derive()?
            .cipher()?
            .into_plaintext()
    }

    fn seal(
        &self,
        recipient_public_key: Input<'_>,
        message: Input<'_>,
        rng: &mut (impl Rng + CryptoRng),
    ) -> Result<Envelope, Error> {
        let curve = self.curve();
        let public_key = recipient_public_key
            .to_binary_bytes()
            .map_err(|_| Error::InvalidPublicKey)
            .and_then(|bytes| PublicKey::from_sec1_bytes(curve, &bytes))
            .map_err(|e| {
                debug!("Rejecting recipient public key for {curve}");
                e
            })?;
        let message = message.to_message_bytes().map_err(|_| Error::Encoding)?;

        let secp = secp256k1::Secp256k1::signing_only();
        Engine::sender_with_rng(self.params, public_key, &message, rng, &secp)?
            .agree()?
            .derive()?
            .cipher()?
            .into_envelope()
    }
}
