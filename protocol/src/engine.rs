// SPDX-License-Identifier: CC0-1.0

//! # Single message encryption and decryption
//!
//! 1. **Key Agreement**: ECDH between an ephemeral key and the recipient key.
//! 2. **Key Derivation**: X9.63 KDF over the shared secret, bound to the ephemeral public key.
//! 3. **Cipher**: AES-GCM seal for the sender, open for the recipient.
//! 4. **Output**: The encoded envelope for the sender, the plaintext for the recipient.
//!
//! Every engine owns the secrets of exactly one message. None of them outlive
//! the engine, and nothing is shared between engines.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use log::{debug, trace};
use rand::{CryptoRng, Rng};
use secp256k1::{Secp256k1, Signing};
use zeroize::Zeroizing;

use crate::agreement::{EphemeralKeyPair, PublicKey, SecretKey, SharedSecret};
use crate::curve::CurveParameters;
use crate::envelope::Envelope;
use crate::gcm::{self, TAG_LEN, ZERO_NONCE};
use crate::{kdf, Error, Role};

// Where the local half of the key agreement comes from.
enum LocalKey {
    Ephemeral {
        key_pair: EphemeralKeyPair,
        recipient: PublicKey,
    },
    Recipient(SecretKey),
}

// Envelope regions as they fill in. The sender starts with a plaintext buffer
// and learns key and tag along the way, the recipient starts with all three.
struct Payload {
    ephemeral_public_key: Vec<u8>,
    buffer: Zeroizing<Vec<u8>>,
    tag: [u8; TAG_LEN],
}

/// **Initial state** holding the message and the local key material.
pub struct Initialized {
    local_key: LocalKey,
    payload: Payload,
}

/// **Second state** after computing the ECDH shared secret.
pub struct KeyAgreed {
    shared_secret: SharedSecret,
    payload: Payload,
}

/// **Third state** after deriving the symmetric key.
pub struct KeyDerived {
    key: Zeroizing<Vec<u8>>,
    payload: Payload,
}

/// **Final state** after sealing or opening the message.
pub struct Ciphered {
    payload: Payload,
}

/// ECIES state machine for one message.
///
/// The steps are enforced at compile time.
///
/// 1. `Initialized` - Message and key material loaded.
/// 2. `KeyAgreed` - Shared secret computed, ephemeral private key gone.
/// 3. `KeyDerived` - Symmetric key derived, shared secret gone.
/// 4. `Ciphered` - Message sealed or opened, symmetric key gone.
/// 5. Complete - Envelope or plaintext taken out of the engine.
pub struct Engine<State> {
    /// Curve and sizes of the scheme.
    params: &'static CurveParameters,
    /// Local role, sender or recipient.
    role: Role,
    /// State-specific data.
    state: State,
}

// Methods available in all states
impl<State> Engine<State> {
    /// Get the parameters this engine is operating with.
    pub fn parameters(&self) -> &'static CurveParameters {
        self.params
    }

    /// Get the local role.
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Engine<Initialized> {
    /// Start encrypting `plaintext` for `recipient`.
    #[cfg(feature = "std")]
    pub fn sender(
        params: &'static CurveParameters,
        recipient: PublicKey,
        plaintext: &[u8],
    ) -> Result<Self, Error> {
        let mut rng = rand::thread_rng();
        let secp = Secp256k1::signing_only();
        Self::sender_with_rng(params, recipient, plaintext, &mut rng, &secp)
    }

    /// Start encrypting `plaintext` for `recipient` using supplied RNG and secp context.
    ///
    /// A fresh ephemeral key pair is drawn from `rng` for this message only.
    ///
    /// # Arguments
    ///
    /// * `params` - Curve parameters of the scheme.
    /// * `recipient` - Recipient public key, must be on the configured curve.
    /// * `plaintext` - Message to encrypt, copied into the engine.
    /// * `rng` - Source of the ephemeral private key.
    /// * `secp` - Context for secp256k1 key generation, ignored on other curves.
    ///
    /// # Errors
    ///
    /// * `InvalidPublicKey` - Recipient key is on a different curve.
    pub fn sender_with_rng<C: Signing>(
        params: &'static CurveParameters,
        recipient: PublicKey,
        plaintext: &[u8],
        rng: &mut (impl Rng + CryptoRng),
        secp: &Secp256k1<C>,
    ) -> Result<Self, Error> {
        if recipient.curve() != params.curve() {
            debug!(
                "Recipient key on {} does not match {}",
                recipient.curve(),
                params.curve()
            );
            return Err(Error::InvalidPublicKey);
        }

        let key_pair = EphemeralKeyPair::generate(params.curve(), rng, secp);
        trace!(
            "Sender engine on {} initialized for {} byte message",
            params.curve(),
            plaintext.len()
        );

        Ok(Engine {
            params,
            role: Role::Sender,
            state: Initialized {
                local_key: LocalKey::Ephemeral {
                    key_pair,
                    recipient,
                },
                payload: Payload {
                    ephemeral_public_key: Vec::new(),
                    buffer: Zeroizing::new(plaintext.to_vec()),
                    tag: [0u8; TAG_LEN],
                },
            },
        })
    }

    /// Start decrypting an envelope addressed to `secret_key`.
    ///
    /// # Arguments
    ///
    /// * `params` - Curve parameters of the scheme.
    /// * `secret_key` - Recipient long term private key.
    /// * `envelope` - Raw envelope bytes.
    ///
    /// # Errors
    ///
    /// * `InvalidSecretKey` - Secret key is on a different curve.
    /// * `MalformedEnvelope` - Envelope is shorter than a key and a tag.
    pub fn recipient(
        params: &'static CurveParameters,
        secret_key: SecretKey,
        envelope: &[u8],
    ) -> Result<Self, Error> {
        if secret_key.curve() != params.curve() {
            debug!(
                "Secret key on {} does not match {}",
                secret_key.curve(),
                params.curve()
            );
            return Err(Error::InvalidSecretKey);
        }

        let envelope = Envelope::decode(envelope, params.encoded_public_key_len())
            .map_err(|e| {
                debug!("Rejecting envelope: {e}");
                e
            })?;
        let (ephemeral_public_key, ciphertext, tag) = envelope.into_parts();
        trace!(
            "Recipient engine on {} initialized for {} byte ciphertext",
            params.curve(),
            ciphertext.len()
        );

        Ok(Engine {
            params,
            role: Role::Recipient,
            state: Initialized {
                local_key: LocalKey::Recipient(secret_key),
                payload: Payload {
                    ephemeral_public_key,
                    buffer: Zeroizing::new(ciphertext),
                    tag,
                },
            },
        })
    }

    /// Compute the ECDH shared secret.
    ///
    /// The sender consumes its ephemeral private key here. The recipient
    /// validates the ephemeral public key taken from the envelope.
    ///
    /// # Errors
    ///
    /// * `AuthenticationFailed` - Envelope key region is not a point on the curve.
    pub fn agree(self) -> Result<Engine<KeyAgreed>, Error> {
        let Initialized {
            local_key,
            mut payload,
        } = self.state;

        let shared_secret = match local_key {
            LocalKey::Ephemeral {
                key_pair,
                recipient,
            } => {
                let (shared_secret, ephemeral_public_key) = key_pair.agree(&recipient)?;
                payload.ephemeral_public_key = ephemeral_public_key;
                shared_secret
            }
            LocalKey::Recipient(secret_key) => {
                // A damaged key region is indistinguishable from any other tampering.
                let ephemeral = PublicKey::from_sec1_bytes(
                    self.params.curve(),
                    &payload.ephemeral_public_key,
                )
                .map_err(|_| {
                    debug!("Envelope ephemeral key is not on {}", self.params.curve());
                    Error::AuthenticationFailed
                })?;
                secret_key.diffie_hellman(&ephemeral)?
            }
        };

        trace!("{:?} engine agreed on a shared secret", self.role);
        Ok(Engine {
            params: self.params,
            role: self.role,
            state: KeyAgreed {
                shared_secret,
                payload,
            },
        })
    }
}

impl Engine<KeyAgreed> {
    /// Derive the symmetric key from the shared secret and the ephemeral public key.
    ///
    /// # Errors
    ///
    /// * `OutputLength` - Unreachable for the supported key sizes.
    pub fn derive(self) -> Result<Engine<KeyDerived>, Error> {
        let KeyAgreed {
            shared_secret,
            payload,
        } = &self.state;
        let key = kdf::derive(
            shared_secret.as_bytes(),
            &payload.ephemeral_public_key,
            self.params.symmetric_key_len(),
        )?;

        trace!(
            "{:?} engine derived a {} byte key",
            self.role,
            self.params.symmetric_key_len()
        );
        let KeyAgreed { payload, .. } = self.state;
        Ok(Engine {
            params: self.params,
            role: self.role,
            state: KeyDerived { key, payload },
        })
    }
}

impl Engine<KeyDerived> {
    /// Seal the plaintext, or open and authenticate the ciphertext.
    ///
    /// # Errors
    ///
    /// * `AuthenticationFailed` - Tag does not verify, no plaintext is released.
    /// * `Encryption` - Message exceeds the AES-GCM length limit.
    pub fn cipher(self) -> Result<Engine<Ciphered>, Error> {
        let KeyDerived { key, mut payload } = self.state;
        let key_size = self.params.key_size();

        match self.role {
            Role::Sender => {
                payload.tag = gcm::seal(key_size, &key, &ZERO_NONCE, &mut payload.buffer)?;
            }
            Role::Recipient => {
                // On failure the buffer is dropped, and wiped, with the engine.
                gcm::open(
                    key_size,
                    &key,
                    &ZERO_NONCE,
                    &mut payload.buffer,
                    &payload.tag,
                )
                .map_err(|e| {
                    debug!("Envelope failed authentication");
                    e
                })?;
            }
        }

        trace!("{:?} engine ciphered {} bytes", self.role, payload.buffer.len());
        Ok(Engine {
            params: self.params,
            role: self.role,
            state: Ciphered { payload },
        })
    }
}

impl Engine<Ciphered> {
    /// Take the finished envelope.
    ///
    /// # Errors
    ///
    /// * `ProtocolState` - The engine is decrypting, there is no envelope to give.
    pub fn into_envelope(mut self) -> Result<Envelope, Error> {
        if self.role != Role::Sender {
            debug!("Envelope requested from a {:?} engine", self.role);
            return Err(Error::ProtocolState { role: self.role });
        }

        let payload = &mut self.state.payload;
        Ok(Envelope::new(
            mem::take(&mut payload.ephemeral_public_key),
            mem::take(&mut *payload.buffer),
            payload.tag,
        ))
    }

    /// Take the finished envelope as base64 text.
    ///
    /// # Errors
    ///
    /// * `ProtocolState` - The engine is decrypting, there is no envelope to give.
    pub fn encode(self) -> Result<String, Error> {
        self.into_envelope().map(|envelope| envelope.to_base64())
    }

    /// Take the authenticated plaintext.
    ///
    /// # Errors
    ///
    /// * `ProtocolState` - The engine is encrypting, there is no plaintext to give.
    pub fn into_plaintext(mut self) -> Result<Vec<u8>, Error> {
        if self.role != Role::Recipient {
            debug!("Plaintext requested from a {:?} engine", self.role);
            return Err(Error::ProtocolState { role: self.role });
        }

        Ok(mem::take(&mut *self.state.payload.buffer))
    }
}
