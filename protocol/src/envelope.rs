// SPDX-License-Identifier: CC0-1.0

//! Wire format of an encrypted message.
//!
//! ```text
//! +----------------------+-------------------+-----------+
//! | ephemeral public key | ciphertext        | tag       |
//! | encoded point        | plaintext length  | 16 bytes  |
//! +----------------------+-------------------+-----------+
//! ```
//!
//! The public key width comes from the curve, the tag is always last, and
//! whatever sits between them is ciphertext.

use alloc::string::String;
use alloc::vec::Vec;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::gcm::TAG_LEN;
use crate::input::decode_base64;
use crate::Error;

/// An encrypted message split into its three regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    ephemeral_public_key: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Assemble an envelope from its parts.
    pub fn new(ephemeral_public_key: Vec<u8>, ciphertext: Vec<u8>, tag: [u8; TAG_LEN]) -> Self {
        Envelope {
            ephemeral_public_key,
            ciphertext,
            tag,
        }
    }

    /// Total encoded size for a given public key width and plaintext length.
    pub const fn encoded_len(public_key_len: usize, plaintext_len: usize) -> usize {
        public_key_len + plaintext_len + TAG_LEN
    }

    /// Split raw envelope bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The complete envelope.
    /// * `public_key_len` - Width of the encoded ephemeral key for the curve in use.
    ///
    /// # Errors
    ///
    /// * `MalformedEnvelope` - Fewer bytes than a key and a tag, the size of an
    ///   envelope carrying an empty message.
    pub fn decode(bytes: &[u8], public_key_len: usize) -> Result<Self, Error> {
        let required_bytes = Self::encoded_len(public_key_len, 0);
        if bytes.len() < required_bytes {
            return Err(Error::MalformedEnvelope { required_bytes });
        }

        let (ephemeral_public_key, rest) = bytes.split_at(public_key_len);
        let (ciphertext, tag_bytes) = rest.split_at(rest.len() - TAG_LEN);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        Ok(Envelope {
            ephemeral_public_key: ephemeral_public_key.to_vec(),
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }

    /// Decode base64 text and split it. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// * `MalformedEnvelope` - Text is not base64, or decodes to too few bytes.
    pub fn from_base64(text: &str, public_key_len: usize) -> Result<Self, Error> {
        let bytes = decode_base64(text).map_err(|_| Error::MalformedEnvelope {
            required_bytes: Self::encoded_len(public_key_len, 0),
        })?;
        Self::decode(&bytes, public_key_len)
    }

    /// Concatenate key, ciphertext and tag.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Base64 (standard alphabet, padded) of [`Envelope::encode`].
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.encode())
    }

    /// Encoded length in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        Self::encoded_len(self.ephemeral_public_key.len(), self.ciphertext.len())
    }

    /// Encoded ephemeral public key, the first region.
    pub fn ephemeral_public_key(&self) -> &[u8] {
        &self.ephemeral_public_key
    }

    /// Ciphertext, as long as the plaintext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// GCM authentication tag, the last 16 bytes.
    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, Vec<u8>, [u8; TAG_LEN]) {
        (self.ephemeral_public_key, self.ciphertext, self.tag)
    }
}
