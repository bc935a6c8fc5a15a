// SPDX-License-Identifier: CC0-1.0

//! AES-GCM with a 16-byte nonce and a detached 16-byte tag.
//!
//! The scheme always uses the all-zero nonce. That is only sound because the
//! key is derived from a fresh ephemeral key pair for every message, so a key
//! is never used twice. Anything that caches or reuses derived keys must move
//! to random nonces first.

use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::AeadInPlace;
use aes_gcm::aes::{Aes128, Aes256};
use aes_gcm::{AesGcm, KeyInit};

use crate::curve::{KeySize, NONCE_LEN};
use crate::Error;

/// Number of bytes of the authentication tag.
pub const TAG_LEN: usize = 16;

/// The fixed nonce used by the scheme.
pub(crate) const ZERO_NONCE: [u8; NONCE_LEN] = [0u8; NONCE_LEN];

type Aes128Gcm16 = AesGcm<Aes128, U16>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encrypt `buffer` in place and return the authentication tag.
///
/// # Errors
///
/// * `Encryption` - Key does not match `key_size`, or the message exceeds the GCM limit.
pub fn seal(
    key_size: KeySize,
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    buffer: &mut [u8],
) -> Result<[u8; TAG_LEN], Error> {
    let nonce = GenericArray::from_slice(nonce);
    let tag = match key_size {
        KeySize::Aes128 => Aes128Gcm16::new_from_slice(key)
            .map_err(|_| Error::Encryption)?
            .encrypt_in_place_detached(nonce, &[], buffer),
        KeySize::Aes256 => Aes256Gcm16::new_from_slice(key)
            .map_err(|_| Error::Encryption)?
            .encrypt_in_place_detached(nonce, &[], buffer),
    }
    .map_err(|_| Error::Encryption)?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(tag.as_slice());
    Ok(out)
}

/// Verify `tag` and decrypt `buffer` in place.
///
/// The buffer contents are unspecified on failure and must be discarded.
///
/// # Errors
///
/// * `AuthenticationFailed` - Tag does not verify under this key.
pub fn open(
    key_size: KeySize,
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    buffer: &mut [u8],
    tag: &[u8; TAG_LEN],
) -> Result<(), Error> {
    let nonce = GenericArray::from_slice(nonce);
    let tag = GenericArray::from_slice(tag);
    match key_size {
        KeySize::Aes128 => Aes128Gcm16::new_from_slice(key)
            .map_err(|_| Error::AuthenticationFailed)?
            .decrypt_in_place_detached(nonce, &[], buffer, tag),
        KeySize::Aes256 => Aes256Gcm16::new_from_slice(key)
            .map_err(|_| Error::AuthenticationFailed)?
            .decrypt_in_place_detached(nonce, &[], buffer, tag),
    }
    .map_err(|_| Error::AuthenticationFailed)
}
