// SPDX-License-Identifier: CC0-1.0

//! ANSI X9.63 key derivation over SHA-256.
//!
//! ```text
//! K(i) = SHA-256(Z || BE32(i) || SharedInfo)    for i = 1, 2, ...
//! KM   = K(1) || K(2) || ...    truncated to the requested length
//! ```

use alloc::vec::Vec;

use bitcoin_hashes::{sha256, GeneralHash as _, Hash as _, HashEngine as _};
use zeroize::Zeroizing;

use crate::Error;

/// Output length of the underlying hash.
pub const HASH_LEN: usize = 32;

/// Derive `output_len` bytes of key material from a shared secret.
///
/// # Arguments
///
/// * `shared_secret` - The ECDH shared secret `Z`.
/// * `shared_info` - Context bound into every block. For this scheme it is the
///   encoded ephemeral public key.
/// * `output_len` - Number of bytes to derive.
///
/// # Errors
///
/// * `OutputLength` - More output requested than the 32-bit counter can produce.
pub fn derive(
    shared_secret: &[u8],
    shared_info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    // The counter is 32 bits and starts at one.
    let blocks = u32::try_from(output_len.div_ceil(HASH_LEN)).map_err(|_| Error::OutputLength {
        requested: output_len,
    })?;

    let mut output = Zeroizing::new(Vec::with_capacity(output_len));
    for counter in 1..=blocks {
        let mut engine = sha256::Hash::engine();
        engine.input(shared_secret);
        engine.input(&counter.to_be_bytes());
        engine.input(shared_info);
        let block = Zeroizing::new(sha256::Hash::from_engine(engine).to_byte_array());
        let take = HASH_LEN.min(output_len - output.len());
        output.extend_from_slice(&block[..take]);
    }

    Ok(output)
}
