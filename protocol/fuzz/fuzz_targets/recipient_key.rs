// SPDX-License-Identifier: CC0-1.0

//! Fuzz test for recipient public key parsing.
//!
//! This focused test fuzzes SEC1 point decoding and on-curve validation.

#![no_main]
use ecies_x963::{Curve, Ecies, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for curve in Curve::ALL {
        match Ecies::new(curve).encrypt_to_vec(data, "fuzz") {
            Ok(envelope) => {
                // Valid point, compressed or not, always yields an uncompressed ephemeral key.
                let key_len = curve.parameters().encoded_public_key_len();
                assert_eq!(envelope.len(), key_len + 4 + 16);
                assert_eq!(envelope[0], 0x04);
            }
            Err(Error::InvalidPublicKey) => {}
            Err(e) => panic!("Unexpected error on {curve}: {e}"),
        }
    }
});
