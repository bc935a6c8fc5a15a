// SPDX-License-Identifier: CC0-1.0

//! Fuzz test for envelope decryption.
//!
//! Arbitrary bytes are fed as an envelope on every curve. Parsing, point
//! validation and tag checks must reject them without panicking.

#![no_main]
use ecies_x963::{Curve, Ecies, Error};
use libfuzzer_sys::fuzz_target;

// Small scalar valid on every supported curve.
const SECRET: [u8; 32] = {
    let mut secret = [0u8; 32];
    secret[31] = 0x2a;
    secret
};

fuzz_target!(|data: &[u8]| {
    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let secret = match curve {
            Curve::Secp256k1 | Curve::Prime256v1 => SECRET.to_vec(),
            Curve::Secp384r1 => [&[0u8; 16][..], &SECRET[..]].concat(),
            Curve::Secp521r1 => [&[0u8; 34][..], &SECRET[..]].concat(),
        };

        match ecies.decrypt_to_vec(&secret, data) {
            Ok(_) => {
                // Forging a tag without the key should never happen.
                panic!("Decrypted arbitrary data on {curve}");
            }
            Err(Error::MalformedEnvelope { required_bytes }) => {
                assert!(data.len() < required_bytes);
            }
            Err(Error::AuthenticationFailed) => {}
            Err(e) => panic!("Unexpected error on {curve}: {e}"),
        }
    }
});
