// SPDX-License-Identifier: CC0-1.0

#[cfg(feature = "std")]
use ecies_x963::{Curve, Ecies};

#[cfg(feature = "std")]
const TAG_BYTES: usize = 16;

/// Fresh recipient key pair as (secret scalar, uncompressed public key).
#[cfg(feature = "std")]
fn recipient_keys(curve: Curve) -> (Vec<u8>, Vec<u8>) {
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    match curve {
        Curve::Secp256k1 => loop {
            let bytes: [u8; 32] = rng.gen();
            if let Ok(sk) = secp256k1::SecretKey::from_slice(&bytes) {
                let pk = secp256k1::PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), &sk);
                break (bytes.to_vec(), pk.serialize_uncompressed().to_vec());
            }
        },
        Curve::Prime256v1 => {
            let sk = p256::SecretKey::random(&mut rng);
            let pk = sk.public_key().to_encoded_point(false);
            (sk.to_bytes().to_vec(), pk.as_bytes().to_vec())
        }
        Curve::Secp384r1 => {
            let sk = p384::SecretKey::random(&mut rng);
            let pk = sk.public_key().to_encoded_point(false);
            (sk.to_bytes().to_vec(), pk.as_bytes().to_vec())
        }
        Curve::Secp521r1 => {
            let sk = p521::SecretKey::random(&mut rng);
            let pk = sk.public_key().to_encoded_point(false);
            (sk.to_bytes().to_vec(), pk.as_bytes().to_vec())
        }
    }
}

#[test]
#[cfg(feature = "std")]
fn hello_secp256k1() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let _ = env_logger::builder().is_test(true).try_init();

    let ecies = Ecies::from_name("secp256k1").unwrap();
    assert_eq!(ecies.parameters().symmetric_key_len(), 16);
    assert_eq!(ecies.parameters().encoded_public_key_len(), 65);

    let (secret, public) = recipient_keys(Curve::Secp256k1);
    let envelope = ecies.encrypt(&public, "hello").unwrap();

    let raw = STANDARD.decode(&envelope).unwrap();
    assert_eq!(raw.len(), 86);
    assert_eq!(raw[0], 0x04);

    assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), "hello");
}

/// Recipient scalar and envelope of "interop hello", produced by an independent
/// X9.63 KDF and AES-GCM implementation.
#[cfg(feature = "std")]
const INTEROP_VECTORS: [(Curve, &str, &str); 4] = [
    (
        Curve::Secp256k1,
        "48eaf769d6b9c6f96a2ec06601a92ec465936dcdd828bec8962cef29f1f07de9",
        "BHy8m1q1hFDRC9mJXOwzJhLyJyl6t/x+xwaIP15GKiCULeaoEfPI+V7rISB9l4zNoTtNP6rGcDT7UcT+C93nDvEYPkbfT7koou95UhNnQEL43Je2iM6aoyvNcxxaRQ==",
    ),
    (
        Curve::Prime256v1,
        "e2ab2a66b8921600c8773027fbe012869d58bfba799ac9aeedcbd528b23ba363",
        "BPuMmcbQz4wVQSfKTgQql5t/8rUz9z7w7O9juhee1D1mjgPVCMel8m+2vNyMNdrCqL5rDVhRAiIh4sXm5965OSVyxrvWnVyNCYkmofaGUws0SPs7/1dsQMD5nfsmYw==",
    ),
    (
        Curve::Secp384r1,
        "39d1985ef50281586b33577526789d1852c6b93a1f7958e0fd908273fb472e98b9f8663ba1edc6e4700add901b17d54b",
        "BKdw9eDZG6sWmHu6Pm9skqfJSZUlSnCmxkABsAkeumz2vokrj1iyt/jOKJfOVQz9udT+K/YSg9KS4/Da7Vi6XLd93pnPityERywhRjbMyz/2WkaYaYdaUDpPZS4zguWMKf/mrxOKdhmXFCuw3haqFlgFMyLxuZB/6TNKM3Gm",
    ),
    (
        Curve::Secp521r1,
        "00dccca988fe9298acc114fabca12f7ae168c9985c88e5183e5244e45d12dc8b74e3520ab68ef9d2696bd6f3c0d0c3ec08b8cf29b4a4b886f999026053e8afa7d63a",
        "BAAE994sukoXg0djpagWoAW3cYcmv8YFsh5GslEUcZrHfIRjwtRiyFmvHRSmUlgVNrh9slpkMmj22pwlLipBsmA4ggBKuYScGLXgc7J/mmVkeejuVfCfv2ZPDN6vtJxKxRFpqYWF8fvQ5Bqvwd5UYG05qJDYRwxLq0yjtIcZjC6F/KehwCG+tab6H0VZekeDo35TM1b2uKolhLgp5izrtMVF",
    ),
];

#[test]
#[cfg(feature = "std")]
fn interop_vectors_decrypt() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use hex::FromHex;

    for (curve, secret, envelope) in INTEROP_VECTORS {
        let ecies = Ecies::new(curve);
        let secret = Vec::<u8>::from_hex(secret).unwrap();

        let raw = STANDARD.decode(envelope).unwrap();
        assert_eq!(
            raw.len(),
            ecies.parameters().encoded_public_key_len() + b"interop hello".len() + TAG_BYTES
        );
        assert_eq!(ecies.decrypt(&secret, envelope).unwrap(), "interop hello", "{curve}");
        assert_eq!(ecies.decrypt_to_vec(&secret, &raw).unwrap(), b"interop hello");
    }
}

#[test]
#[cfg(feature = "std")]
fn interop_vectors_reject_flipped_tag() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use ecies_x963::Error;
    use hex::FromHex;

    for (curve, secret, envelope) in INTEROP_VECTORS {
        let secret = Vec::<u8>::from_hex(secret).unwrap();
        let mut raw = STANDARD.decode(envelope).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert_eq!(
            Ecies::new(curve).decrypt_to_vec(&secret, &raw),
            Err(Error::AuthenticationFailed)
        );
    }
}

/// Fills every requested byte with the same value.
#[cfg(feature = "std")]
struct FixedRng(u8);

#[cfg(feature = "std")]
impl rand::RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_le_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl rand::CryptoRng for FixedRng {}

#[test]
#[cfg(feature = "std")]
fn fixed_ephemeral_key_envelope() {
    use hex::FromHex;

    // Ephemeral scalar is 0x5a repeated, recipient is the secp256k1 interop key.
    let (_, secret, _) = INTEROP_VECTORS[0];
    let secret = Vec::<u8>::from_hex(secret).unwrap();
    let public = Vec::<u8>::from_hex(
        "0495f4f27ed882996b7d5d301da9d64757d7e6640fdca681244116a19a70d17fbe\
         0e392a8fc7fbcbca1832d93a52b69c6fea684d135968b0c2fcf195ac5797f7cb",
    )
    .unwrap();
    let expected = "BJxVMOQ4XrxBza+CV+35orqvhQakCZEDIR5u1zghA+1nPJWfA1T2H2Oe9DuWevfXXJ6eq7RAZJSbQ6VRiatM5yKuMTpOj1sU7mKtrCweswqQViIKj64lxDd3uVDXcItNOw==";

    let ecies = Ecies::new(Curve::Secp256k1);
    let envelope = ecies
        .encrypt_with_rng(&public, "fixed randomness", &mut FixedRng(0x5a))
        .unwrap();
    assert_eq!(envelope, expected);
    assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), "fixed randomness");
}

#[test]
#[cfg(feature = "std")]
fn round_trip_every_curve() {
    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let (secret, public) = recipient_keys(curve);

        for message in [&b""[..], &b"a"[..], &b"Bitcoin rox!"[..], &[0u8; 1024][..]] {
            let envelope = ecies.encrypt_to_vec(&public, message).unwrap();
            assert_eq!(ecies.decrypt_to_vec(&secret, &envelope).unwrap(), message);
        }

        let envelope = ecies.encrypt(&public, "").unwrap();
        assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), "");
    }
}

#[test]
#[cfg(feature = "std")]
fn envelope_length() {
    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let key_len = ecies.parameters().encoded_public_key_len();
        let (_, public) = recipient_keys(curve);

        for len in [0usize, 1, 15, 16, 17, 255, 4096] {
            let message = vec![0xA5u8; len];
            let envelope = ecies.encrypt_to_vec(&public, &message).unwrap();
            assert_eq!(envelope.len(), key_len + len + TAG_BYTES);
            assert_eq!(
                ecies_x963::Envelope::encoded_len(key_len, len),
                envelope.len()
            );
        }
    }
}

#[test]
#[cfg(feature = "std")]
fn tampered_secp256k1_envelope_never_decrypts() {
    use ecies_x963::Error;

    let ecies = Ecies::new(Curve::Secp256k1);
    let (secret, public) = recipient_keys(Curve::Secp256k1);
    let envelope = ecies.encrypt_to_vec(&public, "tamper").unwrap();

    // Every bit of key, ciphertext and tag.
    for index in 0..envelope.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered[index] ^= 1 << bit;
            assert_eq!(
                ecies.decrypt_to_vec(&secret, &tampered),
                Err(Error::AuthenticationFailed),
                "byte {index} bit {bit}"
            );
        }
    }
}

#[test]
#[cfg(feature = "std")]
fn tampered_nist_envelope_never_decrypts() {
    use ecies_x963::Error;

    for curve in [Curve::Prime256v1, Curve::Secp384r1, Curve::Secp521r1] {
        let ecies = Ecies::new(curve);
        let (secret, public) = recipient_keys(curve);
        let envelope = ecies.encrypt_to_vec(&public, "tamper").unwrap();

        // One bit per byte, walking through the bit positions.
        for index in 0..envelope.len() {
            let mut tampered = envelope.clone();
            tampered[index] ^= 1 << (index % 8);
            assert_eq!(
                ecies.decrypt_to_vec(&secret, &tampered),
                Err(Error::AuthenticationFailed),
                "{curve} byte {index}"
            );
        }
    }
}

#[test]
#[cfg(feature = "std")]
fn wrong_recipient() {
    use ecies_x963::Error;

    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let (_, public) = recipient_keys(curve);
        let (other_secret, _) = recipient_keys(curve);

        let envelope = ecies.encrypt(&public, "not for you").unwrap();
        assert_eq!(
            ecies.decrypt(&other_secret, &envelope),
            Err(Error::AuthenticationFailed)
        );
    }
}

#[test]
#[cfg(feature = "std")]
fn malformed_envelopes() {
    use ecies_x963::Error;

    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let required_bytes = ecies.parameters().encoded_public_key_len() + TAG_BYTES;
        let (secret, _) = recipient_keys(curve);

        for len in [0, 1, required_bytes / 2, required_bytes - 1] {
            assert_eq!(
                ecies.decrypt_to_vec(&secret, &vec![0x04u8; len]),
                Err(Error::MalformedEnvelope { required_bytes })
            );
        }
        assert_eq!(
            ecies.decrypt(&secret, "this is not base64"),
            Err(Error::MalformedEnvelope { required_bytes })
        );
    }
}

#[test]
#[cfg(feature = "std")]
fn invalid_public_keys() {
    use ecies_x963::Error;

    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let key_len = ecies.parameters().encoded_public_key_len();

        let mut off_curve = vec![0xFFu8; key_len];
        off_curve[0] = 0x04;
        assert_eq!(
            ecies.encrypt(&off_curve, "hello"),
            Err(Error::InvalidPublicKey)
        );
        assert_eq!(ecies.encrypt(&[] as &[u8], "hello"), Err(Error::InvalidPublicKey));

        let (_, public) = recipient_keys(curve);
        assert_eq!(
            ecies.encrypt(&public[..key_len - 1], "hello"),
            Err(Error::InvalidPublicKey)
        );
    }

    // A valid point on the wrong curve.
    let (_, p384_public) = recipient_keys(Curve::Secp384r1);
    assert_eq!(
        Ecies::new(Curve::Prime256v1).encrypt(&p384_public, "hello"),
        Err(Error::InvalidPublicKey)
    );
}

#[test]
#[cfg(feature = "std")]
fn compressed_recipient_keys() {
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    let (secret, public) = recipient_keys(Curve::Secp256k1);
    let compressed = secp256k1::PublicKey::from_slice(&public)
        .unwrap()
        .serialize();
    let ecies = Ecies::new(Curve::Secp256k1);
    let envelope = ecies.encrypt(&compressed, "compressed").unwrap();
    assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), "compressed");

    let (secret, public) = recipient_keys(Curve::Prime256v1);
    let compressed = p256::PublicKey::from_sec1_bytes(&public)
        .unwrap()
        .to_encoded_point(true);
    let ecies = Ecies::new(Curve::Prime256v1);
    let envelope = ecies.encrypt_to_vec(compressed.as_bytes(), "compressed").unwrap();
    // The ephemeral key is always uncompressed.
    assert_eq!(envelope.len(), 65 + 10 + TAG_BYTES);
    assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), "compressed");
}

#[test]
#[cfg(feature = "std")]
fn encryption_is_randomized() {
    for curve in Curve::ALL {
        let ecies = Ecies::new(curve);
        let key_len = ecies.parameters().encoded_public_key_len();
        let (secret, public) = recipient_keys(curve);

        let first = ecies.encrypt_to_vec(&public, "same message").unwrap();
        let second = ecies.encrypt_to_vec(&public, "same message").unwrap();
        assert_ne!(first, second);
        assert_ne!(first[..key_len], second[..key_len]);

        assert_eq!(ecies.decrypt(&secret, &first).unwrap(), "same message");
        assert_eq!(ecies.decrypt(&secret, &second).unwrap(), "same message");
    }
}

#[test]
#[cfg(feature = "std")]
fn concurrent_senders_use_distinct_ephemeral_keys() {
    use std::collections::HashSet;
    use std::thread;

    let ecies = Ecies::new(Curve::Prime256v1);
    let (secret, public) = recipient_keys(Curve::Prime256v1);

    let handles: Vec<_> = (0..8)
        .map(|sender| {
            let public = public.clone();
            thread::spawn(move || {
                (0..16)
                    .map(|n| {
                        let message = format!("sender {sender} message {n}");
                        (message.clone(), ecies.encrypt_to_vec(&public, &message).unwrap())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ephemeral_keys = HashSet::new();
    for handle in handles {
        for (message, envelope) in handle.join().unwrap() {
            assert!(ephemeral_keys.insert(envelope[..65].to_vec()));
            assert_eq!(ecies.decrypt(&secret, &envelope).unwrap(), message);
        }
    }
    assert_eq!(ephemeral_keys.len(), 8 * 16);
}

#[test]
#[cfg(feature = "std")]
fn seeded_rng_reproduces_envelope() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let ecies = Ecies::new(Curve::Secp384r1);
    let (secret, public) = recipient_keys(Curve::Secp384r1);

    let first = ecies
        .encrypt_with_rng(&public, "seeded", &mut StdRng::seed_from_u64(7))
        .unwrap();
    let second = ecies
        .encrypt_with_rng(&public, "seeded", &mut StdRng::seed_from_u64(7))
        .unwrap();
    let third = ecies
        .encrypt_with_rng(&public, "seeded", &mut StdRng::seed_from_u64(8))
        .unwrap();
    assert_eq!(first, second);
    assert_ne!(first, third);
    assert_eq!(ecies.decrypt(&secret, &first).unwrap(), "seeded");
}

#[test]
#[cfg(feature = "std")]
fn unsupported_curves() {
    use ecies_x963::Error;

    for name in ["secp224r1", "brainpoolP256r1", "ed25519", ""] {
        assert_eq!(Ecies::from_name(name), Err(Error::UnsupportedCurve));
    }
    for name in ["secp256r1", "P-384", "P521", "SECP256K1"] {
        assert!(Ecies::from_name(name).is_ok());
    }
}

#[cfg(feature = "std")]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_any_message(
            message in proptest::collection::vec(any::<u8>(), 0..512),
            curve in proptest::sample::select(Curve::ALL.to_vec()),
        ) {
            let ecies = Ecies::new(curve);
            let (secret, public) = recipient_keys(curve);

            let envelope = ecies.encrypt_to_vec(&public, &message).unwrap();
            prop_assert_eq!(
                envelope.len(),
                ecies.parameters().encoded_public_key_len() + message.len() + TAG_BYTES
            );
            prop_assert_eq!(ecies.decrypt_to_vec(&secret, &envelope).unwrap(), message);
        }
    }
}
