// SPDX-License-Identifier: CC0-1.0

//! Curve selection and the per-curve parameters of the scheme.
//!
//! The table below is the only place curve-specific sizes live. Everything
//! downstream (key agreement, key derivation, envelope codec) reads its
//! lengths from a `&'static CurveParameters` resolved once at construction.
//!
//! | Curve | Field bits | Encoded public key | AES key |
//! |-------|------------|--------------------|---------|
//! | secp256k1 | 256 | 65 bytes | 128 bits |
//! | prime256v1 | 256 | 65 bytes | 128 bits |
//! | secp384r1 | 384 | 97 bytes | 256 bits |
//! | secp521r1 | 521 | 133 bytes | 256 bits |

use core::fmt;
use core::str::FromStr;

use crate::Error;

/// Number of bytes of the AES-GCM nonce.
pub const NONCE_LEN: usize = 16;

/// Named curves supported by the scheme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    /// SEC 2 secp256k1.
    Secp256k1,
    /// NIST P-256, also known as secp256r1.
    Prime256v1,
    /// NIST P-384.
    Secp384r1,
    /// NIST P-521.
    Secp521r1,
}

impl Curve {
    /// All supported curves, in table order.
    pub const ALL: [Curve; 4] = [
        Curve::Secp256k1,
        Curve::Prime256v1,
        Curve::Secp384r1,
        Curve::Secp521r1,
    ];

    /// Canonical (OpenSSL) name of the curve.
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Secp256k1 => "secp256k1",
            Curve::Prime256v1 => "prime256v1",
            Curve::Secp384r1 => "secp384r1",
            Curve::Secp521r1 => "secp521r1",
        }
    }

    /// Static parameters for this curve.
    pub fn parameters(&self) -> &'static CurveParameters {
        match self {
            Curve::Secp256k1 => &PARAMETERS[0],
            Curve::Prime256v1 => &PARAMETERS[1],
            Curve::Secp384r1 => &PARAMETERS[2],
            Curve::Secp521r1 => &PARAMETERS[3],
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Curve {
    type Err = Error;

    /// Parse a curve identifier, accepting OpenSSL names and NIST aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, Curve); 11] = [
            ("secp256k1", Curve::Secp256k1),
            ("prime256v1", Curve::Prime256v1),
            ("secp256r1", Curve::Prime256v1),
            ("p-256", Curve::Prime256v1),
            ("p256", Curve::Prime256v1),
            ("secp384r1", Curve::Secp384r1),
            ("p-384", Curve::Secp384r1),
            ("p384", Curve::Secp384r1),
            ("secp521r1", Curve::Secp521r1),
            ("p-521", Curve::Secp521r1),
            ("p521", Curve::Secp521r1),
        ];

        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, curve)| *curve)
            .ok_or(Error::UnsupportedCurve)
    }
}

/// Strength of the AES key used with a curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeySize {
    /// AES-128, used by the 256-bit curves.
    Aes128,
    /// AES-256, used by every larger curve.
    Aes256,
}

impl KeySize {
    /// Key length in bytes.
    pub const fn byte_len(&self) -> usize {
        match self {
            KeySize::Aes128 => 16,
            KeySize::Aes256 => 32,
        }
    }
}

/// Immutable parameters of one curve.
#[derive(Debug, PartialEq, Eq)]
pub struct CurveParameters {
    curve: Curve,
    field_bits: usize,
    key_size: KeySize,
}

static PARAMETERS: [CurveParameters; 4] = [
    CurveParameters::new(Curve::Secp256k1, 256),
    CurveParameters::new(Curve::Prime256v1, 256),
    CurveParameters::new(Curve::Secp384r1, 384),
    CurveParameters::new(Curve::Secp521r1, 521),
];

impl CurveParameters {
    const fn new(curve: Curve, field_bits: usize) -> Self {
        // Only secp256k1 and prime256v1 are in the standard strength tier.
        let key_size = match curve {
            Curve::Secp256k1 | Curve::Prime256v1 => KeySize::Aes128,
            Curve::Secp384r1 | Curve::Secp521r1 => KeySize::Aes256,
        };
        CurveParameters {
            curve,
            field_bits,
            key_size,
        }
    }

    /// The curve these parameters describe.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Size of the curve's base field in bits.
    pub fn field_bits(&self) -> usize {
        self.field_bits
    }

    /// Length of an uncompressed SEC1 point: `0x04 || x || y`.
    pub const fn encoded_public_key_len(&self) -> usize {
        1 + 2 * ((self.field_bits + 7) / 8)
    }

    /// AES key size for this curve.
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// AES key length in bytes.
    pub fn symmetric_key_len(&self) -> usize {
        self.key_size.byte_len()
    }

    /// AES-GCM nonce length in bytes, the same for every curve.
    pub fn nonce_len(&self) -> usize {
        NONCE_LEN
    }
}
