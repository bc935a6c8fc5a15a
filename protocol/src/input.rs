// SPDX-License-Identifier: CC0-1.0

//! Caller supplied keys, messages and envelopes.
//!
//! Each argument of the public API arrives as an [`Input`] and is normalized
//! to bytes exactly once. What text means depends on the argument. A message
//! given as text is its UTF-8 encoding. Keys and envelopes given as text are
//! always base64.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine as _};

/// Decode standard padded base64, ignoring surrounding whitespace.
pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(text.trim())
}

/// Bytes or text handed to the encrypt and decrypt entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// Raw bytes, used as is.
    Bytes(&'a [u8]),
    /// Text whose meaning depends on the argument it is passed as.
    Utf8Text(&'a str),
    /// Base64 text, always decoded.
    Base64Text(&'a str),
}

impl<'a> Input<'a> {
    /// Plain text input.
    pub fn text(text: &'a str) -> Self {
        Input::Utf8Text(text)
    }

    /// Base64 encoded input.
    pub fn base64(text: &'a str) -> Self {
        Input::Base64Text(text)
    }

    /// Normalize a message. Plain text contributes its UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Base64 text that does not decode.
    pub fn to_message_bytes(&self) -> Result<Cow<'a, [u8]>, DecodeError> {
        match *self {
            Input::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Input::Utf8Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
            Input::Base64Text(text) => decode_base64(text).map(Cow::Owned),
        }
    }

    /// Normalize a key or an envelope. Any text is base64.
    ///
    /// # Errors
    ///
    /// Text that does not decode.
    pub fn to_binary_bytes(&self) -> Result<Cow<'a, [u8]>, DecodeError> {
        match *self {
            Input::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Input::Utf8Text(text) | Input::Base64Text(text) => decode_base64(text).map(Cow::Owned),
        }
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Input<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Utf8Text(text)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Utf8Text(text)
    }
}
