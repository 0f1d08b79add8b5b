use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding ledger data from its serialized form
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("Invalid digest length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// JSON formatter producing the separators of the canonical block encoding
///
/// Items are separated by `", "` and keys from values by `": "`. Combined
/// with the sorted keys of `serde_json::Value` objects this yields the exact
/// preimage that block hashes are computed over.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Encodes a JSON value as canonical bytes
///
/// `Value` objects keep their keys in a sorted map, so keys come out in
/// lexicographic order whatever order they were inserted in.
pub fn to_canonical_json(value: &Value) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, CanonicalFormatter);
    value
        .serialize(&mut serializer)
        .expect("encoding a JSON value into memory cannot fail");
    buffer
}
