use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

use std::fmt;
use std::str::FromStr;

use super::codec::FormatError;

/// Length in bytes of a SHA-256 digest
pub const DIGEST_LENGTH: usize = 32;

/// Computes the SHA-256 digest of a byte string
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    Sha256::digest(data).into()
}

/// Computes the SHA-256 digest of a byte string as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// An account address: opaque bytes written as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Vec<u8>);

impl Address {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Address(bytes.into())
    }

    /// Parses an address from its hex form
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        Ok(Address(hex::decode(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A block digest, the link between a block and its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub [u8; DIGEST_LENGTH]);

impl BlockHash {
    /// All-zero digest used as the genesis block's previous hash
    pub const ZERO: BlockHash = BlockHash([0u8; DIGEST_LENGTH]);

    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = hex::decode(s)?;
        let got = bytes.len();
        let digest: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| FormatError::InvalidLength {
            expected: DIGEST_LENGTH,
            got,
        })?;
        Ok(BlockHash(digest))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockHash::from_hex(s)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BlockHash::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_round_trip() {
        let address = Address::from_hex("5ca60de0575441718094ea0ffcb02aa4").unwrap();
        assert_eq!(address.as_bytes().len(), 16);
        assert_eq!(address.to_string(), "5ca60de0575441718094ea0ffcb02aa4");
    }

    #[test]
    fn test_address_rejects_bad_hex() {
        assert!(matches!(
            Address::from_hex("not-hex"),
            Err(FormatError::InvalidHex(_))
        ));
        assert!(Address::from_hex("abc").is_err());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let address = Address::new(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"dead\"");
        let back: Address = serde_json::from_str("\"DEAD\"").unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn test_block_hash_requires_digest_length() {
        assert_eq!(BlockHash::from_hex(&"00".repeat(32)).unwrap(), BlockHash::ZERO);
        assert!(matches!(
            BlockHash::from_hex("0000"),
            Err(FormatError::InvalidLength { expected: 32, got: 2 })
        ));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
