//! Package identifiers and hashes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a package within one document (SPDXID, bom-ref, tagId).
///
/// Identifiers are compared exactly; they are unique within a well-formed
/// document, and duplicates are flagged rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    /// Create a new identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the identifier string
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty or whitespace-only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PackageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Hash algorithm of a package checksum
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_512,
    Blake2b256,
    Blake3,
    Other(String),
}

impl HashAlgorithm {
    /// Parse an algorithm name as written by SPDX ("SHA256") or
    /// `CycloneDX` ("SHA-256").
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_uppercase().replace('_', "-").as_str() {
            "MD5" => Self::Md5,
            "SHA1" | "SHA-1" => Self::Sha1,
            "SHA256" | "SHA-256" => Self::Sha256,
            "SHA384" | "SHA-384" => Self::Sha384,
            "SHA512" | "SHA-512" => Self::Sha512,
            "SHA3-256" => Self::Sha3_256,
            "SHA3-512" => Self::Sha3_512,
            "BLAKE2B-256" => Self::Blake2b256,
            "BLAKE3" => Self::Blake3,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "MD5"),
            Self::Sha1 => write!(f, "SHA-1"),
            Self::Sha256 => write!(f, "SHA-256"),
            Self::Sha384 => write!(f, "SHA-384"),
            Self::Sha512 => write!(f, "SHA-512"),
            Self::Sha3_256 => write!(f, "SHA3-256"),
            Self::Sha3_512 => write!(f, "SHA3-512"),
            Self::Blake2b256 => write!(f, "BLAKE2b-256"),
            Self::Blake3 => write!(f, "BLAKE3"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A package checksum
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,
    /// Hex-encoded digest
    pub value: String,
}

impl Checksum {
    /// Create a new checksum
    pub fn new(algorithm: HashAlgorithm, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_id_blank() {
        assert!(PackageId::new("  ").is_blank());
        assert!(!PackageId::new("SPDXRef-Package").is_blank());
    }

    #[test]
    fn test_hash_algorithm_spellings() {
        assert_eq!(HashAlgorithm::parse("SHA256"), HashAlgorithm::Sha256);
        assert_eq!(HashAlgorithm::parse("sha-256"), HashAlgorithm::Sha256);
        assert_eq!(HashAlgorithm::parse("SHA1"), HashAlgorithm::Sha1);
        assert_eq!(
            HashAlgorithm::parse("ADLER32"),
            HashAlgorithm::Other("ADLER32".to_string())
        );
    }

    #[test]
    fn test_package_id_serializes_as_string() {
        let id = PackageId::new("pkg-a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"pkg-a\"");
    }
}
