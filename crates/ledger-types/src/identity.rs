//! Caller identity.
//!
//! Identities arrive pre-authenticated from the host environment. The ledger
//! only needs them to be comparable, hashable and printable, so they are kept
//! as a fixed 20-byte value rendered as `0x`-prefixed hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing an identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
	#[error("Invalid hex encoding: {0}")]
	Hex(String),
	#[error("Invalid identity length: expected {expected} bytes, got {actual}")]
	Length { expected: usize, actual: usize },
}

/// Opaque, host-authenticated caller reference.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(pub [u8; Identity::LEN]);

impl Identity {
	/// Number of bytes in an identity.
	pub const LEN: usize = 20;

	/// The all-zero identity. Never a valid caller or lookup target.
	pub const NULL: Identity = Identity([0u8; Identity::LEN]);

	/// Builds an identity from a byte slice of exactly [`Identity::LEN`] bytes.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
		let array: [u8; Self::LEN] = bytes.try_into().map_err(|_| IdentityError::Length {
			expected: Self::LEN,
			actual: bytes.len(),
		})?;
		Ok(Self(array))
	}

	/// Returns true for the all-zero identity.
	pub fn is_null(&self) -> bool {
		self.0 == [0u8; Self::LEN]
	}

	/// Lowercase hex without the `0x` prefix, used as a storage key.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", self.to_hex())
	}
}

impl fmt::Debug for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl FromStr for Identity {
	type Err = IdentityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let digits = trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
			.unwrap_or(trimmed);
		let bytes = hex::decode(digits).map_err(|e| IdentityError::Hex(e.to_string()))?;
		Self::from_slice(&bytes)
	}
}

impl Serialize for Identity {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Identity {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}
