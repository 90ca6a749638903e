//! Commitment primitive for items and nodes of the Merkle tree.
//!
//! A single function, SHA-256, commits to raw leaf data and combines two
//! child digests into their parent:
//!
//! ```text
//! leaf  = H(data)
//! node  = H(left || right)
//! ```
//!
//! There is no prefix byte separating the two uses.

use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::{MerkleError, Result};

/// Size of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Fixed-size output of the commitment primitive.
///
/// Formats as lowercase hex with no separators and no prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Digest {
        Digest(bytes)
    }

    /// Copies a digest out of a slice, which must be exactly [`DIGEST_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Digest> {
        if bytes.len() != DIGEST_LEN {
            return Err(MerkleError::InvalidDigest(format!(
                "expected {} bytes, got {}",
                DIGEST_LEN,
                bytes.len()
            )));
        }
        let mut d = [0u8; DIGEST_LEN];
        d.copy_from_slice(bytes);
        Ok(Digest(d))
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl FromStr for Digest {
    type Err = MerkleError;

    /// Parses exactly `2 * DIGEST_LEN` hex characters, either case.
    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 2 * DIGEST_LEN {
            return Err(MerkleError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                2 * DIGEST_LEN,
                s.len()
            )));
        }
        if !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(MerkleError::InvalidDigest(format!(
                "non-hex character in {:?}",
                s
            )));
        }

        let mut d = [0u8; DIGEST_LEN];
        for (i, byte) in d.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|e| MerkleError::InvalidDigest(e.to_string()))?;
        }
        Ok(Digest(d))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait and provides methods to return
/// full length hash and reset current state. Most digest engines are left
/// unusable by finalization, hence the `start-update-finish-reset` lifecycle.
pub trait Algorithm<T>: Hasher + Default
where
    T: AsRef<[u8]> + Clone,
{
    /// Returns the hash value for the data stream written so far and resets
    /// the state.
    fn hash(&mut self) -> T;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Returns the hash value for a MT leaf holding `data`.
    fn leaf(&mut self, data: &[u8]) -> T {
        self.reset();
        self.write(data);
        self.hash()
    }

    /// Returns the hash value for a MT interior node, left child first.
    fn node(&mut self, left: &T, right: &T) -> T {
        self.reset();
        self.write(left.as_ref());
        self.write(right.as_ref());
        self.hash()
    }
}

/// SHA-256 as an [`Algorithm`] over [`Digest`].
#[derive(Clone, Default)]
pub struct Sha256Algorithm(Sha256);

impl Sha256Algorithm {
    /// Creates a hasher with empty state.
    pub fn new() -> Sha256Algorithm {
        Sha256Algorithm(Sha256::new())
    }
}

impl fmt::Debug for Sha256Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha256Algorithm").finish_non_exhaustive()
    }
}

impl Hasher for Sha256Algorithm {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        self.0.update(msg)
    }

    /// First eight bytes of the digest so far, little-endian.
    ///
    /// Only for `std::hash` consumers; a truncated digest is not a
    /// commitment. Use [`Algorithm::hash`] for that.
    #[inline]
    fn finish(&self) -> u64 {
        let h = self.0.clone().finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&h[..8]);
        u64::from_le_bytes(word)
    }
}

impl Algorithm<Digest> for Sha256Algorithm {
    #[inline]
    fn hash(&mut self) -> Digest {
        let h = self.0.finalize_reset();
        let mut d = [0u8; DIGEST_LEN];
        d.copy_from_slice(&h);
        Digest(d)
    }

    #[inline]
    fn reset(&mut self) {
        sha2::Digest::reset(&mut self.0);
    }
}

/// Commits to raw bytes: `SHA-256(data)`.
pub fn commit<D: AsRef<[u8]>>(data: D) -> Digest {
    Sha256Algorithm::new().leaf(data.as_ref())
}

/// Parent digest of two children: `SHA-256(left || right)`.
pub fn commit_node(left: &Digest, right: &Digest) -> Digest {
    Sha256Algorithm::new().node(left, right)
}
