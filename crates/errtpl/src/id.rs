//! Instance identifiers for error values.
//!
//! An `InstanceId` is a ULID followed by a short checksum:
//!
//! ```text
//! 01HZX3V9Q8D2K5M7N0P4R6T8WA-3F9A0C1
//! └──────────── ulid ──────────┘ └ crc ┘
//!   48-bit ms timestamp + 80 bits   7 hex digits of blake3(ulid)
//!   randomness, sortable by time
//! ```
//!
//! The ULID makes every instance unique and lets log lines sort by time.
//! The checksum is what operators read out over the phone: seven
//! characters, enough to tell two tickets apart, and it lets `parse`
//! reject ids that were mistyped.

use std::time::SystemTime;

use thiserror::Error;
use ulid::Ulid;

/// Number of hex digits in the checksum suffix.
pub const CHECKSUM_WIDTH: usize = 7;

/// Unique identifier of one error occurrence.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    ulid: Ulid,
    checksum: u32,
}

/// Failure to read an `InstanceId` back from text.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("instance id must look like <ULID>-<CHECKSUM>, got `{0}`")]
    Malformed(String),
    #[error("invalid ulid: {0}")]
    Ulid(#[from] ulid::DecodeError),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },
}

impl InstanceId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    /// Derive the checksum for an existing ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self { ulid, checksum: checksum_of(&ulid) }
    }

    /// Parse the `<ULID>-<CHECKSUM>` text form, validating the checksum.
    ///
    /// ```
    /// use errtpl::InstanceId;
    /// let id = InstanceId::generate();
    /// let back = InstanceId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, back);
    /// ```
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let (ulid, checksum) = text
            .trim()
            .split_once('-')
            .ok_or_else(|| IdError::Malformed(text.to_string()))?;
        if checksum.len() != CHECKSUM_WIDTH {
            return Err(IdError::Malformed(text.to_string()));
        }
        let id = Self::from_ulid(Ulid::from_string(ulid)?);
        if !id.checksum_hex().eq_ignore_ascii_case(checksum) {
            return Err(IdError::Checksum {
                expected: id.checksum_hex(),
                actual: checksum.to_string(),
            });
        }
        Ok(id)
    }

    #[inline]
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// The short, fixed-width checksum as uppercase hex.
    pub fn checksum_hex(&self) -> String {
        format!("{:0width$X}", self.checksum, width = CHECKSUM_WIDTH)
    }

    /// Wall-clock time the id was generated.
    pub fn created_at(&self) -> SystemTime {
        self.ulid.datetime()
    }
}

/// Top 28 bits of blake3 over the ULID text: exactly seven hex digits.
fn checksum_of(ulid: &Ulid) -> u32 {
    let hash = blake3::hash(ulid.to_string().as_bytes());
    let bytes = hash.as_bytes();
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) >> 4
}

impl core::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.ulid, self.checksum_hex())
    }
}

impl core::fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InstanceId")
            .field("ulid", &self.ulid.to_string())
            .field("checksum", &self.checksum_hex())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<InstanceId> = (0..1000).map(|_| InstanceId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn checksum_is_fixed_width() {
        for _ in 0..100 {
            let id = InstanceId::generate();
            let hex = id.checksum_hex();
            assert_eq!(hex.len(), CHECKSUM_WIDTH, "bad checksum: {}", hex);
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn checksum_is_deterministic() {
        let ulid = Ulid::new();
        assert_eq!(InstanceId::from_ulid(ulid), InstanceId::from_ulid(ulid));
    }

    #[test]
    fn display_format() {
        let id = InstanceId::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 26 + 1 + CHECKSUM_WIDTH);
        assert_eq!(&s[26..27], "-");
        assert!(s.ends_with(&id.checksum_hex()));
    }

    #[test]
    fn parse_accepts_lowercase_checksum() {
        let id = InstanceId::generate();
        let text = format!("{}-{}", id.ulid(), id.checksum_hex().to_lowercase());
        assert_eq!(InstanceId::parse(&text).unwrap(), id);
    }

    #[test]
    fn parse_rejects_wrong_checksum() {
        let id = InstanceId::generate();
        let flipped = if id.checksum_hex().starts_with('0') { "1" } else { "0" };
        let text = format!("{}-{}{}", id.ulid(), flipped, &id.checksum_hex()[1..]);
        assert!(matches!(InstanceId::parse(&text), Err(IdError::Checksum { .. })));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(InstanceId::parse("nope"), Err(IdError::Malformed(_))));
        assert!(matches!(InstanceId::parse("abc-123"), Err(IdError::Malformed(_))));
        assert!(matches!(InstanceId::parse("not-a-ulid-at-all-1234567"), Err(IdError::Malformed(_))));
        assert!(matches!(
            InstanceId::parse("!!!!!!!!!!!!!!!!!!!!!!!!!!-1234567"),
            Err(IdError::Ulid(_))
        ));
    }

    #[test]
    fn ids_sort_by_creation() {
        let first = InstanceId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = InstanceId::generate();
        assert!(first < second);
        assert!(first.created_at() <= second.created_at());
    }
}
