//! Two-character tags used both as per-process user identity and game id.
//!
//! Tags are not globally unique. A user tag only serves to drop our own
//! transmissions when the channel loops them back; collisions go unhandled.

use core::fmt;

use rand::Rng;

use crate::config::{TAG_ALPHABET, TAG_LEN};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    /// Draw a fresh tag from `A-Z`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes = core::array::from_fn(|_| TAG_ALPHABET[rng.random_range(0..TAG_ALPHABET.len())]);
        Tag(bytes)
    }

    /// Any printable, non-space ASCII pair is a valid tag on the wire.
    pub fn from_bytes(bytes: [u8; TAG_LEN]) -> Option<Self> {
        bytes
            .iter()
            .all(u8::is_ascii_graphic)
            .then_some(Tag(bytes))
    }

    pub fn parse(s: &str) -> Option<Self> {
        let bytes: [u8; TAG_LEN] = s.as_bytes().try_into().ok()?;
        Self::from_bytes(bytes)
    }

    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII.
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.as_str())
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn random_tags_are_uppercase_pairs() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let tag = Tag::random(&mut rng);
            assert_eq!(tag.as_str().len(), 2);
            assert!(tag.as_str().bytes().all(|b| b.is_ascii_uppercase()));
        }
    }

    #[test]
    fn parse_rejects_wrong_width_and_spaces() {
        assert_eq!(Tag::parse("AB").map(|t| t.to_string()), Some("AB".into()));
        assert_eq!(Tag::parse("01").map(|t| t.to_string()), Some("01".into()));
        assert!(Tag::parse("A").is_none());
        assert!(Tag::parse("ABC").is_none());
        assert!(Tag::parse(" A").is_none());
    }
}
