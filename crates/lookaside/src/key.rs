use std::fmt;
use std::sync::Arc;

/// Identifies one cache entry.
///
/// A key is an ordered sequence of opaque string segments, typically
/// `(operation, path or user, zone)`. Two keys with equal segment sequences
/// address the same entry.
///
/// Keys are cheap to clone and are used directly as map keys in the
/// [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    segments: Arc<[String]>,
}

impl CacheKey {
    /// Creates a [`CacheKey`] from a sequence of segments.
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        CacheKey {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a [`CacheKeyBuilder`] to assemble a key segment by segment.
    pub fn builder() -> CacheKeyBuilder {
        CacheKeyBuilder::default()
    }

    /// The ordered segments this key consists of.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.segments.iter();
        if let Some(first) = segments.next() {
            f.write_str(first)?;
        }
        for segment in segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// A builder for [`CacheKey`]s.
///
/// The builder accepts human readable, but most importantly **stable**,
/// segments: the segment sequence is the identity of the cache entry, so the
/// same logical lookup must always produce the same segments.
#[derive(Debug, Default)]
pub struct CacheKeyBuilder {
    segments: Vec<String>,
}

impl CacheKeyBuilder {
    /// Appends a segment.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Finalizes the [`CacheKey`].
    pub fn build(self) -> CacheKey {
        CacheKey {
            segments: self.segments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_segments_same_entry() {
        let a = CacheKey::new(["file-exists", "/etc/motd", "zone-a"]);
        let b = CacheKey::builder()
            .segment("file-exists")
            .segment("/etc/motd")
            .segment("zone-a")
            .build();
        assert_eq!(a, b);

        let c = CacheKey::new(["file-exists", "/etc/motd", "zone-b"]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_joins_segments() {
        let key = CacheKey::new(["user-home", "alice"]);
        assert_eq!(key.to_string(), "user-home/alice");
        assert_eq!(CacheKey::new(Vec::<String>::new()).to_string(), "");
    }

    #[test]
    fn test_segments_are_ordered() {
        let key = CacheKey::new(["a", "b"]);
        assert_ne!(key, CacheKey::new(["b", "a"]));
        assert_eq!(key.segments(), ["a".to_string(), "b".to_string()]);
    }
}
