use super::{ObjectStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-process bucket. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryBucket {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (tests, dry runs)
    pub fn with_object(self, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), body.into());
        self
    }

    /// Object body as text, if present
    pub fn object_text(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryBucket {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), StorageError> {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let bucket = MemoryBucket::new();
        assert!(bucket.get("nope.csv").unwrap().is_none());
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let bucket = MemoryBucket::new().with_object("a.csv", "old");
        bucket.put("a.csv", b"new").unwrap();

        assert_eq!(bucket.object_text("a.csv").as_deref(), Some("new"));
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn test_clones_share_objects() {
        let bucket = MemoryBucket::new();
        let other = bucket.clone();
        other.put("k", b"v").unwrap();

        assert_eq!(bucket.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
