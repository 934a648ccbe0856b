// 🪣 Object Storage - read/write whole objects by key
// Three backends: S3 (signed HTTP), local directory, in-memory

pub mod local;
pub mod memory;
pub mod s3;
pub mod sigv4;

use thiserror::Error;

pub use local::LocalBucket;
pub use memory::MemoryBucket;
pub use s3::{S3Bucket, S3Settings};

// ============================================================================
// ERRORS
// ============================================================================

/// Everything that can go wrong talking to a bucket.
///
/// A missing object is NOT an error: `ObjectStore::get` returns `Ok(None)`.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bucket returned HTTP {status} for {key}: {body}")]
    Status {
        status: u16,
        key: String,
        body: String,
    },

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// OBJECT STORE TRAIT
// ============================================================================

/// ObjectStore - minimal bucket contract
///
/// Whole-object reads and writes only. No listing, no partial writes, no retry.
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. `Ok(None)` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite (or create) an object with `body`.
    fn put(&self, key: &str, body: &[u8]) -> Result<(), StorageError>;

    /// Short label for logs
    fn describe(&self) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, body)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
