use super::record::HeadOfStateTable;
use crate::storage::{ObjectStore, StorageError};
use tracing::{info, warn};

/// Default object key for the persisted table
pub const DEFAULT_OBJECT_KEY: &str = "head_of_state_data.csv";

/// Storage adapter: the whole table is one CSV object under a fixed key
pub struct HeadOfStateStore<S: ObjectStore> {
    bucket: S,
    key: String,
}

impl<S: ObjectStore> HeadOfStateStore<S> {
    pub fn new(bucket: S, key: impl Into<String>) -> Self {
        HeadOfStateStore {
            bucket,
            key: key.into(),
        }
    }

    /// Fetch and parse the table. A missing object yields an empty table.
    pub fn load(&self) -> Result<HeadOfStateTable, StorageError> {
        match self.bucket.get(&self.key)? {
            None => {
                warn!(
                    bucket = %self.bucket.describe(),
                    key = %self.key,
                    "object not found, starting with an empty table"
                );
                Ok(HeadOfStateTable::new())
            }
            Some(bytes) => {
                let table = HeadOfStateTable::from_csv(&bytes)?;
                info!(
                    bucket = %self.bucket.describe(),
                    key = %self.key,
                    rows = table.len(),
                    "loaded table"
                );
                Ok(table)
            }
        }
    }

    /// Serialize the full table and overwrite the object
    pub fn save(&self, table: &HeadOfStateTable) -> Result<(), StorageError> {
        let body = table.to_csv()?;
        self.bucket.put(&self.key, &body)?;
        info!(
            bucket = %self.bucket.describe(),
            key = %self.key,
            rows = table.len(),
            "saved table"
        );
        Ok(())
    }
}
