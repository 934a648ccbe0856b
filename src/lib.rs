// Head of State Ledger - Core Library
// Exposes the editor, the merger and their storage/config plumbing for the CLI, TUI and server

pub mod config;
pub mod editor;
pub mod logging;
pub mod merger;
pub mod storage;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use config::{AppConfig, StorageBackend};
pub use editor::{
    apply_submission, EditorSession, FormError, HeadOfStateForm, HeadOfStateRecord,
    HeadOfStateStore, HeadOfStateTable, RawHeadOfStateForm, COLUMNS, DEFAULT_OBJECT_KEY,
};
pub use merger::{
    merge_tables, run_merge, CountryNormalizer, IndicatorFile, IndicatorRecord, IndicatorSource,
    JoinReport, MergeError, MergeOutcome, MergedRecord, TenureRecord, WorldBankClient,
};
pub use storage::{LocalBucket, MemoryBucket, ObjectStore, S3Bucket, StorageError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
