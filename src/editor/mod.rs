// Persisted-Table Editor
// Storage Adapter → Table State → Form Intake → Merge-and-Persist

pub mod form;
pub mod record;
pub mod session;
pub mod store;

pub use form::{FormError, HeadOfStateForm, RawHeadOfStateForm};
pub use record::{HeadOfStateRecord, HeadOfStateTable, COLUMNS};
pub use session::{apply_submission, EditorSession};
pub use store::{HeadOfStateStore, DEFAULT_OBJECT_KEY};
