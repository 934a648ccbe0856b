use super::form::HeadOfStateForm;
use super::record::{HeadOfStateRecord, HeadOfStateTable};
use super::store::HeadOfStateStore;
use crate::storage::{ObjectStore, StorageError};
use tracing::info;

/// Pure part of a submission: (old table, form) -> (new table, new record)
pub fn apply_submission(
    table: &HeadOfStateTable,
    form: HeadOfStateForm,
) -> (HeadOfStateTable, HeadOfStateRecord) {
    let record = form.into_record();
    (table.with_prepended(record.clone()), record)
}

/// One user's editor session: the table loaded once, plus where to save it.
///
/// No locking or version check against the stored object: the last save wins.
pub struct EditorSession<S: ObjectStore> {
    store: HeadOfStateStore<S>,
    table: HeadOfStateTable,
}

impl<S: ObjectStore> EditorSession<S> {
    /// Load the table once from storage
    pub fn open(store: HeadOfStateStore<S>) -> Result<Self, StorageError> {
        let table = store.load()?;
        Ok(EditorSession { store, table })
    }

    pub fn table(&self) -> &HeadOfStateTable {
        &self.table
    }

    pub fn ranked(&self) -> Vec<&HeadOfStateRecord> {
        self.table.ranked()
    }

    /// Prepend the new record and overwrite the stored object with the full table.
    ///
    /// The in-memory table only changes once the save succeeded.
    pub fn submit(&mut self, form: HeadOfStateForm) -> Result<HeadOfStateRecord, StorageError> {
        let (next, record) = apply_submission(&self.table, form);
        self.store.save(&next)?;
        self.table = next;

        info!(
            name = %record.name,
            growth = %record.gdp_growth,
            rows = self.table.len(),
            "head of state added"
        );
        Ok(record)
    }

    /// Drop local state and re-read the stored object
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.table = self.store.load()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::form::RawHeadOfStateForm;
    use crate::editor::store::DEFAULT_OBJECT_KEY;
    use crate::storage::MemoryBucket;
    use rust_decimal::Decimal;

    fn form(name: &str, gdp_start: &str, gdp_end: &str) -> HeadOfStateForm {
        RawHeadOfStateForm {
            name: name.to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: "2021-01-01".to_string(),
            gdp_start: gdp_start.to_string(),
            gdp_end: gdp_end.to_string(),
        }
        .parse()
        .unwrap()
    }

    #[test]
    fn test_apply_submission_is_pure() {
        let old = HeadOfStateTable::new();
        let (new, record) = apply_submission(&old, form("A", "1", "2"));

        assert!(old.is_empty());
        assert_eq!(new.rows(), &[record]);
    }

    #[test]
    fn test_end_to_end_first_submission() {
        let bucket = MemoryBucket::new();
        let store = HeadOfStateStore::new(bucket.clone(), DEFAULT_OBJECT_KEY);
        let mut session = EditorSession::open(store).unwrap();
        assert!(session.table().is_empty());

        let record = session.submit(form("A", "10.00", "12.50")).unwrap();

        assert_eq!(record.gdp_growth, Decimal::new(250, 2));
        assert_eq!(session.table().len(), 1);
        assert_eq!(
            bucket.object_text(DEFAULT_OBJECT_KEY).unwrap(),
            "Name,Start Date,End Date,GDP Start,GDP End,GDP Growth\n\
             A,2020-01-01,2021-01-01,10.00,12.50,2.50\n"
        );
    }

    #[test]
    fn test_new_rows_are_prepended() {
        let bucket = MemoryBucket::new();
        let mut session =
            EditorSession::open(HeadOfStateStore::new(bucket.clone(), DEFAULT_OBJECT_KEY)).unwrap();

        session.submit(form("First", "1", "5")).unwrap();
        session.submit(form("Second", "1", "2")).unwrap();

        let names: Vec<&str> = session.table().rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);

        let ranked: Vec<&str> = session.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(ranked, vec!["First", "Second"]);

        // A fresh session sees the same stored order
        let reopened = EditorSession::open(HeadOfStateStore::new(bucket, DEFAULT_OBJECT_KEY)).unwrap();
        assert_eq!(reopened.table(), session.table());
    }

    #[test]
    fn test_last_save_wins_between_sessions() {
        let bucket = MemoryBucket::new();
        let mut alice =
            EditorSession::open(HeadOfStateStore::new(bucket.clone(), DEFAULT_OBJECT_KEY)).unwrap();
        let mut bob =
            EditorSession::open(HeadOfStateStore::new(bucket.clone(), DEFAULT_OBJECT_KEY)).unwrap();

        alice.submit(form("Alice's pick", "1", "2")).unwrap();
        bob.submit(form("Bob's pick", "1", "3")).unwrap();

        let mut fresh =
            EditorSession::open(HeadOfStateStore::new(bucket, DEFAULT_OBJECT_KEY)).unwrap();
        fresh.reload().unwrap();
        assert_eq!(fresh.table().len(), 1);
        assert_eq!(fresh.table().rows()[0].name, "Bob's pick");
    }
}
