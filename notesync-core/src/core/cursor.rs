//! Positional access to a local note row.
//!
//! Sync-action derivation only ever reads four columns of the local store's
//! note projection. [`RowCursor`] abstracts over where the row comes from: a
//! live [`rusqlite::Row`] while iterating a query, or a [`NoteRow`] snapshot
//! captured earlier.

use crate::{Result, SyncError};

/// Position of the local row id.
pub const ID_COLUMN: usize = 0;
/// Position of the remote timestamp recorded at the last successful sync.
pub const SYNC_ID_COLUMN: usize = 12;
/// Position of the "locally modified since last sync" flag.
pub const LOCAL_MODIFIED_COLUMN: usize = 13;
/// Position of the remote identity recorded at the last successful sync.
pub const GTASK_ID_COLUMN: usize = 15;

/// A row of the local note store, read by column position.
pub trait RowCursor {
    /// Reads an integer column.
    fn long(&self, column: usize) -> Result<i64>;

    /// Reads a nullable text column.
    fn string(&self, column: usize) -> Result<Option<String>>;
}

/// Integer columns read `NULL` as 0, the way the local store's own cursors do.
impl RowCursor for rusqlite::Row<'_> {
    fn long(&self, column: usize) -> Result<i64> {
        let value: Option<i64> = self.get(column)?;
        Ok(value.unwrap_or(0))
    }

    fn string(&self, column: usize) -> Result<Option<String>> {
        Ok(self.get(column)?)
    }
}

/// The columns of a local note row that reconciliation depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteRow {
    pub id: i64,
    pub sync_id: i64,
    pub local_modified: bool,
    pub gtask_id: Option<String>,
}

impl NoteRow {
    /// Copies the reconciliation columns out of `cursor`.
    pub fn from_cursor(cursor: &dyn RowCursor) -> Result<Self> {
        Ok(Self {
            id: cursor.long(ID_COLUMN)?,
            sync_id: cursor.long(SYNC_ID_COLUMN)?,
            local_modified: cursor.long(LOCAL_MODIFIED_COLUMN)? != 0,
            gtask_id: cursor.string(GTASK_ID_COLUMN)?,
        })
    }
}

impl RowCursor for NoteRow {
    fn long(&self, column: usize) -> Result<i64> {
        match column {
            ID_COLUMN => Ok(self.id),
            SYNC_ID_COLUMN => Ok(self.sync_id),
            LOCAL_MODIFIED_COLUMN => Ok(i64::from(self.local_modified)),
            _ => Err(SyncError::MissingColumn(column)),
        }
    }

    fn string(&self, column: usize) -> Result<Option<String>> {
        match column {
            GTASK_ID_COLUMN => Ok(self.gtask_id.clone()),
            _ => Err(SyncError::MissingColumn(column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    /// Builds a table whose column order mirrors the local note projection.
    fn note_table() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE note (
                id INTEGER PRIMARY KEY,
                alerted_date INTEGER, bg_color_id INTEGER, created_date INTEGER,
                has_attachment INTEGER, modified_date INTEGER, notes_count INTEGER,
                parent_id INTEGER, snippet TEXT, type INTEGER, widget_id INTEGER,
                widget_type INTEGER,
                sync_id INTEGER DEFAULT 0,
                local_modified INTEGER DEFAULT 0,
                origin_parent_id INTEGER,
                gtask_id TEXT,
                version INTEGER
            );
            INSERT INTO note (id, snippet, type, sync_id, local_modified, gtask_id)
                VALUES (7, 'hello', 0, 1700, 1, 'gid-7');
            INSERT INTO note (id, snippet, type, sync_id, local_modified, gtask_id)
                VALUES (8, 'fresh', 0, 0, 1, NULL);
            INSERT INTO note (id, snippet, type, sync_id, local_modified, gtask_id)
                VALUES (9, 'legacy', 0, NULL, NULL, NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_sqlite_row_reads_projection_columns() {
        let conn = note_table();
        let row = conn
            .query_row("SELECT * FROM note WHERE id = 7", [], |row| {
                Ok(NoteRow::from_cursor(row).unwrap())
            })
            .unwrap();

        assert_eq!(
            row,
            NoteRow {
                id: 7,
                sync_id: 1700,
                local_modified: true,
                gtask_id: Some("gid-7".to_string()),
            }
        );
    }

    #[test]
    fn test_sqlite_row_null_gtask_id() {
        let conn = note_table();
        let row = conn
            .query_row("SELECT * FROM note WHERE id = 8", [], |row| {
                Ok(NoteRow::from_cursor(row).unwrap())
            })
            .unwrap();
        assert!(row.gtask_id.is_none());
    }

    #[test]
    fn test_sqlite_row_null_integers_read_as_zero() {
        let conn = note_table();
        let row = conn
            .query_row("SELECT * FROM note WHERE id = 9", [], |row| {
                Ok(NoteRow::from_cursor(row).unwrap())
            })
            .unwrap();
        assert_eq!(row.sync_id, 0);
        assert!(!row.local_modified);
    }

    #[test]
    fn test_sqlite_row_text_in_integer_column_is_error() {
        let conn = note_table();
        let failed = conn
            .query_row("SELECT snippet FROM note WHERE id = 9", [], |row| {
                Ok(row.long(0).is_err())
            })
            .unwrap();
        assert!(failed);
    }

    #[test]
    fn test_sqlite_row_out_of_range_column_is_error() {
        let conn = note_table();
        let result = conn
            .query_row("SELECT id FROM note WHERE id = 7", [], |row| {
                Ok(row.long(SYNC_ID_COLUMN).is_err())
            })
            .unwrap();
        assert!(result);
    }

    #[test]
    fn test_snapshot_rejects_unknown_columns() {
        let row = NoteRow::default();
        assert!(matches!(row.long(3), Err(SyncError::MissingColumn(3))));
        assert!(matches!(row.string(ID_COLUMN), Err(SyncError::MissingColumn(0))));
        assert_eq!(row.long(LOCAL_MODIFIED_COLUMN).unwrap(), 0);
    }
}
