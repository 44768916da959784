use crate::error::Result;
use crate::types::{DocumentMetadata, StoredDocument};
use rusqlite::{Connection, Row};

/// Schema version stored in `PRAGMA user_version`, grounded on
/// `other_examples/docstore_core.rs`'s migration-guard pattern.
const SCHEMA_VERSION: i64 = 1;

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    let current_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            library TEXT NOT NULL,
            version TEXT NOT NULL,
            url TEXT NOT NULL,
            content TEXT NOT NULL,
            metadata TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            UNIQUE(url, library, version, sort_order)
        );
        CREATE INDEX IF NOT EXISTS idx_documents_library ON documents(lower(library));
        CREATE INDEX IF NOT EXISTS idx_documents_library_version ON documents(lower(library), lower(version));

        CREATE TABLE IF NOT EXISTS documents_vec (
            rowid INTEGER PRIMARY KEY,
            library TEXT NOT NULL,
            version TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
            content, title, url, path,
            tokenize = 'porter unicode61'
        );

        CREATE TRIGGER IF NOT EXISTS documents_ai AFTER INSERT ON documents BEGIN
            INSERT INTO documents_fts(rowid, content, title, url, path)
            VALUES (
                new.id,
                new.content,
                coalesce(json_extract(new.metadata, '$.title'), ''),
                new.url,
                coalesce((SELECT group_concat(value, ' / ') FROM json_each(json_extract(new.metadata, '$.path'))), '')
            );
        END;

        CREATE TRIGGER IF NOT EXISTS documents_ad AFTER DELETE ON documents BEGIN
            DELETE FROM documents_fts WHERE rowid = old.id;
            DELETE FROM documents_vec WHERE rowid = old.id;
        END;

        CREATE TRIGGER IF NOT EXISTS documents_au AFTER UPDATE ON documents BEGIN
            DELETE FROM documents_fts WHERE rowid = old.id;
            INSERT INTO documents_fts(rowid, content, title, url, path)
            VALUES (
                new.id,
                new.content,
                coalesce(json_extract(new.metadata, '$.title'), ''),
                new.url,
                coalesce((SELECT group_concat(value, ' / ') FROM json_each(json_extract(new.metadata, '$.path'))), '')
            );
        END;
        ",
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

pub fn row_to_document(row: &Row) -> rusqlite::Result<StoredDocument> {
    let metadata_json: String = row.get(5)?;
    let metadata: DocumentMetadata = serde_json::from_str(&metadata_json).unwrap_or_default();
    Ok(StoredDocument {
        id: row.get(0)?,
        library: row.get(1)?,
        version: row.get(2)?,
        url: row.get(3)?,
        content: row.get(4)?,
        metadata,
        sort_order: row.get(6)?,
    })
}

pub fn get_document(conn: &Connection, id: i64) -> Result<Option<StoredDocument>> {
    let mut stmt = conn.prepare(
        "SELECT id, library, version, url, content, metadata, sort_order FROM documents WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(rusqlite::params![id], row_to_document)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}
