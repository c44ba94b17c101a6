//! SQLite persistence layer for the guide catalog.
//!
//! Provides schema creation, write operations (catalog entries, guide
//! references, cursors, run locks) and read queries backed by SQLite (via
//! rusqlite with the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, TIMESTAMP_FORMAT, acquire_run_lock, add_identifier, clear_cursor,
    find_entry_by_identifier, get_cursor, insert_catalog_entry, insert_unmatched, lock_age,
    mark_matched, release_run_lock, save_cursor, set_active_guide_if_empty, upsert_catalog_entry,
};
pub use queries::{
    CursorRow, GuideStats, LockRow, SourceStats, active_guide, find_reference_by_url,
    get_catalog_entry, guide_stats, list_cursors, list_run_locks, load_catalog, unmatched_after,
};
pub use schema::{SchemaError, open_database, open_memory};
