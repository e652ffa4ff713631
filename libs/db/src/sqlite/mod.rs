//! SQLite-specific helpers: DSN cleaning, path preparation and PRAGMA handling.

mod dsn;
mod pragmas;

pub use dsn::{extract_sqlite_pragmas, is_memory_dsn, prepare_sqlite_path, sqlite_file_path};
pub use pragmas::{JournalMode, Pragmas, SyncMode};
