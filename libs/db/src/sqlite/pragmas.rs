//! SQLite PRAGMA parameter handling with typed enums.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use crate::DbError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Wal,
    Memory,
    Truncate,
    Persist,
    Off,
}

impl JournalMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DELETE" => Some(Self::Delete),
            "WAL" => Some(Self::Wal),
            "MEMORY" => Some(Self::Memory),
            "TRUNCATE" => Some(Self::Truncate),
            "PERSIST" => Some(Self::Persist),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }

    fn to_sqlx(self) -> SqliteJournalMode {
        match self {
            Self::Delete => SqliteJournalMode::Delete,
            Self::Wal => SqliteJournalMode::Wal,
            Self::Memory => SqliteJournalMode::Memory,
            Self::Truncate => SqliteJournalMode::Truncate,
            Self::Persist => SqliteJournalMode::Persist,
            Self::Off => SqliteJournalMode::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl SyncMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" => Some(Self::Off),
            "NORMAL" => Some(Self::Normal),
            "FULL" => Some(Self::Full),
            "EXTRA" => Some(Self::Extra),
            _ => None,
        }
    }

    fn to_sqlx(self) -> SqliteSynchronous {
        match self {
            Self::Off => SqliteSynchronous::Off,
            Self::Normal => SqliteSynchronous::Normal,
            Self::Full => SqliteSynchronous::Full,
            Self::Extra => SqliteSynchronous::Extra,
        }
    }
}

/// Parsed and validated SQLite PRAGMA parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pragmas {
    pub journal_mode: Option<JournalMode>,
    pub synchronous: Option<SyncMode>,
    pub busy_timeout_ms: Option<u64>,
}

impl Pragmas {
    /// Validate whitelisted pairs (keys already lowercased).
    ///
    /// `wal=true|false|1|0` is accepted as shorthand for `journal_mode`;
    /// an explicit `journal_mode` wins over it.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<Self, DbError> {
        let mut pragmas = Pragmas::default();
        let mut wal_toggle = None;

        for (key, value) in pairs {
            match key.as_str() {
                "journal_mode" => {
                    pragmas.journal_mode = Some(JournalMode::parse(value).ok_or_else(|| {
                        invalid(key, format!("must be DELETE/WAL/MEMORY/TRUNCATE/PERSIST/OFF, got '{value}'"))
                    })?);
                }
                "synchronous" => {
                    pragmas.synchronous = Some(SyncMode::parse(value).ok_or_else(|| {
                        invalid(key, format!("must be OFF/NORMAL/FULL/EXTRA, got '{value}'"))
                    })?);
                }
                "busy_timeout" => {
                    pragmas.busy_timeout_ms = Some(value.parse::<u64>().map_err(|_| {
                        invalid(key, format!("must be a non-negative integer, got '{value}'"))
                    })?);
                }
                "wal" => {
                    wal_toggle = Some(match value.to_ascii_lowercase().as_str() {
                        "true" | "1" => JournalMode::Wal,
                        "false" | "0" => JournalMode::Delete,
                        _ => return Err(invalid(key, format!("must be true/false/1/0, got '{value}'"))),
                    });
                }
                other => tracing::debug!("Unknown SQLite PRAGMA parameter: {}", other),
            }
        }

        if pragmas.journal_mode.is_none() {
            pragmas.journal_mode = wal_toggle;
        }
        Ok(pragmas)
    }

    /// Apply onto connect options. File databases default to WAL + NORMAL.
    pub fn apply(&self, mut opts: SqliteConnectOptions, in_memory: bool) -> SqliteConnectOptions {
        match self.journal_mode {
            Some(mode) => opts = opts.journal_mode(mode.to_sqlx()),
            None if !in_memory => opts = opts.journal_mode(SqliteJournalMode::Wal),
            None => {}
        }
        opts = opts.synchronous(self.synchronous.unwrap_or(SyncMode::Normal).to_sqlx());
        if let Some(ms) = self.busy_timeout_ms {
            opts = opts.busy_timeout(Duration::from_millis(ms));
        }
        opts
    }
}

fn invalid(key: &str, message: String) -> DbError {
    DbError::InvalidSqlitePragma {
        key: key.to_string(),
        message,
    }
}
