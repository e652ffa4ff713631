//! SQLite DSN parsing and cleaning utilities.

use std::collections::HashMap;
use std::path::PathBuf;

const SQLITE_PRAGMA_PARAMS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// Split whitelisted PRAGMA parameters off a DSN.
///
/// Returns the DSN without those parameters and the extracted pairs with
/// lowercase keys. A DSN that does not parse as a URL is returned untouched.
pub fn extract_sqlite_pragmas(dsn: &str) -> (String, HashMap<String, String>) {
    let Ok(mut url) = url::Url::parse(dsn) else {
        return (dsn.to_string(), HashMap::new());
    };

    let mut pragmas = HashMap::new();
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        let key_lower = key.to_lowercase();
        if SQLITE_PRAGMA_PARAMS.contains(&key_lower.as_str()) {
            pragmas.insert(key_lower, value.into_owned());
        } else {
            kept.push(format!("{key}={value}"));
        }
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&kept.join("&")));
    }

    (url.to_string(), pragmas)
}

/// True for `sqlite::memory:`, `sqlite://memory:` and DSNs with `mode=memory`.
pub fn is_memory_dsn(dsn: &str) -> bool {
    if dsn.starts_with("sqlite::memory:") || dsn.starts_with("sqlite://memory:") {
        return true;
    }

    url::Url::parse(dsn)
        .map(|url| {
            url.query_pairs().any(|(k, v)| {
                k.eq_ignore_ascii_case("mode") && v.eq_ignore_ascii_case("memory")
            })
        })
        .unwrap_or(false)
}

/// File path addressed by a SQLite DSN, `None` for in-memory databases.
///
/// Follows the sqlx reading of the DSN: everything after `sqlite://` or
/// `sqlite:` up to the query string is the filename.
pub fn sqlite_file_path(dsn: &str) -> Option<PathBuf> {
    if is_memory_dsn(dsn) {
        return None;
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(p, _)| p);
    if path.is_empty() || path.starts_with("file:") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Create the parent directory of a file-backed SQLite database.
pub fn prepare_sqlite_path(dsn: &str) -> std::io::Result<()> {
    if let Some(parent) = sqlite_file_path(dsn).as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
