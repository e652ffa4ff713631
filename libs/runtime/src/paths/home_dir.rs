use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory")]
    NoHome,
    #[error("failed to create home directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the service home directory to an absolute path.
///
/// - `None` => `<user home>/<default_subdir>`
/// - `~` and `~/...` are expanded against the user home
/// - other relative paths are joined onto the current working directory
///
/// With `create = true` the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let user_home = || dirs::home_dir().ok_or(HomeDirError::NoHome);

    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => user_home()?.join(default_subdir),
        Some("~") => user_home()?,
        Some(p) if p.starts_with("~/") || p.starts_with("~\\") => user_home()?.join(&p[2..]),
        Some(p) if Path::new(p).is_absolute() => PathBuf::from(p),
        Some(p) => std::env::current_dir()
            .map_err(|source| HomeDirError::Create {
                path: PathBuf::from(p),
                source,
            })?
            .join(p),
    };

    if create {
        std::fs::create_dir_all(&resolved).map_err(|source| HomeDirError::Create {
            path: resolved.clone(),
            source,
        })?;
    }

    Ok(resolved)
}
