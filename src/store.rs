//! Level file persistence: one decimal value per line.

use crate::error::{LevelWatchError, Result};
use crate::monitor::levels::LevelSet;
use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Loads levels from `path`. A missing file is an empty set; lines that do
/// not parse into a new level, including lines that are not UTF-8, are
/// skipped.
pub fn load(path: &Path) -> Result<LevelSet> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No level file at {}, starting empty", path.display());
            return Ok(LevelSet::new());
        }
        Err(e) => return Err(e.into()),
    };

    let content = String::from_utf8_lossy(&bytes);
    let mut levels = LevelSet::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let added = line
            .parse::<f64>()
            .map_err(|e| LevelWatchError::InvalidInput(format!("'{}': {}", line, e)))
            .and_then(|value| levels.add(value));
        if let Err(e) = added {
            warn!("{}:{}: skipping level: {}", path.display(), number + 1, e);
        }
    }
    info!("Loaded {} level(s) from {}", levels.len(), path.display());
    Ok(levels)
}

/// Like [`load`], but an unreadable file is logged and yields an empty set.
pub fn load_or_empty(path: &Path) -> LevelSet {
    load(path).unwrap_or_else(|e| {
        warn!(
            "Could not read levels from {}, starting empty: {}",
            path.display(),
            e
        );
        LevelSet::new()
    })
}

/// Writes the levels to a temporary file next to `path` and renames it over
/// `path`, so a failed write never leaves a partial level file.
pub fn save(path: &Path, levels: &LevelSet) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = io::BufWriter::new(NamedTempFile::new_in(dir)?);
    for level in levels.iter() {
        writeln!(file, "{}", level)?;
    }
    let file = file.into_inner().map_err(|e| e.into_error())?;
    file.persist(path).map_err(io::Error::from)?;
    Ok(())
}
