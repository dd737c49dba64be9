use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::message::ResultFile;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create result directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write result file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize result file {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write `result` to `<runtime_path>/responses/<uuid>/<uuid>.json` and return the file path.
pub fn persist_result(
    runtime_path: &Path,
    result: &ResultFile<'_>,
) -> Result<PathBuf, PersistenceError> {
    let id = Uuid::new_v4();
    let dir = runtime_path.join("responses").join(id.to_string());
    fs::create_dir_all(&dir).map_err(|source| PersistenceError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let path = dir.join(format!("{id}.json"));
    let file = File::create(&path).map_err(|source| PersistenceError::Write {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, result).map_err(|source| PersistenceError::Serialize {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(|source| PersistenceError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), points = result.points.len(), "persisted result");

    Ok(path)
}
