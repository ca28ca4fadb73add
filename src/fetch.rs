use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};

use crate::config::ImportConfig;
use crate::source::{DataSource, DataStream};
use crate::utils;

/// Fixed destination directory for imported objects.
pub const WRITE_PATH: &str = "/data";

#[derive(Error, Debug)]
pub enum IoError {
    #[error("refusing to write '{}' outside '{}'", filename, out_dir.display())]
    OutsideRoot { filename: String, out_dir: PathBuf },
    #[error("unable to create '{}'", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write to '{}' failed", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run a whole import: select the transport, open the stream and copy it
/// under [WRITE_PATH]. Every error is fatal to the caller.
pub async fn import(config: &ImportConfig) -> anyhow::Result<PathBuf> {
    import_to(config, Path::new(WRITE_PATH)).await
}

/// As [import], with an explicit destination directory.
pub async fn import_to(config: &ImportConfig, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let source = DataSource::from_config(config).context("unable to create data reader")?;
    let filename = source.filename().context("unable to derive filename")?;
    let reader = source.open().await.context("unable to open data stream")?;

    log::info!("Beginning import of {}", filename);
    let dest = stream_to_file(reader, &filename, out_dir)
        .await
        .context("unable to stream data to file")?;
    Ok(dest)
}

/// Copy every byte from the source stream to `out_dir/filename`. Nested
/// object keys get their intermediate directories created on demand; a
/// previous import of the same object is truncated. The stream and the file
/// handle are both released when this returns, on success or failure.
pub async fn stream_to_file(
    mut reader: DataStream,
    filename: &str,
    out_dir: &Path,
) -> Result<PathBuf, IoError> {
    // an absolute or parent-traversing filename would join outside out_dir
    if !utils::is_plain_relative(filename) {
        return Err(IoError::OutsideRoot {
            filename: filename.to_string(),
            out_dir: out_dir.to_path_buf(),
        });
    }

    let dest = out_dir.join(filename);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await.map_err(|source| IoError::Create {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&dest)
        .await
        .map_err(|source| IoError::Create {
            path: dest.clone(),
            source,
        })?;

    tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(|source| IoError::Copy {
            path: dest.clone(),
            source,
        })?;
    file.sync_all().await.map_err(|source| IoError::Copy {
        path: dest.clone(),
        source,
    })?;

    Ok(dest)
}
