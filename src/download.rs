use std::path::Path;

use futures::StreamExt;
use tokio::fs::{create_dir_all, remove_file, File};
use tokio::io::AsyncWriteExt;
use tracing::{error, trace};

use crate::error::QueryError;
use crate::util::blob::Blob;

/// Writes a blob's data to `destination`, creating parent directories as needed. If the data
///  stream fails (e.g. checksum mismatch), the partially written file is removed again.
pub async fn write_blob(blob: Blob, destination: &Path) -> Result<u64, QueryError> {
    trace!("writing {} to {}", blob.location, destination.display());

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).await
                .map_err(|source| QueryError::Write { path: parent.to_path_buf(), source })?;
        }
    }

    let file = File::create(destination).await
        .map_err(|source| QueryError::Write { path: destination.to_path_buf(), source })?;

    match do_write(blob, file, destination).await {
        Ok(len) => Ok(len),
        Err(e) => {
            if let Err(cleanup) = remove_file(destination).await {
                error!("error cleaning up {} after failed download: {}", destination.display(), cleanup);
            }
            Err(e)
        }
    }
}

async fn do_write(blob: Blob, mut file: File, destination: &Path) -> Result<u64, QueryError> {
    let location = blob.location;
    let mut data = blob.data;
    let mut len = 0u64;

    while let Some(chunk) = data.next().await {
        let bytes = chunk.map_err(|source| QueryError::Backend {
            operation: format!("download from {}", location),
            source,
        })?;
        file.write_all(&bytes).await
            .map_err(|source| QueryError::Write { path: destination.to_path_buf(), source })?;
        len += bytes.len() as u64;
    }

    file.flush().await
        .map_err(|source| QueryError::Write { path: destination.to_path_buf(), source })?;
    Ok(len)
}
