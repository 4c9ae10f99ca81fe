use kanban_core::{KanbanError, KanbanResult};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Whole-file writes that never leave a half-written file behind: data goes
/// to a temp file in the target directory, which is then renamed over the
/// target.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> KanbanResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).await?;

        let temp_path = tempfile::Builder::new()
            .prefix(".kanban-")
            .suffix(".tmp")
            .tempfile_in(parent)?
            .into_temp_path();

        fs::write(&temp_path, data).await?;
        temp_path
            .persist(path)
            .map_err(|e| KanbanError::Io(e.error))?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// Read the file, or `None` when it does not exist yet.
    pub async fn read_optional(path: &Path) -> KanbanResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
