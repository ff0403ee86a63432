//! Reply delivery boundary.
//!
//! What happens to a fetched reply is not the pipeline's business —
//! playback lives outside this crate.  [`ReplySink`] is the seam: the
//! pipeline hands over the resource name and raw bytes, and capture stays
//! suspended until the sink returns.  The bundled [`FileReplySink`] writes
//! replies to disk, where a player or another process can pick them up.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ReplyError
// ---------------------------------------------------------------------------

/// Errors that can occur while delivering a reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("failed to write reply to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// ReplySink trait
// ---------------------------------------------------------------------------

/// Consumer of fetched reply payloads.
///
/// Implementors must be `Send + Sync` so the pipeline can hold them as
/// `Arc<dyn ReplySink>`.  `deliver` should return once the reply has been
/// handed off (or played); the pipeline resumes capture afterwards.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, resource: &str, payload: &[u8]) -> Result<(), ReplyError>;
}

// ---------------------------------------------------------------------------
// FileReplySink
// ---------------------------------------------------------------------------

/// Writes each reply to `<dir>/<resource>`, creating the directory on
/// first use.
///
/// Resource names are derived locally from the utterance timestamp (see
/// [`crate::submit::truncated_label`]), so they are plain filenames.
pub struct FileReplySink {
    dir: PathBuf,
}

impl FileReplySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReplySink for FileReplySink {
    async fn deliver(&self, resource: &str, payload: &[u8]) -> Result<(), ReplyError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ReplyError::Write {
                path: self.dir.display().to_string(),
                source: e,
            })?;

        let path = self.dir.join(resource);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| ReplyError::Write {
                path: path.display().to_string(),
                source: e,
            })?;

        log::info!("reply written to {} ({} bytes)", path.display(), payload.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_payload_under_resource_name() {
        let dir = tempdir().expect("temp dir");
        let sink = FileReplySink::new(dir.path());

        sink.deliver("1700000000.mp3", b"reply-bytes")
            .await
            .expect("deliver");

        let written = std::fs::read(dir.path().join("1700000000.mp3")).expect("read back");
        assert_eq!(written, b"reply-bytes");
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempdir().expect("temp dir");
        let nested = dir.path().join("replies").join("today");
        let sink = FileReplySink::new(&nested);

        sink.deliver("a.mp3", b"x").await.expect("deliver");

        assert!(nested.join("a.mp3").exists());
    }

    /// Verify object-safety (usable as `dyn ReplySink`).
    #[test]
    fn sink_is_object_safe() {
        let sink: Box<dyn ReplySink> = Box::new(FileReplySink::new("/tmp"));
        drop(sink);
    }
}
