//! Line-delimited JSON bundle files.
//!
//! One bundle per line, no trailing commas, UTF-8. The format is what
//! downstream graph loaders read, and [`read_bundles_jsonl`] reads it back
//! for audits and round-trip checks.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::debug;
use transition_domain::EvidenceBundle;

use crate::error::{SinkError, SinkResult};
use crate::sink::BundleSink;

struct WriterState {
    writer: BufWriter<File>,
    seen: HashSet<String>,
    written: u64,
}

/// Sink that appends each bundle as one JSON line to a file.
pub struct JsonlBundleSink {
    path: PathBuf,
    state: Mutex<WriterState>,
}

impl JsonlBundleSink {
    /// Create (or truncate) the file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        debug!(path = %path.display(), "opened bundle sink");
        Ok(Self {
            path,
            state: Mutex::new(WriterState {
                writer: BufWriter::new(file),
                seen: HashSet::new(),
                written: 0,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bundles written so far.
    pub async fn written(&self) -> u64 {
        self.state.lock().await.written
    }
}

#[async_trait]
impl BundleSink for JsonlBundleSink {
    async fn accept(&self, bundle: &EvidenceBundle) -> SinkResult<()> {
        let mut line = serde_json::to_string(bundle)?;
        line.push('\n');

        let mut state = self.state.lock().await;
        if state.seen.contains(&bundle.detection_id) {
            return Err(SinkError::AlreadyWritten {
                detection_id: bundle.detection_id.clone(),
            });
        }
        state.writer.write_all(line.as_bytes()).await?;
        state.seen.insert(bundle.detection_id.clone());
        state.written += 1;
        Ok(())
    }

    async fn flush(&self) -> SinkResult<()> {
        let mut state = self.state.lock().await;
        state.writer.flush().await?;
        debug!(path = %self.path.display(), written = state.written, "flushed bundle sink");
        Ok(())
    }
}

/// Read every bundle from a JSONL file. Blank lines are skipped.
pub async fn read_bundles_jsonl(path: impl AsRef<Path>) -> SinkResult<Vec<EvidenceBundle>> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut bundles = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let bundle: EvidenceBundle =
            serde_json::from_str(line).map_err(|e| SinkError::MalformedLine {
                line: idx + 1,
                message: e.to_string(),
            })?;
        bundles.push(bundle);
    }
    Ok(bundles)
}
