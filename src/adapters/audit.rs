use crate::domain::model::FareCalculationRecord;
use crate::domain::ports::AuditRecorder;
use crate::utils::error::{FareError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct InMemoryAuditRecorder {
    records: Arc<Mutex<Vec<FareCalculationRecord>>>,
}

impl InMemoryAuditRecorder {
    pub async fn records(&self) -> Vec<FareCalculationRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AuditRecorder for InMemoryAuditRecorder {
    async fn record(&self, record: &FareCalculationRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

/// Appends one JSON object per calculation to a log file.
#[derive(Debug, Clone)]
pub struct JsonLinesAuditRecorder {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonLinesAuditRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Past calculations, oldest first, optionally only those made by
    /// `requester`. A log that does not exist yet is an empty history, and
    /// lines that do not parse (a write cut short) are skipped.
    pub async fn history(&self, requester: Option<&str>) -> Result<Vec<FareCalculationRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: FareCalculationRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Skipping unreadable line {} of {}: {}",
                        index + 1,
                        self.path.display(),
                        e
                    );
                    continue;
                }
            };
            if requester.is_none() || record.requester.as_deref() == requester {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditRecorder for JsonLinesAuditRecorder {
    async fn record(&self, record: &FareCalculationRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| FareError::AuditError {
                message: format!("cannot open {}: {}", self.path.display(), e),
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!("Recorded fare calculation to {}", self.path.display());
        Ok(())
    }
}
