//! Job layer: render an order on behalf of a job and record the outcome.
//!
//! A job is a job id plus a payload. [`run_job`] marks the job as
//! processing, renders the document, stores it at `pdfs/<job_id>.pdf` and
//! marks the job complete with that path. Any failure after the id has been
//! validated marks the job failed with the error message before the error
//! is returned to the caller.
//!
//! Persistence is behind the [`JobStore`] trait. [`FsJobStore`] keeps
//! status records and documents under one directory:
//!
//! ```text
//! <root>/jobs/<job_id>.json   {"id":…,"status":"complete","result_path":…,"updated_at":…}
//! <root>/pdfs/<job_id>.pdf
//! ```

use crate::assemble::{render_order_detailed, write_atomic};
use crate::config::RenderConfig;
use crate::error::OrderPdfError;
use crate::output::RenderStats;
use crate::payload::OrderPayload;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

static RE_JOB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap());

/// Lifecycle of a render job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Complete { result_path: String },
    Failed { error: String },
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Complete { .. } => "complete",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// Where job status and finished documents go.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Record the current status of `job_id`, replacing any previous one.
    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<(), OrderPdfError>;

    /// Store a finished document at `path`, overwriting an existing one.
    async fn put_document(&self, path: &str, bytes: Vec<u8>) -> Result<(), OrderPdfError>;
}

/// Result of a successful job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: String,
    pub result_path: String,
    pub stats: RenderStats,
}

/// Reject ids that are empty, too long or not `[A-Za-z0-9_-]`.
pub fn validate_job_id(job_id: &str) -> Result<(), OrderPdfError> {
    if RE_JOB_ID.is_match(job_id) {
        Ok(())
    } else {
        Err(OrderPdfError::InvalidJobId {
            id: job_id.to_string(),
        })
    }
}

/// Storage path of a job's document.
pub fn document_path(job_id: &str) -> String {
    format!("pdfs/{job_id}.pdf")
}

/// Run one job through the renderer and record the outcome in `store`.
///
/// # Errors
/// [`OrderPdfError::InvalidJobId`] without touching the store, or whatever
/// render or store error marked the job failed.
pub async fn run_job(
    store: &dyn JobStore,
    job_id: &str,
    payload: &OrderPayload,
    config: &RenderConfig,
) -> Result<JobOutcome, OrderPdfError> {
    validate_job_id(job_id)?;

    let span = info_span!("job", job_id = %job_id, request_id = %Uuid::new_v4());
    async move {
        match process(store, job_id, payload, config).await {
            Ok(outcome) => {
                info!("Job complete: {}", outcome.result_path);
                Ok(outcome)
            }
            Err(e) => {
                error!("Job failed: {}", e);
                let failed = JobStatus::Failed { error: e.to_string() };
                if let Err(store_err) = store.set_status(job_id, failed).await {
                    error!("Could not record job failure: {}", store_err);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn process(
    store: &dyn JobStore,
    job_id: &str,
    payload: &OrderPayload,
    config: &RenderConfig,
) -> Result<JobOutcome, OrderPdfError> {
    store.set_status(job_id, JobStatus::Processing).await?;

    let output = render_order_detailed(payload, config).await?;
    let result_path = document_path(job_id);
    store.put_document(&result_path, output.pdf).await?;

    store
        .set_status(
            job_id,
            JobStatus::Complete {
                result_path: result_path.clone(),
            },
        )
        .await?;

    Ok(JobOutcome {
        job_id: job_id.to_string(),
        result_path,
        stats: output.stats,
    })
}

// ── Filesystem store ─────────────────────────────────────────────────────

/// A status record as [`FsJobStore`] writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(flatten)]
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

/// [`JobStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsJobStore {
    root: PathBuf,
}

impl FsJobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read back the last status recorded for `job_id`.
    pub async fn status(&self, job_id: &str) -> Result<Option<JobRecord>, OrderPdfError> {
        validate_job_id(job_id)?;
        let bytes = match tokio::fs::read(self.record_path(job_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error(e)),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(store_error)
    }

    fn record_path(&self, job_id: &str) -> PathBuf {
        self.root.join("jobs").join(format!("{job_id}.json"))
    }

    /// Resolve a store-relative path, refusing anything that escapes the root.
    fn resolve(&self, relative: &str) -> Result<PathBuf, OrderPdfError> {
        let rel = Path::new(relative);
        let contained = !relative.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(OrderPdfError::Store {
                detail: format!("document path '{relative}' is outside the store"),
            });
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<(), OrderPdfError> {
        validate_job_id(job_id)?;
        let record = JobRecord {
            id: job_id.to_string(),
            status,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(store_error)?;
        write_atomic(&self.record_path(job_id), &json)
            .await
            .map_err(store_error)?;
        info!("Job status: {}", record.status.as_str());
        Ok(())
    }

    async fn put_document(&self, path: &str, bytes: Vec<u8>) -> Result<(), OrderPdfError> {
        let target = self.resolve(path)?;
        write_atomic(&target, &bytes).await.map_err(store_error)?;
        info!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }
}

fn store_error(e: impl std::fmt::Display) -> OrderPdfError {
    OrderPdfError::Store {
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn job_ids_are_restricted() {
        assert!(validate_job_id("job_42-a").is_ok());
        assert!(validate_job_id(&"a".repeat(128)).is_ok());
        let too_long = "a".repeat(129);
        for bad in ["", "../etc/passwd", "a/b", "with space", "é", too_long.as_str()] {
            assert!(
                matches!(validate_job_id(bad), Err(OrderPdfError::InvalidJobId { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn status_serialises_with_tag() {
        let v = serde_json::to_value(JobStatus::Complete {
            result_path: "pdfs/a.pdf".into(),
        })
        .unwrap();
        assert_eq!(v, json!({ "status": "complete", "result_path": "pdfs/a.pdf" }));
        assert_eq!(
            serde_json::to_value(JobStatus::Processing).unwrap(),
            json!({ "status": "processing" })
        );
    }

    /// Store that records every call and can be told to refuse documents.
    #[derive(Default)]
    struct MemoryStore {
        statuses: Mutex<Vec<JobStatus>>,
        documents: Mutex<Vec<(String, usize)>>,
        reject_documents: bool,
    }

    #[async_trait]
    impl JobStore for MemoryStore {
        async fn set_status(&self, _job_id: &str, status: JobStatus) -> Result<(), OrderPdfError> {
            self.statuses.lock().unwrap().push(status);
            Ok(())
        }

        async fn put_document(&self, path: &str, bytes: Vec<u8>) -> Result<(), OrderPdfError> {
            if self.reject_documents {
                return Err(OrderPdfError::Store {
                    detail: "bucket unavailable".into(),
                });
            }
            self.documents.lock().unwrap().push((path.to_string(), bytes.len()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_job_ends_complete() {
        let store = MemoryStore::default();
        let payload = OrderPayload::new(json!({ "buildConfig": { "floors": 2 } }));
        let outcome = run_job(&store, "job-1", &payload, &RenderConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.result_path, "pdfs/job-1.pdf");
        assert_eq!(outcome.stats.planned_pages, 3);
        assert_eq!(
            *store.statuses.lock().unwrap(),
            vec![
                JobStatus::Processing,
                JobStatus::Complete {
                    result_path: "pdfs/job-1.pdf".into()
                }
            ]
        );
        let documents = store.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].1, outcome.stats.bytes);
    }

    #[tokio::test]
    async fn store_failure_marks_job_failed() {
        let store = MemoryStore {
            reject_documents: true,
            ..MemoryStore::default()
        };
        let err = run_job(&store, "job-2", &OrderPayload::empty(), &RenderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderPdfError::Store { .. }));

        let statuses = store.statuses.lock().unwrap();
        match statuses.last() {
            Some(JobStatus::Failed { error }) => assert!(error.contains("bucket unavailable")),
            other => panic!("expected failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_id_never_reaches_the_store() {
        let store = MemoryStore::default();
        let err = run_job(&store, "../x", &OrderPayload::empty(), &RenderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderPdfError::InvalidJobId { .. }));
        assert!(store.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fs_store_persists_record_and_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(dir.path());
        let payload = OrderPayload::new(json!({ "buildName": "Cabin" }));

        run_job(&store, "abc", &payload, &RenderConfig::default())
            .await
            .unwrap();

        let pdf = std::fs::read(dir.path().join("pdfs/abc.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let record = store.status("abc").await.unwrap().expect("record");
        assert_eq!(record.id, "abc");
        assert_eq!(
            record.status,
            JobStatus::Complete {
                result_path: "pdfs/abc.pdf".into()
            }
        );
    }

    #[tokio::test]
    async fn fs_store_unknown_job_has_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(dir.path());
        assert!(store.status("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fs_store_refuses_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsJobStore::new(dir.path());
        for path in ["../outside.pdf", "/etc/passwd", ""] {
            let err = store.put_document(path, b"x".to_vec()).await.unwrap_err();
            assert!(matches!(err, OrderPdfError::Store { .. }), "accepted {path:?}");
        }
    }
}
