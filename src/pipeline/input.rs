//! Input resolution: turn a user-supplied path, `-` or URL into a payload.
//!
//! The renderer itself only ever sees an [`OrderPayload`]; this module is
//! what the CLI (and any other front end) uses to get one. A body only has
//! to be JSON. Its shape is not checked here, so `[]` or `"hello"` are
//! accepted and simply render as an order with no details.

use crate::error::OrderPdfError;
use crate::payload::OrderPayload;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Input string that means "read the payload from stdin".
pub const STDIN: &str = "-";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a parsed payload.
///
/// URLs are downloaded with a `timeout_secs` limit, `-` reads stdin to the
/// end, anything else is read as a local file.
pub async fn resolve_payload(input: &str, timeout_secs: u64) -> Result<OrderPayload, OrderPdfError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OrderPdfError::InvalidInput {
            input: input.to_string(),
        });
    }

    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else if input == STDIN {
        read_stdin().await?
    } else {
        read_local(input).await?
    };

    parse_payload(&bytes, input)
}

/// Parse a JSON body into a payload. `origin` only appears in the error.
pub fn parse_payload(bytes: &[u8], origin: &str) -> Result<OrderPayload, OrderPdfError> {
    let payload: OrderPayload =
        serde_json::from_slice(bytes).map_err(|source| OrderPdfError::InvalidPayload {
            origin: origin.to_string(),
            source,
        })?;
    debug!("Parsed {} byte payload from {}", bytes.len(), origin);
    Ok(payload)
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, OrderPdfError> {
    let path = PathBuf::from(path_str);

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!("Read local payload: {}", path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(OrderPdfError::PermissionDenied { path })
        }
        Err(_) => Err(OrderPdfError::PayloadNotFound { path }),
    }
}

async fn read_stdin() -> Result<Vec<u8>, OrderPdfError> {
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| OrderPdfError::Internal(format!("Failed to read stdin: {}", e)))?;
    debug!("Read {} bytes from stdin", bytes.len());
    Ok(bytes)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, OrderPdfError> {
    info!("Downloading payload from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| OrderPdfError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            OrderPdfError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            OrderPdfError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(OrderPdfError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| OrderPdfError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/order.json"));
        assert!(is_url("http://example.com/order.json"));
        assert!(!is_url("/tmp/order.json"));
        assert!(!is_url("order.json"));
        assert!(!is_url("-"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn reads_local_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"buildName":"Cabin","buildConfig":{{"floors":2}}}}"#).unwrap();

        let payload = resolve_payload(file.path().to_str().unwrap(), 5).await.unwrap();
        assert_eq!(payload.get("buildName").and_then(|v| v.as_str()), Some("Cabin"));
        assert!(payload.build_config().is_some());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_payload("/definitely/not/here.json", 5).await.unwrap_err();
        assert!(matches!(err, OrderPdfError::PayloadNotFound { .. }));
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_payload("   ", 5).await.unwrap_err();
        assert!(matches!(err, OrderPdfError::InvalidInput { .. }));
    }

    #[test]
    fn non_json_body_is_rejected() {
        let err = parse_payload(b"floors: 3", "inline").unwrap_err();
        assert!(matches!(err, OrderPdfError::InvalidPayload { .. }));
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn non_object_json_is_accepted() {
        let payload = parse_payload(b"[1, 2, 3]", "inline").unwrap();
        assert!(payload.build_config().is_none());
        assert!(payload.as_value().is_array());
    }
}
