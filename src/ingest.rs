use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Published CSV export of the analytics sheet
pub const DEFAULT_SOURCE_URL: &str =
    "https://docs.google.com/spreadsheets/d/1vwc803C8MwWBMc7ntCre3zJ5xZtG881HKkxlIrwwxNs/gviz/tq?tqx=out:csv";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("fetch error for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("read error for {}: {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Somewhere the dashboard's CSV text comes from
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch(&self) -> Result<String, IngestError>;

    /// Human readable location, used in log lines
    fn describe(&self) -> String;
}

/// CSV served over HTTP(S)
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(IngestError::Client)?;

        Ok(HttpSource {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CsvSource for HttpSource {
    async fn fetch(&self) -> Result<String, IngestError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| IngestError::Fetch {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(IngestError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        response.text().await.map_err(|source| IngestError::Fetch {
            url: self.url.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// CSV read from the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

#[async_trait]
impl CsvSource for FileSource {
    async fn fetch(&self) -> Result<String, IngestError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| IngestError::Read {
                path: self.path.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use std::io::Write;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn file_source_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"h\nrow\n").unwrap();

        let source = FileSource::new(file.path());
        let text = source.fetch().await.unwrap();
        assert_eq!(text, "h\nrow\n");
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let source = FileSource::new("/definitely/not/here.csv");
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, IngestError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        // Port 9 on localhost is reserved for discard and normally closed
        let source = HttpSource::new("http://127.0.0.1:9/export.csv", Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, IngestError::Fetch { .. }));
    }

    #[tokio::test]
    async fn non_success_status_is_a_status_error() {
        let app = Router::new().route(
            "/export.csv",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("http://{}/export.csv", addr);
        let source = HttpSource::new(url.clone(), Duration::from_secs(5)).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, IngestError::Status { status: 503, .. }));
        assert_eq!(err.to_string(), format!("HTTP 503 for {}", url));
    }
}
