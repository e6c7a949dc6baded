use async_trait::async_trait;
use tracing::{debug, error};
use crate::domain::{error::ImportError, ports::FileFetcher};

pub struct LocalFileFetcher;

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileFetcher for LocalFileFetcher {
    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, ImportError> {
        debug!("Reading file from disk: {}", path);
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!("Failed to read {}: {}", path, e);
            ImportError::Io(e)
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sku,name\nS1,Ring\n").unwrap();

        let bytes = LocalFileFetcher::new()
            .fetch_file(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"sku,name\nS1,Ring\n");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = LocalFileFetcher::new()
            .fetch_file("/definitely/not/here.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
