use std::fmt;
use std::io;

use futures::stream::TryStreamExt;
use object_store::{path::Path, ObjectStore};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::config::ImportConfig;
use crate::s3;
use crate::utils::{self, PathError};

/// A readable byte stream from the selected transport. Dropping it releases
/// the underlying connection.
pub type DataStream = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Error, Debug)]
pub enum TransportError {
    // unreachable for a validated config, kept as a guard
    #[error("missing endpoint and url")]
    MissingSource,
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("object store request failed: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The single data source an import reads from, chosen once from the
/// validated config.
pub enum DataSource {
    ObjectStore {
        endpoint: String,
        bucket: String,
        key: String,
        access_key_id: String,
        secret_key: String,
    },
    Url {
        url: String,
    },
}

// manual impl: the secret must never reach the log output
impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::ObjectStore {
                endpoint,
                bucket,
                key,
                access_key_id,
                secret_key,
            } => f
                .debug_struct("ObjectStore")
                .field("endpoint", endpoint)
                .field("bucket", bucket)
                .field("key", key)
                .field("access_key_id", access_key_id)
                .field("secret_key", &crate::config::redact(secret_key))
                .finish(),
            DataSource::Url { url } => f.debug_struct("Url").field("url", url).finish(),
        }
    }
}

impl DataSource {
    /// Select the transport: an endpoint takes priority, otherwise the url.
    /// The resolver guarantees exactly one is set.
    pub fn from_config(config: &ImportConfig) -> Result<Self, TransportError> {
        if !config.endpoint.is_empty() {
            let (bucket, key) = utils::split_object_path(&config.object_path)?;
            Ok(DataSource::ObjectStore {
                endpoint: config.endpoint.clone(),
                bucket,
                key,
                access_key_id: config.access_key_id.clone(),
                secret_key: config.secret_key.clone(),
            })
        } else if !config.url.is_empty() {
            Ok(DataSource::Url {
                url: config.url.clone(),
            })
        } else {
            Err(TransportError::MissingSource)
        }
    }

    /// Destination filename: the object key past the bucket, or the final
    /// url path segment.
    pub fn filename(&self) -> Result<String, PathError> {
        match self {
            DataSource::ObjectStore { key, .. } => Ok(key.clone()),
            DataSource::Url { url } => utils::url_filename(url),
        }
    }

    /// Open a readable byte stream from the source.
    pub async fn open(&self) -> Result<DataStream, TransportError> {
        match self {
            DataSource::ObjectStore {
                endpoint,
                bucket,
                key,
                access_key_id,
                secret_key,
            } => {
                log::info!("Importing data from S3 endpoint: {}", endpoint);
                let store = s3::build_client(endpoint, bucket, access_key_id, secret_key)?;
                let result = store.get(&Path::from(key.as_str())).await?;
                let stream = result
                    .into_stream()
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
                Ok(Box::new(StreamReader::new(stream)))
            }
            DataSource::Url { url } => {
                log::info!("Importing data from URL: {}", url);
                let res = reqwest::get(url)
                    .await
                    .and_then(|res| res.error_for_status())?;
                let stream = res
                    .bytes_stream()
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
                Ok(Box::new(StreamReader::new(stream)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, endpoint: &str, object_path: &str) -> ImportConfig {
        ImportConfig {
            url: url.to_string(),
            endpoint: endpoint.to_string(),
            object_path: object_path.to_string(),
            access_key_id: String::new(),
            secret_key: String::new(),
        }
    }

    #[test]
    fn endpoint_selects_object_store() {
        let source =
            DataSource::from_config(&config("", "s3.example.com", "bucket1/folder/item.csv"))
                .unwrap();
        match &source {
            DataSource::ObjectStore { bucket, key, .. } => {
                assert_eq!(bucket, "bucket1");
                assert_eq!(key, "folder/item.csv");
            }
            other => panic!("expected object store source, got {:?}", other),
        }
        assert_eq!(source.filename().unwrap(), "folder/item.csv");
    }

    #[test]
    fn url_selects_http() {
        let source =
            DataSource::from_config(&config("https://example.com/data/archive.zip", "", ""))
                .unwrap();
        assert!(matches!(source, DataSource::Url { .. }));
        assert_eq!(source.filename().unwrap(), "archive.zip");
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = DataSource::from_config(&config("", "", "")).unwrap_err();
        assert!(matches!(err, TransportError::MissingSource));
    }

    #[test]
    fn bad_object_path_is_a_transport_error() {
        let err = DataSource::from_config(&config("", "s3.example.com", "nosep")).unwrap_err();
        assert!(matches!(err, TransportError::Path(_)));
    }

    #[test]
    fn escaping_object_path_is_rejected_at_selection() {
        let err = DataSource::from_config(&config("", "s3.example.com", "bucket1//tmp/owned.txt"))
            .unwrap_err();
        assert!(matches!(err, TransportError::Path(_)));
    }

    #[test]
    fn debug_output_redacts_the_secret_key() {
        let source = DataSource::ObjectStore {
            endpoint: "s3.example.com".to_string(),
            bucket: "bucket1".to_string(),
            key: "folder/item.csv".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_key: "hunter2".to_string(),
        };
        let output = format!("{:?}", source);
        assert!(!output.contains("hunter2"));
        assert!(output.contains("<redacted>"));
    }
}
