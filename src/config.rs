use std::env;
use std::fmt;

use dotenv::dotenv;
use thiserror::Error;

// The importer expects its configuration through these environment variables:
//   IMPORTER_URL            Full url + path to object. Mutually exclusive with IMPORTER_ENDPOINT
//   IMPORTER_ENDPOINT       Object store endpoint minus scheme, bucket and object,
//                           e.g. s3.amazon.com. Mutually exclusive with IMPORTER_URL
//   IMPORTER_OBJECT_PATH    Full path of object (e.g. bucket/object)
//   IMPORTER_ACCESS_KEY_ID  Optional. If omitted no creds are passed to the object store client
//   IMPORTER_SECRET_KEY     Optional. If omitted no creds are passed to the object store client
pub const IMPORTER_URL: &str = "IMPORTER_URL";
pub const IMPORTER_ENDPOINT: &str = "IMPORTER_ENDPOINT";
pub const IMPORTER_OBJECT_PATH: &str = "IMPORTER_OBJECT_PATH";
pub const IMPORTER_ACCESS_KEY_ID: &str = "IMPORTER_ACCESS_KEY_ID";
pub const IMPORTER_SECRET_KEY: &str = "IMPORTER_SECRET_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IMPORTER_ENDPOINT and IMPORTER_URL cannot both be defined")]
    MutuallyExclusive,
    #[error("IMPORTER_ENDPOINT or IMPORTER_URL must be defined")]
    MissingSource,
    #[error("IMPORTER_OBJECT_PATH is empty")]
    MissingObjectPath,
}

/// Validated import configuration, built once at startup. An empty string
/// means the variable was not set.
#[derive(Clone)]
pub struct ImportConfig {
    pub url: String,
    pub endpoint: String,
    pub object_path: String,
    pub access_key_id: String,
    pub secret_key: String,
}

// manual impl: the secret must never reach the log output
impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("url", &self.url)
            .field("endpoint", &self.endpoint)
            .field("object_path", &self.object_path)
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &redact(&self.secret_key))
            .finish()
    }
}

pub(crate) fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl ImportConfig {
    /// Perform syntax and semantic checking on the raw values and return the
    /// validated config. Missing credentials on the endpoint path are only
    /// warned about; the object store client is then built anonymously.
    pub fn new(
        url: String,
        endpoint: String,
        object_path: String,
        access_key_id: String,
        secret_key: String,
    ) -> Result<Self, ConfigError> {
        if !endpoint.is_empty() && !url.is_empty() {
            return Err(ConfigError::MutuallyExclusive);
        }
        if endpoint.is_empty() && url.is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if !endpoint.is_empty() {
            if object_path.is_empty() {
                return Err(ConfigError::MissingObjectPath);
            }
            if access_key_id.is_empty() || secret_key.is_empty() {
                log::warn!(
                    "{} and/or {} env variables are empty",
                    IMPORTER_ACCESS_KEY_ID,
                    IMPORTER_SECRET_KEY
                );
            }
        }
        Ok(ImportConfig {
            url,
            endpoint,
            object_path,
            access_key_id,
            secret_key,
        })
    }

    /// Read the predefined env variables and validate them.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        ImportConfig::new(
            env_var(IMPORTER_URL),
            env_var(IMPORTER_ENDPOINT),
            env_var(IMPORTER_OBJECT_PATH),
            env_var(IMPORTER_ACCESS_KEY_ID),
            env_var(IMPORTER_SECRET_KEY),
        )
    }
}

fn env_var(name: &str) -> String {
    env::var(name).unwrap_or_default()
}
