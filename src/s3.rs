use object_store::aws::{AmazonS3, AmazonS3Builder};

// S3-compatible stores accept the default region when the endpoint itself
// identifies the deployment.
const DEFAULT_REGION: &str = "us-east-1";

/// Build a client for an S3-compatible endpoint. The configured endpoint
/// carries no scheme (e.g. s3.example.com); https is assumed unless one is
/// given explicitly. Absent credentials mean an anonymous client, never an
/// error at this stage.
pub fn build_client(
    endpoint: &str,
    bucket: &str,
    access_key_id: &str,
    secret_key: &str,
) -> Result<AmazonS3, object_store::Error> {
    let endpoint_url = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    let mut builder = AmazonS3Builder::new()
        .with_region(DEFAULT_REGION)
        .with_bucket_name(bucket)
        .with_endpoint(endpoint_url)
        .with_allow_http(true);

    if !access_key_id.is_empty() && !secret_key.is_empty() {
        builder = builder
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_key);
    } else {
        builder = builder.with_skip_signature(true);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_credentials() {
        assert!(build_client("s3.example.com", "bucket1", "key", "secret").is_ok());
    }

    #[test]
    fn builds_anonymously_without_credentials() {
        assert!(build_client("s3.example.com", "bucket1", "", "").is_ok());
    }

    #[test]
    fn keeps_an_explicit_scheme() {
        assert!(build_client("http://localhost:9000", "bucket1", "", "").is_ok());
    }
}
