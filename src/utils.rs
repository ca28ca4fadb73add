use std::path::{Component, Path};

use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("cannot derive a filename from object path '{0}'")]
    InvalidObjectPath(String),
    #[error("object path '{0}' would escape the destination directory")]
    EscapingObjectPath(String),
    #[error("invalid url '{url}'")]
    ParseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot derive a filename from url '{0}'")]
    NoUrlFilename(String),
}

/// Split a "bucket/object" path into its bucket and object key components.
/// The split happens on the first separator, so the key may itself contain
/// further separators; it doubles as the destination filename.
pub fn split_object_path(object_path: &str) -> Result<(String, String), PathError> {
    match object_path.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            if !is_plain_relative(key) {
                return Err(PathError::EscapingObjectPath(object_path.to_string()));
            }
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(PathError::InvalidObjectPath(object_path.to_string())),
    }
}

/// True when every component of a derived filename is a normal path
/// segment, so joining it under a directory cannot land outside that
/// directory. An absolute key would make `Path::join` discard the base
/// entirely.
pub fn is_plain_relative(filename: &str) -> bool {
    !filename.is_empty()
        && Path::new(filename)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Derive a filename from the final path segment of a url.
pub fn url_filename(raw: &str) -> Result<String, PathError> {
    let url = Url::parse(raw).map_err(|source| PathError::ParseUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.path_segments().and_then(|segments| segments.last()) {
        Some(segment) if !segment.is_empty() => Ok(segment.to_string()),
        _ => Err(PathError::NoUrlFilename(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_keeps_nested_key_as_filename() {
        let (bucket, key) = split_object_path("mybucket/path/to/object.bin").unwrap();
        assert_eq!(bucket, "mybucket");
        assert_eq!(key, "path/to/object.bin");
    }

    #[test]
    fn object_path_without_separator_fails() {
        let err = split_object_path("nosep").unwrap_err();
        assert!(matches!(err, PathError::InvalidObjectPath(_)));
    }

    #[test]
    fn object_path_with_empty_component_fails() {
        assert!(split_object_path("mybucket/").is_err());
        assert!(split_object_path("/object.bin").is_err());
    }

    #[test]
    fn absolute_object_key_may_not_escape_the_destination() {
        // the double separator makes the key itself absolute
        let err = split_object_path("mybucket//tmp/owned.txt").unwrap_err();
        assert!(matches!(err, PathError::EscapingObjectPath(_)));
    }

    #[test]
    fn parent_traversal_in_object_key_fails() {
        let err = split_object_path("mybucket/../up.txt").unwrap_err();
        assert!(matches!(err, PathError::EscapingObjectPath(_)));
        assert!(split_object_path("mybucket/folder/../../up.txt").is_err());
    }

    #[test]
    fn plain_relative_accepts_nested_keys_only() {
        assert!(is_plain_relative("folder/item.csv"));
        assert!(!is_plain_relative("/tmp/owned.txt"));
        assert!(!is_plain_relative("../up.txt"));
        assert!(!is_plain_relative("./item.csv"));
        assert!(!is_plain_relative(""));
    }

    #[test]
    fn url_filename_is_last_segment() {
        let filename = url_filename("https://host/dir/file.tar.gz").unwrap();
        assert_eq!(filename, "file.tar.gz");
    }

    #[test]
    fn url_without_filename_fails() {
        let err = url_filename("https://host/").unwrap_err();
        assert!(matches!(err, PathError::NoUrlFilename(_)));
    }

    #[test]
    fn unparsable_url_fails() {
        let err = url_filename("not a url").unwrap_err();
        assert!(matches!(err, PathError::ParseUrl { .. }));
    }
}
