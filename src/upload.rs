//! Handing a finished artifact to storage. Only the boundary lives here:
//! object key and locator derivation, a plain directory uploader, and an
//! object-store uploader that stages files under their object keys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::error::{Error, Result};

/// Accepts a finished local file and returns a locator it can be fetched from.
pub trait ArtifactUploader {
    fn upload(&self, artifact: &Path) -> Result<String>;
}

/// Bucket coordinates for an S3-style object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreTarget {
    pub bucket: String,
    pub region: String,
    #[serde(default)]
    pub key_prefix: String,
}

impl ObjectStoreTarget {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            key_prefix: key_prefix.into().trim().to_string(),
        }
    }

    /// Object key for a file: the prefix joined with `/`, or the bare name.
    pub fn key_for(&self, file_name: &str) -> String {
        let prefix = self.key_prefix.trim();
        if prefix.is_empty() {
            file_name.to_string()
        } else if prefix.ends_with('/') {
            format!("{prefix}{file_name}")
        } else {
            format!("{prefix}/{file_name}")
        }
    }

    /// Virtual-hosted HTTPS locator for a key. The key is form-encoded as a
    /// whole (so `/` becomes `%2F`) with spaces written as `%20`.
    pub fn url_for(&self, key: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(key.as_bytes()).collect();
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket,
            self.region,
            encoded.replace('+', "%20")
        )
    }
}

fn artifact_name(artifact: &Path) -> Result<String> {
    if !artifact.is_file() {
        return Err(Error::Upload(format!("file does not exist: {}", artifact.display())));
    }
    artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Upload(format!("no file name in {}", artifact.display())))
}

fn copy_into(artifact: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::copy(artifact, dest).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

/// Copies artifacts into a local directory and returns `file://` locators.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
}

impl DirectoryUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactUploader for DirectoryUploader {
    fn upload(&self, artifact: &Path) -> Result<String> {
        let dest = self.dir.join(artifact_name(artifact)?);
        copy_into(artifact, &dest)?;

        let absolute = dest.canonicalize().map_err(|e| Error::io(&dest, e))?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|_| Error::Upload(format!("cannot build a locator for {}", absolute.display())))
    }
}

/// Stages artifacts under `staging/<object key>` for a bucket sync and
/// returns the HTTPS locator the object will have once synced.
#[derive(Debug, Clone)]
pub struct ObjectStoreUploader {
    target: ObjectStoreTarget,
    staging: PathBuf,
}

impl ObjectStoreUploader {
    pub fn new(target: ObjectStoreTarget, staging: impl Into<PathBuf>) -> Self {
        Self {
            target,
            staging: staging.into(),
        }
    }
}

impl ArtifactUploader for ObjectStoreUploader {
    fn upload(&self, artifact: &Path) -> Result<String> {
        let key = self.target.key_for(&artifact_name(artifact)?);
        let dest = key.split('/').filter(|p| !matches!(*p, "" | "." | "..")).fold(self.staging.clone(), |d, p| d.join(p));
        copy_into(artifact, &dest)?;
        Ok(self.target.url_for(&key))
    }
}
