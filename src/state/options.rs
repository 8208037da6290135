use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::upload::ObjectStoreTarget;

/// What to do with rows whose timestamp is not a whole number of steps after
/// the first timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Fail the run with an input error naming the first offending row.
    Reject,
    /// Leave the row out of the completed grid.
    Drop,
    /// Move the row onto the nearest grid slot unless an aligned row owns it.
    Snap,
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        AlignmentPolicy::Reject
    }
}

impl AlignmentPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            AlignmentPolicy::Reject => "reject",
            AlignmentPolicy::Drop => "drop",
            AlignmentPolicy::Snap => "snap",
        }
    }
}

/// Settings for one processing run. Loadable from a JSON file; any field left
/// out takes its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Appended to the output file name as `_<suffix>`. Trimmed; empty means
    /// the output keeps the input's base name.
    pub suffix: String,
    /// Directory for the output file. Defaults to the input file's directory.
    pub output_dir: Option<PathBuf>,
    pub alignment: AlignmentPolicy,
    /// chrono format string for the timestamp column. Auto-detected when unset.
    pub timestamp_format: Option<String>,
    /// Also write `<output-stem>.stats.json` next to the output file.
    pub stats_json: bool,
    /// Copy each finished file into this directory.
    pub upload_dir: Option<PathBuf>,
    /// Stage uploads under object keys for this bucket instead of copying
    /// them flat. Needs `upload_dir` as the staging root.
    pub object_store: Option<ObjectStoreTarget>,
}

impl ProcessOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let opts = ProcessOptions::from_json_str(r#"{ "suffix": "filled" }"#).unwrap();
        assert_eq!(opts.suffix, "filled");
        assert_eq!(opts.alignment, AlignmentPolicy::Reject);
        assert!(opts.output_dir.is_none());
        assert!(!opts.stats_json);
    }

    #[test]
    fn alignment_is_lowercase_in_json() {
        let opts = ProcessOptions::from_json_str(r#"{ "alignment": "snap" }"#).unwrap();
        assert_eq!(opts.alignment, AlignmentPolicy::Snap);

        let json = serde_json::to_string(&ProcessOptions::default().with_alignment(AlignmentPolicy::Drop)).unwrap();
        assert!(json.contains(r#""alignment":"drop""#), "{json}");
    }

    #[test]
    fn object_store_section_is_optional() {
        let opts = ProcessOptions::from_json_str(
            r#"{ "upload_dir": "/tmp/stage", "object_store": { "bucket": "b", "region": "eu-west-1", "key_prefix": "out" } }"#,
        )
        .unwrap();
        let target = opts.object_store.unwrap();
        assert_eq!(target.bucket, "b");
        assert_eq!(target.key_for("x.csv"), "out/x.csv");
        assert!(ProcessOptions::default().object_store.is_none());
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ProcessOptions::from_json_str("{ suffix: 1 }").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
