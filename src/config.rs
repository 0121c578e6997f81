//! Configuration
//!
//! Tree induction settings, and the settings handed through to a rulesheet sink.
use crate::constants::{DEFAULT_MIN_SAMPLES_SPLIT, DEFAULT_PRUNE_MARGIN, ENV_HOME, ENV_WORK_DIR};
use crate::errors::RulesheetError;
use crate::splitter::Criterion;
use crate::utils::validate_float_parameter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

fn default_criterion() -> Criterion {
    Criterion::C45
}
fn default_min_samples_split() -> usize {
    DEFAULT_MIN_SAMPLES_SPLIT
}
fn default_max_depth() -> Option<usize> {
    None
}
fn default_prune() -> bool {
    true
}
fn default_prune_margin() -> f64 {
    DEFAULT_PRUNE_MARGIN
}

/// Configuration for growing a tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Splitting criterion.
    #[serde(default = "default_criterion")]
    pub criterion: Criterion,
    /// Nodes with fewer training rows become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Nodes at this depth become leaves.
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,
    /// Apply error based pruning after growth, C45 only.
    #[serde(default = "default_prune")]
    pub prune: bool,
    /// Tolerated increase of the error rate when collapsing a subtree.
    #[serde(default = "default_prune_margin")]
    pub prune_margin: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            criterion: default_criterion(),
            min_samples_split: default_min_samples_split(),
            max_depth: default_max_depth(),
            prune: default_prune(),
            prune_margin: default_prune_margin(),
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<(), RulesheetError> {
        validate_float_parameter(self.prune_margin, 0.0, 1.0, "prune_margin")?;
        if self.min_samples_split == 0 {
            return Err(RulesheetError::InvalidParameter(
                "min_samples_split".to_string(),
                "an integer of at least 1".to_string(),
                self.min_samples_split.to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(RulesheetError::InvalidParameter(
                "max_depth".to_string(),
                "an integer of at least 1 or None".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the rulesheet sink reads and writes its documents.
/// Passed through to the sink as is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub work_dir: Option<String>,
    #[serde(default)]
    pub rulesheet_path: Option<String>,
    #[serde(default)]
    pub vocabulary_path: Option<String>,
    /// Singular entity name, derived from the table name when missing.
    #[serde(default)]
    pub entity: Option<String>,
}

impl SinkConfig {
    /// Read `home` and `work_dir` from the environment.
    pub fn from_env() -> Self {
        SinkConfig {
            home: env::var(ENV_HOME).ok(),
            work_dir: env::var(ENV_WORK_DIR).ok(),
            ..Default::default()
        }
    }

    /// Fill the fields this config leaves empty from the environment.
    pub fn with_env_defaults(self) -> Self {
        let env = SinkConfig::from_env();
        SinkConfig {
            home: self.home.or(env.home),
            work_dir: self.work_dir.or(env.work_dir),
            ..self
        }
    }
}

/// Complete configuration of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    /// Output column, the last table column when missing.
    #[serde(default)]
    pub output: Option<String>,
}

/// JSON persistence of configuration objects.
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, RulesheetError> {
        serde_json::to_string(self).map_err(|e| RulesheetError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, RulesheetError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| RulesheetError::UnableToRead(e.to_string()))
    }

    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), RulesheetError> {
        fs::write(path, self.json_dump()?).map_err(|e| RulesheetError::UnableToWrite(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, RulesheetError> {
        let json_str = fs::read_to_string(path).map_err(|e| RulesheetError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for TreeConfig {}
impl ConfigIO for SinkConfig {}
impl ConfigIO for Config {}
