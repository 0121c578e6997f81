pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;
pub const DEFAULT_PRUNE_MARGIN: f64 = 0.01;
pub const MAX_CATEGORIES: usize = u16::MAX as usize;
pub const ROOT_NODE: usize = 0;
pub const ENV_HOME: &str = "RULESHEET_HOME";
pub const ENV_WORK_DIR: &str = "RULESHEET_WORK_DIR";
pub const SCORE_TOLERANCE: f64 = 1e-9;
