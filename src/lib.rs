mod prune;

// Modules
pub mod builder;
pub mod codec;
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod node;
pub mod pipeline;
pub mod rules;
pub mod sink;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use builder::TreeBuilder;
pub use codec::{Codebook, CodebookBuilder};
pub use config::{Config, ConfigIO, SinkConfig, TreeConfig};
pub use data::{Matrix, Table};
pub use errors::RulesheetError;
pub use pipeline::{InducedRules, RuleInducer};
pub use rules::{decode_rules, extract, Decode, DecodedRule, Rule};
pub use sink::{export_rules, open_sink, MatrixId, MemorySink, RulesheetSink};
pub use splitter::Criterion;
pub use tree::{DecisionTree, DecisionVariable};
