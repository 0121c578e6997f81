//! Splitter
//!
//! Scoring of categorical multiway splits. Each [`Splitter`] turns the class
//! histograms of the partitions an attribute would create into a score; the
//! shared [`Splitter::best_split`] picks the highest scoring unused attribute.
use crate::constants::SCORE_TOLERANCE;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::tree::DecisionVariable;
use crate::utils::{entropy, items_to_strings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Splitting criterion used to grow a tree.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Maximum information gain.
    ID3,
    /// Maximum gain ratio, with error based pruning after growth.
    C45,
}

impl FromStr for Criterion {
    type Err = RulesheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID3" | "id3" => Ok(Criterion::ID3),
            "C45" | "c45" | "C4.5" | "c4.5" => Ok(Criterion::C45),
            _ => Err(RulesheetError::ParseString(
                s.to_string(),
                "Criterion".to_string(),
                items_to_strings(vec!["ID3", "C45"]),
            )),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Criterion::ID3 => write!(f, "ID3"),
            Criterion::C45 => write!(f, "C45"),
        }
    }
}

/// The chosen split of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    pub split_attribute: usize,
    pub split_score: f64,
}

/// Class histogram of every value of one attribute, over a node's rows.
/// `counts[v][c]` is the number of rows with value `v` and class `c`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeHistogram {
    pub counts: Vec<Vec<usize>>,
}

impl AttributeHistogram {
    pub fn new(index: &[usize], feature: &[u16], outputs: &[u16], arity: usize, class_count: usize) -> Self {
        let mut counts = vec![vec![0; class_count]; arity];
        for &i in index {
            counts[feature[i] as usize][outputs[i] as usize] += 1;
        }
        AttributeHistogram { counts }
    }

    /// Rows per attribute value.
    pub fn partition_sizes(&self) -> Vec<usize> {
        self.counts.iter().map(|c| c.iter().sum()).collect()
    }

    /// Number of values that at least one row takes.
    pub fn n_observed(&self) -> usize {
        self.partition_sizes().iter().filter(|&&n| n > 0).count()
    }
}

/// Information gain, in bits, of partitioning `parent_counts` into `histogram`.
pub fn information_gain(parent_counts: &[usize], histogram: &AttributeHistogram) -> f64 {
    let total: usize = parent_counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let children: f64 = histogram
        .counts
        .iter()
        .map(|c| {
            let n: usize = c.iter().sum();
            (n as f64 / total) * entropy(c)
        })
        .sum();
    entropy(parent_counts) - children
}

/// Intrinsic information of a partition, the entropy of the partition sizes.
pub fn split_information(histogram: &AttributeHistogram) -> f64 {
    entropy(&histogram.partition_sizes())
}

/// Gain ratio; zero when the attribute takes a single value among the rows.
pub fn gain_ratio(parent_counts: &[usize], histogram: &AttributeHistogram) -> f64 {
    let split_info = split_information(histogram);
    if split_info <= 0.0 {
        0.0
    } else {
        information_gain(parent_counts, histogram) / split_info
    }
}

pub trait Splitter {
    fn criterion(&self) -> Criterion;

    /// Score of a candidate split, higher is better.
    fn split_score(&self, parent_counts: &[usize], histogram: &AttributeHistogram) -> f64;

    /// Find the best split of a node's rows over the attributes not in `used`.
    ///
    /// Attributes taking a single value among the rows are never candidates, so
    /// `None` is returned when no attribute separates the rows. Scores within
    /// [`SCORE_TOLERANCE`] of each other tie, and ties go to the lowest
    /// attribute index.
    #[allow(clippy::too_many_arguments)]
    fn best_split(
        &self,
        index: &[usize],
        inputs: &Matrix<u16>,
        outputs: &[u16],
        attributes: &[DecisionVariable],
        class_count: usize,
        used: &[usize],
        parent_counts: &[usize],
    ) -> Option<SplitInfo> {
        let mut best: Option<SplitInfo> = None;
        for (attribute, variable) in attributes.iter().enumerate() {
            if used.contains(&attribute) {
                continue;
            }
            let histogram = AttributeHistogram::new(
                index,
                inputs.get_col(attribute),
                outputs,
                variable.arity,
                class_count,
            );
            if histogram.n_observed() < 2 {
                continue;
            }
            let score = self.split_score(parent_counts, &histogram);
            let better = match &best {
                None => true,
                Some(b) => score > b.split_score + SCORE_TOLERANCE,
            };
            if better {
                best = Some(SplitInfo {
                    split_attribute: attribute,
                    split_score: score,
                });
            }
        }
        best
    }
}

/// ID3 splitter.
pub struct InformationGainSplitter;

impl Splitter for InformationGainSplitter {
    fn criterion(&self) -> Criterion {
        Criterion::ID3
    }

    fn split_score(&self, parent_counts: &[usize], histogram: &AttributeHistogram) -> f64 {
        information_gain(parent_counts, histogram)
    }
}

/// C4.5 splitter.
pub struct GainRatioSplitter;

impl Splitter for GainRatioSplitter {
    fn criterion(&self) -> Criterion {
        Criterion::C45
    }

    fn split_score(&self, parent_counts: &[usize], histogram: &AttributeHistogram) -> f64 {
        gain_ratio(parent_counts, histogram)
    }
}
