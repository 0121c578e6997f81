//! Rules
//!
//! Flattening of a [`DecisionTree`] into an ordered list of IF/THEN rules, one
//! per leaf, and translation of those rules back to the original categorical
//! values through a [`Codebook`].
use crate::codec::Codebook;
use crate::constants::ROOT_NODE;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::node::NodeKind;
use crate::tree::DecisionTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `attribute == value` condition over coded data.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Antecedent {
    pub attribute: usize,
    pub value: u16,
}

/// A coded decision rule: if every antecedent holds, predict `output`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Rule {
    /// Conditions in the order the tree splits on them.
    pub antecedents: Vec<Antecedent>,
    pub output: u16,
    /// Training rows that reached the leaf this rule was read from.
    pub support: usize,
}

impl Rule {
    /// Whether every antecedent holds for a coded row.
    pub fn matches(&self, row: &[u16]) -> bool {
        self.antecedents
            .iter()
            .all(|a| row.get(a.attribute).is_some_and(|v| *v == a.value))
    }
}

/// Read one rule per leaf off a tree.
///
/// The walk is depth first from the root, children visited in ascending value
/// order, so the rule order is fully determined by the tree.
pub fn extract(tree: &DecisionTree) -> Result<Vec<Rule>, RulesheetError> {
    let mut rules = Vec::with_capacity(tree.n_leaves);
    let mut stack: Vec<(usize, Vec<Antecedent>, Vec<usize>)> = vec![(ROOT_NODE, Vec::new(), vec![ROOT_NODE])];
    while let Some((idx, antecedents, path)) = stack.pop() {
        let node = tree.node(idx, &path)?;
        match &node.kind {
            NodeKind::Leaf { class } => rules.push(Rule {
                antecedents,
                output: *class,
                support: node.n_samples(),
            }),
            NodeKind::Split {
                attribute, children, ..
            } => {
                for (value, child) in children.iter().enumerate().rev() {
                    let mut a = antecedents.clone();
                    a.push(Antecedent {
                        attribute: *attribute,
                        value: value as u16,
                    });
                    let mut p = path.clone();
                    p.push(*child);
                    stack.push((*child, a, p));
                }
            }
        }
    }
    Ok(rules)
}

impl DecisionTree {
    /// See [`extract`].
    pub fn to_rules(&self) -> Result<Vec<Rule>, RulesheetError> {
        extract(self)
    }
}

/// Rules that fire for a coded row.
pub fn matching_rules<'a>(rules: &'a [Rule], row: &[u16]) -> Vec<&'a Rule> {
    rules.iter().filter(|r| r.matches(row)).collect()
}

/// Classify every row of a matrix with the first rule that fires.
/// A row no rule covers is an error naming the row.
pub fn decide_with_rules(rules: &[Rule], data: &Matrix<u16>) -> Result<Vec<u16>, RulesheetError> {
    (0..data.rows)
        .map(|i| {
            let row = data.get_row(i);
            rules
                .iter()
                .find(|r| r.matches(&row))
                .map(|r| r.output)
                .ok_or(RulesheetError::UncoveredRow(i))
        })
        .collect()
}

/// An antecedent in terms of the original values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DecodedAntecedent {
    /// Position of the attribute among the input columns.
    pub index: usize,
    pub attribute: String,
    pub value: String,
}

impl DecodedAntecedent {
    /// Cell text of the condition, the value in single quotes.
    pub fn condition(&self) -> String {
        format!("'{}'", self.value)
    }
}

/// A rule in terms of the original values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DecodedRule {
    pub antecedents: Vec<DecodedAntecedent>,
    /// Name of the output column.
    pub output: String,
    /// Predicted value of the output column.
    pub consequent: String,
    pub support: usize,
}

impl DecodedRule {
    /// Cell text of the consequent, the value in single quotes.
    pub fn action(&self) -> String {
        format!("'{}'", self.consequent)
    }
}

impl fmt::Display for DecodedRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let conditions = if self.antecedents.is_empty() {
            "true".to_string()
        } else {
            self.antecedents
                .iter()
                .map(|a| format!("{}={}", a.attribute, a.condition()))
                .collect::<Vec<_>>()
                .join(" AND ")
        };
        write!(f, "IF {} THEN {}={}", conditions, self.output, self.action())
    }
}

/// Turn rules into [`DecodedRule`]s.
pub trait Decode {
    /// * `codebook` - Codebook the inputs and output were coded with.
    /// * `attribute_names` - Input column names, in attribute index order.
    /// * `output_name` - Output column name.
    fn decode(
        &self,
        codebook: &Codebook,
        attribute_names: &[&str],
        output_name: &str,
    ) -> Result<Vec<DecodedRule>, RulesheetError>;
}

impl Decode for [Rule] {
    fn decode(
        &self,
        codebook: &Codebook,
        attribute_names: &[&str],
        output_name: &str,
    ) -> Result<Vec<DecodedRule>, RulesheetError> {
        self.iter()
            .map(|rule| {
                let antecedents = rule
                    .antecedents
                    .iter()
                    .map(|a| {
                        let name = attribute_names
                            .get(a.attribute)
                            .ok_or(RulesheetError::UnknownAttribute(a.attribute, attribute_names.len()))?;
                        Ok(DecodedAntecedent {
                            index: a.attribute,
                            attribute: name.to_string(),
                            value: codebook.decode(name, a.value)?.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, RulesheetError>>()?;
                Ok(DecodedRule {
                    antecedents,
                    output: output_name.to_string(),
                    consequent: codebook.decode(output_name, rule.output)?.to_string(),
                    support: rule.support,
                })
            })
            .collect()
    }
}

// Already decoded rules pass through unchanged.
impl Decode for [DecodedRule] {
    fn decode(&self, _: &Codebook, _: &[&str], _: &str) -> Result<Vec<DecodedRule>, RulesheetError> {
        Ok(self.to_vec())
    }
}

/// Decode rules, preserving their order.
pub fn decode_rules<R: Decode + ?Sized>(
    rules: &R,
    codebook: &Codebook,
    attribute_names: &[&str],
    output_name: &str,
) -> Result<Vec<DecodedRule>, RulesheetError> {
    rules.decode(codebook, attribute_names, output_name)
}
