use crate::constants::ROOT_NODE;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::node::{Node, NodeKind, SplittableNode};
use crate::splitter::{Criterion, Splitter};
use crate::utils::{class_counts, majority_class, pivot_on_attribute};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::max;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

/// A categorical input attribute: its name and how many values it can take.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DecisionVariable {
    pub name: String,
    pub arity: usize,
}

impl DecisionVariable {
    pub fn new(name: &str, arity: usize) -> Self {
        DecisionVariable {
            name: name.to_string(),
            arity,
        }
    }
}

/// A categorical multiway decision tree over coded attributes.
///
/// Nodes are kept in an ordered map keyed by node number, the root is node 0.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DecisionTree {
    pub attributes: Vec<DecisionVariable>,
    pub class_count: usize,
    pub criterion: Criterion,
    pub nodes: BTreeMap<usize, Node>,
    pub depth: usize,
    pub n_leaves: usize,
}

/// Check the training data against the declared attributes and classes.
///
/// * `attributes` - Input attributes, one per column of `inputs`.
/// * `class_count` - Number of output classes.
/// * `inputs` - Coded inputs.
/// * `outputs` - Coded outputs, one per row of `inputs`.
pub fn validate_training_data(
    attributes: &[DecisionVariable],
    class_count: usize,
    inputs: &Matrix<u16>,
    outputs: &[u16],
) -> Result<(), RulesheetError> {
    if attributes.is_empty() {
        return Err(RulesheetError::NoAttributes);
    }
    if let Some(a) = attributes.iter().find(|a| a.arity <= 1) {
        return Err(RulesheetError::ConstantAttribute(a.name.clone(), a.arity));
    }
    if class_count == 0 {
        return Err(RulesheetError::NoClasses);
    }
    if inputs.cols != attributes.len() {
        return Err(RulesheetError::AttributeCountMismatch(inputs.cols, attributes.len()));
    }
    if inputs.data.len() != inputs.rows * inputs.cols {
        return Err(RulesheetError::LengthMismatch(inputs.data.len(), inputs.rows * inputs.cols));
    }
    if inputs.rows != outputs.len() {
        return Err(RulesheetError::LengthMismatch(inputs.rows, outputs.len()));
    }
    for (j, attribute) in attributes.iter().enumerate() {
        if let Some((row, value)) = inputs
            .get_col(j)
            .iter()
            .enumerate()
            .find(|(_, v)| **v as usize >= attribute.arity)
        {
            return Err(RulesheetError::InputOutOfRange {
                row,
                attribute: attribute.name.clone(),
                value: *value,
                arity: attribute.arity,
            });
        }
    }
    if let Some((row, value)) = outputs.iter().enumerate().find(|(_, v)| **v as usize >= class_count) {
        return Err(RulesheetError::OutputOutOfRange {
            row,
            value: *value,
            class_count,
        });
    }
    Ok(())
}

impl DecisionTree {
    /// Grow a tree on coded training data.
    ///
    /// * `attributes` - Input attributes, one per column of `inputs`.
    /// * `class_count` - Number of output classes.
    /// * `inputs` - Coded inputs, values of column `i` in `0..attributes[i].arity`.
    /// * `outputs` - Coded outputs in `0..class_count`.
    /// * `splitter` - Scores candidate splits.
    /// * `min_samples_split` - Nodes with fewer rows become leaves.
    /// * `max_depth` - Nodes at this depth become leaves.
    pub fn fit<T: Splitter>(
        attributes: &[DecisionVariable],
        class_count: usize,
        inputs: &Matrix<u16>,
        outputs: &[u16],
        splitter: &T,
        min_samples_split: usize,
        max_depth: Option<usize>,
    ) -> Result<Self, RulesheetError> {
        validate_training_data(attributes, class_count, inputs, outputs)?;

        let mut tree = DecisionTree {
            attributes: attributes.to_vec(),
            class_count,
            criterion: splitter.criterion(),
            nodes: BTreeMap::new(),
            depth: 0,
            n_leaves: 0,
        };

        let mut index = inputs.index.to_owned();
        let root_counts = class_counts(&index, outputs, class_count);
        tree.nodes.insert(
            ROOT_NODE,
            Node::leaf(ROOT_NODE, 0, ROOT_NODE, root_counts.clone(), majority_class(&root_counts)),
        );

        let mut n_nodes = 1;
        let mut growable = vec![SplittableNode {
            num: ROOT_NODE,
            depth: 0,
            start_idx: 0,
            stop_idx: index.len(),
            used: Vec::new(),
            class_counts: root_counts,
        }];

        // Grab a node off the stack, if it can be split, add its
        // children to the tree and the non empty ones to the stack.
        while let Some(node) = growable.pop() {
            if node.is_pure()
                || node.used.len() == attributes.len()
                || node.n_samples() < min_samples_split
                || max_depth.is_some_and(|d| node.depth >= d)
            {
                continue;
            }

            let split = match splitter.best_split(
                &index[node.start_idx..node.stop_idx],
                inputs,
                outputs,
                attributes,
                class_count,
                &node.used,
                &node.class_counts,
            ) {
                Some(s) => s,
                None => continue,
            };

            let attribute = split.split_attribute;
            let ranges = pivot_on_attribute(
                &mut index[node.start_idx..node.stop_idx],
                inputs.get_col(attribute),
                attributes[attribute].arity,
            );

            let parent_class = majority_class(&node.class_counts);
            let mut children = Vec::with_capacity(ranges.len());
            let mut new_nodes = Vec::new();
            for (start, stop) in ranges {
                let (start_idx, stop_idx) = (node.start_idx + start, node.start_idx + stop);
                let counts = class_counts(&index[start_idx..stop_idx], outputs, class_count);
                // Values no row takes predict the parent's majority.
                let class = if stop_idx > start_idx {
                    majority_class(&counts)
                } else {
                    parent_class
                };
                let num = n_nodes;
                n_nodes += 1;
                tree.nodes
                    .insert(num, Node::leaf(num, node.depth + 1, node.num, counts.clone(), class));
                children.push(num);
                if stop_idx > start_idx {
                    let mut used = node.used.clone();
                    used.push(attribute);
                    new_nodes.push(SplittableNode {
                        num,
                        depth: node.depth + 1,
                        start_idx,
                        stop_idx,
                        used,
                        class_counts: counts,
                    });
                }
            }

            debug!(
                "node {} split on {} (score {:.4}) into {:?}",
                node.num, attributes[attribute].name, split.split_score, children
            );
            if let Some(x) = tree.nodes.get_mut(&node.num) {
                x.make_parent_node(attribute, split.split_score, children);
            }
            tree.depth = max(tree.depth, node.depth + 1);

            // Reversed, so the lowest value is grown first.
            growable.extend(new_nodes.into_iter().rev());
        }

        tree.n_leaves = tree.nodes.values().filter(|n| n.is_leaf()).count();
        Ok(tree)
    }

    pub fn root(&self) -> Result<&Node, RulesheetError> {
        self.node(ROOT_NODE, &[])
    }

    /// Get a node, `path` is only used to describe where it was expected.
    pub fn node(&self, num: usize, path: &[usize]) -> Result<&Node, RulesheetError> {
        self.nodes
            .get(&num)
            .ok_or_else(|| RulesheetError::UnreachableNode(num, format!("{:?}", path)))
    }

    /// Remove every descendant of a node, the node itself is kept.
    pub fn remove_children(&mut self, node_idx: usize) {
        let mut stack = match self.nodes.get(&node_idx).map(|n| &n.kind) {
            Some(NodeKind::Split { children, .. }) => children.clone(),
            _ => return,
        };
        while let Some(idx) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&idx) {
                if let NodeKind::Split { children, .. } = removed.kind {
                    stack.extend(children);
                }
            }
        }
    }

    /// Recompute `depth` and `n_leaves` from the nodes.
    pub fn update_stats(&mut self) {
        self.depth = self.nodes.values().map(|n| n.depth).max().unwrap_or(0);
        self.n_leaves = self.nodes.values().filter(|n| n.is_leaf()).count();
    }

    /// Node numbers in depth first order, children in ascending value order.
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT_NODE];
        while let Some(idx) = stack.pop() {
            let node = match self.nodes.get(&idx) {
                Some(n) => n,
                None => continue,
            };
            order.push(idx);
            if let NodeKind::Split { children, .. } = &node.kind {
                stack.extend(children.iter().rev());
            }
        }
        order
    }

    /// Dump a tree as a json object
    pub fn json_dump(&self) -> Result<String, RulesheetError> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(RulesheetError::UnableToWrite(e.to_string())),
        }
    }

    /// Load a tree from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    pub fn from_json(json_str: &str) -> Result<Self, RulesheetError> {
        let model = serde_json::from_str::<DecisionTree>(json_str);
        match model {
            Ok(m) => Ok(m),
            Err(e) => Err(RulesheetError::UnableToRead(e.to_string())),
        }
    }

    /// Save a tree as a json object to a file.
    ///
    /// * `path` - Path to save tree.
    pub fn save_tree<P: AsRef<Path>>(&self, path: P) -> Result<(), RulesheetError> {
        let model = self.json_dump()?;
        match fs::write(path, model) {
            Err(e) => Err(RulesheetError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Load a tree from a path to a json tree object.
    ///
    /// * `path` - Path to load tree from.
    pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<Self, RulesheetError> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(RulesheetError::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }
}

impl Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = String::new();
        for idx in self.preorder() {
            let node = &self.nodes[&idx];
            r += format!("{}{}\n", "      ".repeat(node.depth).as_str(), node).as_str();
        }
        write!(f, "{}", r)
    }
}
