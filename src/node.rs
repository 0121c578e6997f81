use crate::utils::majority_class;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a node does with a row.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Route the row to the child at the index of its value for `attribute`.
    Split {
        attribute: usize,
        score: f64,
        children: Vec<usize>,
    },
    /// Predict `class`.
    Leaf { class: u16 },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub num: usize,
    pub depth: usize,
    pub parent_node: usize,
    /// Histogram of the training classes that reached this node.
    pub class_counts: Vec<usize>,
    pub kind: NodeKind,
}

/// A node that may still be split, with its rows at
/// `index[start_idx..stop_idx]` of the shared row index.
#[derive(Debug)]
pub struct SplittableNode {
    pub num: usize,
    pub depth: usize,
    pub start_idx: usize,
    pub stop_idx: usize,
    /// Attributes already split on along the path to this node, in split order.
    pub used: Vec<usize>,
    pub class_counts: Vec<usize>,
}

impl SplittableNode {
    pub fn n_samples(&self) -> usize {
        self.stop_idx - self.start_idx
    }

    /// True if at most one class is present.
    pub fn is_pure(&self) -> bool {
        self.class_counts.iter().filter(|&&c| c > 0).count() <= 1
    }
}

impl Node {
    pub fn leaf(num: usize, depth: usize, parent_node: usize, class_counts: Vec<usize>, class: u16) -> Self {
        Node {
            num,
            depth,
            parent_node,
            class_counts,
            kind: NodeKind::Leaf { class },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Number of training rows that reached this node.
    pub fn n_samples(&self) -> usize {
        self.class_counts.iter().sum()
    }

    pub fn majority_class(&self) -> u16 {
        majority_class(&self.class_counts)
    }

    /// Turn a leaf into a split on `attribute`, with one child per attribute value.
    pub fn make_parent_node(&mut self, attribute: usize, score: f64, children: Vec<usize>) {
        self.kind = NodeKind::Split {
            attribute,
            score,
            children,
        };
    }

    /// Collapse a split into a leaf. The children must be removed by the caller.
    pub fn make_leaf(&mut self, class: u16) {
        self.kind = NodeKind::Leaf { class };
    }

    /// Get the child to travel down to, given the row's value for the split attribute.
    pub fn get_child_idx(&self, v: u16) -> Option<usize> {
        match &self.kind {
            NodeKind::Split { children, .. } => children.get(v as usize).copied(),
            NodeKind::Leaf { .. } => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            NodeKind::Leaf { class } => write!(f, "{}:leaf={},cover={}", self.num, class, self.n_samples()),
            NodeKind::Split {
                attribute,
                score,
                children,
            } => write!(
                f,
                "{}:[{}] children={:?},score={:.4},cover={}",
                self.num,
                attribute,
                children,
                score,
                self.n_samples()
            ),
        }
    }
}
