use crate::constants::ROOT_NODE;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::node::NodeKind;
use crate::tree::tree::{validate_training_data, DecisionTree};
use crate::utils::{majority_class, misclassified, validate_float_parameter};
use log::info;
use std::collections::HashMap;

impl DecisionTree {
    /// Error based pruning.
    ///
    /// Route every row of `inputs` through the tree, then, bottom-up, collapse
    /// each split node into a leaf predicting the majority class of the rows it
    /// covers, whenever the leaf's error rate on those rows exceeds the error rate
    /// of the subtree by no more than `margin`. Nodes no row reaches are kept.
    /// Returns the number of nodes removed.
    ///
    /// * `inputs` - Coded inputs, the training data or a held out pruning set.
    /// * `outputs` - Coded outputs.
    /// * `margin` - Tolerated increase of the error rate, in `[0, 1]`.
    pub fn prune(&mut self, inputs: &Matrix<u16>, outputs: &[u16], margin: f64) -> Result<usize, RulesheetError> {
        validate_float_parameter(margin, 0.0, 1.0, "prune_margin")?;
        validate_training_data(&self.attributes, self.class_count, inputs, outputs)?;

        let old_n_nodes = self.nodes.len();
        let node_counts = self.route_counts(inputs, outputs)?;
        let empty = vec![0; self.class_count];

        // Misclassified rows per subtree, children are always visited before their parent.
        let mut errors: HashMap<usize, usize> = HashMap::new();
        for idx in self.preorder().into_iter().rev() {
            let counts = node_counts.get(&idx).unwrap_or(&empty);
            let n: usize = counts.iter().sum();
            let children = match &self.nodes[&idx].kind {
                NodeKind::Leaf { class } => {
                    errors.insert(idx, n - counts[*class as usize]);
                    continue;
                }
                NodeKind::Split { children, .. } => children.clone(),
            };

            let subtree_errors: usize = children.iter().map(|c| errors.get(c).copied().unwrap_or(0)).sum();
            let leaf_errors = misclassified(counts);
            if n > 0 && (leaf_errors as f64 - subtree_errors as f64) / n as f64 <= margin {
                let class = majority_class(counts);
                self.remove_children(idx);
                if let Some(node) = self.nodes.get_mut(&idx) {
                    node.make_leaf(class);
                }
                errors.insert(idx, leaf_errors);
            } else {
                errors.insert(idx, subtree_errors);
            }
        }

        self.update_stats();
        let removed = old_n_nodes - self.nodes.len();
        info!(
            "pruning: n_nodes: {} -> {}, n_leaves: {}, depth: {}",
            old_n_nodes,
            self.nodes.len(),
            self.n_leaves,
            self.depth
        );
        Ok(removed)
    }

    /// Class histogram of the rows reaching every node.
    fn route_counts(&self, inputs: &Matrix<u16>, outputs: &[u16]) -> Result<HashMap<usize, Vec<usize>>, RulesheetError> {
        let mut node_counts: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, &class) in outputs.iter().enumerate() {
            let row = inputs.get_row(i);
            let mut path = vec![ROOT_NODE];
            let mut node = self.root()?;
            loop {
                node_counts
                    .entry(node.num)
                    .or_insert_with(|| vec![0; self.class_count])[class as usize] += 1;
                let attribute = match &node.kind {
                    NodeKind::Leaf { .. } => break,
                    NodeKind::Split { attribute, .. } => *attribute,
                };
                let child_idx = node
                    .get_child_idx(row[attribute])
                    .ok_or_else(|| RulesheetError::UnreachableNode(node.num, format!("{:?}", path)))?;
                path.push(child_idx);
                node = self.node(child_idx, &path)?;
            }
        }
        Ok(node_counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codebook;
    use crate::data::Table;
    use crate::node::Node;
    use crate::splitter::{Criterion, GainRatioSplitter};
    use crate::tree::DecisionVariable;
    use std::collections::BTreeMap;

    fn applicants() -> (DecisionTree, Vec<u16>, Vec<u16>) {
        let table = Table::from_csv_path("resources/applicants.csv").unwrap();
        let names = ["Age", "Skydiver", "Weight", "Gender"];
        let codebook = Codebook::fit(&table, &["Age", "Skydiver", "Weight", "Gender", "Risk"]).unwrap();
        let coded = codebook.encode(&table).unwrap();
        let data = coded.select(&names).unwrap();
        let y = coded.column("Risk").unwrap().to_vec();
        let attributes = codebook.decision_variables(&names).unwrap();
        let inputs = Matrix::new(&data, y.len(), names.len());
        let tree = DecisionTree::fit(&attributes, 3, &inputs, &y, &GainRatioSplitter, 2, None).unwrap();
        (tree, data, y)
    }

    #[test]
    fn test_prune_collapses_single_class_subtree() {
        let mut root = Node::leaf(0, 0, 0, vec![1, 3], 1);
        root.make_parent_node(0, 0.0, vec![1, 2]);
        let mut nodes = BTreeMap::new();
        nodes.insert(0, root);
        nodes.insert(1, Node::leaf(1, 1, 0, vec![0, 2], 1));
        nodes.insert(2, Node::leaf(2, 1, 0, vec![1, 1], 1));
        let mut tree = DecisionTree {
            attributes: vec![DecisionVariable::new("a", 2)],
            class_count: 2,
            criterion: Criterion::C45,
            nodes,
            depth: 1,
            n_leaves: 2,
        };

        let data = vec![0, 0, 1, 1];
        let y = vec![1, 1, 0, 1];
        let removed = tree.prune(&Matrix::new(&data, 4, 1), &y, 0.0).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[&0].kind, NodeKind::Leaf { class: 1 });
        assert_eq!(tree.depth, 0);
        assert_eq!(tree.n_leaves, 1);
    }

    #[test]
    fn test_prune_training_data_keeps_tree() {
        let (mut tree, data, y) = applicants();
        let before = tree.clone();
        let inputs = Matrix::new(&data, y.len(), 4);
        assert_eq!(tree.prune(&inputs, &y, 0.0).unwrap(), 0);
        assert_eq!(tree.prune(&inputs, &y, 0.01).unwrap(), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_prune_full_margin_collapses_to_root() {
        let (mut tree, data, y) = applicants();
        let inputs = Matrix::new(&data, y.len(), 4);
        assert_eq!(tree.prune(&inputs, &y, 1.0).unwrap(), 6);
        assert_eq!(tree.nodes.len(), 1);
        // Risk high and medium tie with 4 rows each, high has the lowest code.
        assert_eq!(tree.nodes[&0].kind, NodeKind::Leaf { class: 0 });
    }

    #[test]
    fn test_prune_held_out_set() {
        let (mut tree, _, _) = applicants();
        // Columns Age, Skydiver, Weight, Gender. A light young non skydiver of
        // medium risk, a light old one of low risk, and a skydiver of high risk.
        let data = vec![0, 1, 0, 1, 1, 0, 1, 1, 0, 0, 0, 0];
        let y = vec![2, 1, 0];
        let removed = tree.prune(&Matrix::new(&data, 3, 4), &y, 0.01).unwrap();
        assert_eq!(removed, 4);
        assert_eq!(tree.nodes.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(tree.nodes[&2].kind, NodeKind::Leaf { class: 1 });
        // Training histograms are kept.
        assert_eq!(tree.nodes[&2].class_counts, vec![0, 1, 4]);
        assert_eq!(tree.depth, 1);
    }

    #[test]
    fn test_prune_invalid_margin() {
        let (mut tree, data, y) = applicants();
        let inputs = Matrix::new(&data, y.len(), 4);
        assert!(matches!(
            tree.prune(&inputs, &y, 1.5),
            Err(RulesheetError::InvalidParameter(_, _, _))
        ));
        assert!(matches!(
            tree.prune(&inputs, &y[..3], 0.1),
            Err(RulesheetError::LengthMismatch(9, 3))
        ));
    }
}
