use crate::config::TreeConfig;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::splitter::{Criterion, GainRatioSplitter, InformationGainSplitter};
use crate::tree::{DecisionTree, DecisionVariable};
use log::info;

/// Grows, and for C4.5 prunes, a decision tree according to a [`TreeConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeBuilder {
    pub cfg: TreeConfig,
}

impl TreeBuilder {
    pub fn new(cfg: TreeConfig) -> Self {
        TreeBuilder { cfg }
    }

    /// Set the splitting criterion.
    /// * `criterion` - ID3 (information gain) or C45 (gain ratio).
    pub fn set_criterion(mut self, criterion: Criterion) -> Self {
        self.cfg.criterion = criterion;
        self
    }

    /// Set the minimum number of rows a node needs to be split.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.cfg.min_samples_split = min_samples_split;
        self
    }

    /// Set the maximum depth of the tree, `None` grows until the leaves are pure.
    pub fn set_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.cfg.max_depth = max_depth;
        self
    }

    /// Set whether C45 trees are pruned after growth.
    pub fn set_prune(mut self, prune: bool) -> Self {
        self.cfg.prune = prune;
        self
    }

    /// Set the pruning margin.
    /// * `prune_margin` - Tolerated increase of the error rate when a subtree is
    ///   replaced by a leaf. Larger values give smaller trees.
    pub fn set_prune_margin(mut self, prune_margin: f64) -> Self {
        self.cfg.prune_margin = prune_margin;
        self
    }

    /// Fit a tree on coded training data.
    ///
    /// * `attributes` - Input attributes, one per column of `inputs`.
    /// * `class_count` - Number of output classes.
    /// * `inputs` - Coded inputs.
    /// * `outputs` - Coded outputs.
    pub fn fit(
        &self,
        attributes: &[DecisionVariable],
        class_count: usize,
        inputs: &Matrix<u16>,
        outputs: &[u16],
    ) -> Result<DecisionTree, RulesheetError> {
        self.cfg.validate()?;
        let tree = match self.cfg.criterion {
            Criterion::ID3 => DecisionTree::fit(
                attributes,
                class_count,
                inputs,
                outputs,
                &InformationGainSplitter,
                self.cfg.min_samples_split,
                self.cfg.max_depth,
            )?,
            Criterion::C45 => {
                let mut tree = DecisionTree::fit(
                    attributes,
                    class_count,
                    inputs,
                    outputs,
                    &GainRatioSplitter,
                    self.cfg.min_samples_split,
                    self.cfg.max_depth,
                )?;
                if self.cfg.prune {
                    tree.prune(inputs, outputs, self.cfg.prune_margin)?;
                }
                tree
            }
        };
        info!(
            "{} tree fitted on {} rows: n_nodes: {}, n_leaves: {}, depth: {}",
            self.cfg.criterion,
            inputs.rows,
            tree.nodes.len(),
            tree.n_leaves,
            tree.depth
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    // XOR of the first two attributes, the third one is noise.
    fn xor() -> (Vec<DecisionVariable>, Vec<u16>, Vec<u16>) {
        let a = [0, 0, 1, 1, 0, 0, 1, 1];
        let b = [0, 1, 0, 1, 0, 1, 0, 1];
        let c = [0, 0, 0, 0, 1, 1, 1, 1];
        let y = a.iter().zip(b.iter()).map(|(a, b)| a ^ b).collect();
        let attributes = vec![
            DecisionVariable::new("a", 2),
            DecisionVariable::new("b", 2),
            DecisionVariable::new("c", 2),
        ];
        (attributes, [a, b, c].concat(), y)
    }

    #[test]
    fn test_builder_grows_pure_leaves_on_zero_gain() {
        let (attributes, data, y) = xor();
        let inputs = Matrix::new(&data, 8, 3);
        let tree = TreeBuilder::default()
            .set_criterion(Criterion::ID3)
            .fit(&attributes, 2, &inputs, &y)
            .unwrap();
        // Every attribute has zero gain at the root, the lowest index wins.
        assert!(matches!(tree.nodes[&0].kind, NodeKind::Split { attribute: 0, .. }));
        assert_eq!(tree.predict(&inputs).unwrap(), y);
        assert_eq!(tree.n_leaves, 4);
    }

    #[test]
    fn test_builder_setters() {
        let builder = TreeBuilder::default()
            .set_criterion(Criterion::ID3)
            .set_min_samples_split(4)
            .set_max_depth(Some(3))
            .set_prune(false)
            .set_prune_margin(0.2);
        assert_eq!(
            builder.cfg,
            TreeConfig {
                criterion: Criterion::ID3,
                min_samples_split: 4,
                max_depth: Some(3),
                prune: false,
                prune_margin: 0.2,
            }
        );
    }

    #[test]
    fn test_builder_prunes_c45() {
        let (attributes, data, y) = xor();
        let inputs = Matrix::new(&data, 8, 3);
        let pruned = TreeBuilder::default()
            .set_prune_margin(1.0)
            .fit(&attributes, 2, &inputs, &y)
            .unwrap();
        assert_eq!(pruned.nodes.len(), 1);

        let unpruned = TreeBuilder::default()
            .set_prune(false)
            .set_prune_margin(1.0)
            .fit(&attributes, 2, &inputs, &y)
            .unwrap();
        assert_eq!(unpruned.predict(&inputs).unwrap(), y);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let (attributes, data, y) = xor();
        let inputs = Matrix::new(&data, 8, 3);
        assert!(matches!(
            TreeBuilder::default()
                .set_prune_margin(2.0)
                .fit(&attributes, 2, &inputs, &y),
            Err(RulesheetError::InvalidParameter(_, _, _))
        ));
    }
}
