use super::tree::DecisionTree;
use crate::constants::ROOT_NODE;
use crate::data::Matrix;
use crate::errors::RulesheetError;
use crate::node::{Node, NodeKind};

impl DecisionTree {
    /// Follow a coded row from the root down to the leaf it lands in.
    ///
    /// * `row` - One code per attribute, in attribute order.
    pub fn leaf_for(&self, row: &[u16]) -> Result<&Node, RulesheetError> {
        let mut path = vec![ROOT_NODE];
        let mut node = self.root()?;
        loop {
            let attribute = match &node.kind {
                NodeKind::Leaf { .. } => return Ok(node),
                NodeKind::Split { attribute, .. } => *attribute,
            };
            let value = *row
                .get(attribute)
                .ok_or(RulesheetError::UnknownAttribute(attribute, row.len()))?;
            let child_idx = node.get_child_idx(value).ok_or_else(|| {
                let variable = self.attributes.get(attribute);
                RulesheetError::InputOutOfRange {
                    row: 0,
                    attribute: variable.map(|v| v.name.clone()).unwrap_or_default(),
                    value,
                    arity: variable.map_or(0, |v| v.arity),
                }
            })?;
            path.push(child_idx);
            node = self.node(child_idx, &path)?;
        }
    }

    /// Predicted class of a single coded row.
    pub fn decide(&self, row: &[u16]) -> Result<u16, RulesheetError> {
        let node = self.leaf_for(row)?;
        match node.kind {
            NodeKind::Leaf { class } => Ok(class),
            NodeKind::Split { .. } => Err(RulesheetError::UnreachableNode(node.num, "leaf".to_string())),
        }
    }

    /// Predicted class of every row of a coded matrix.
    pub fn predict(&self, data: &Matrix<u16>) -> Result<Vec<u16>, RulesheetError> {
        if data.cols != self.attributes.len() {
            return Err(RulesheetError::AttributeCountMismatch(data.cols, self.attributes.len()));
        }
        (0..data.rows)
            .map(|i| {
                self.decide(&data.get_row(i)).map_err(|e| match e {
                    RulesheetError::InputOutOfRange {
                        attribute, value, arity, ..
                    } => RulesheetError::InputOutOfRange {
                        row: i,
                        attribute,
                        value,
                        arity,
                    },
                    e => e,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codebook;
    use crate::data::Table;
    use crate::splitter::InformationGainSplitter;
    use crate::tree::DecisionVariable;

    fn tennis() -> (Codebook, DecisionTree, Vec<u16>, Vec<u16>) {
        let table = Table::from_csv_path("resources/play_tennis.csv").unwrap();
        let names = ["Outlook", "Temperature", "Humidity", "Wind"];
        let mut columns = names.to_vec();
        columns.push("PlayTennis");
        let codebook = Codebook::fit(&table, &columns).unwrap();
        let coded = codebook.encode(&table).unwrap();
        let data = coded.select(&names).unwrap();
        let y = coded.column("PlayTennis").unwrap().to_vec();
        let attributes = codebook.decision_variables(&names).unwrap();
        let inputs = Matrix::new(&data, y.len(), names.len());
        let tree = DecisionTree::fit(&attributes, 2, &inputs, &y, &InformationGainSplitter, 2, None).unwrap();
        (codebook, tree, data, y)
    }

    #[test]
    fn test_predict_training_data() {
        let (_, tree, data, y) = tennis();
        let inputs = Matrix::new(&data, y.len(), 4);
        assert_eq!(tree.predict(&inputs).unwrap(), y);
    }

    #[test]
    fn test_decide_unseen_row() {
        let (codebook, tree, _, _) = tennis();
        let row = vec![
            codebook.code("Outlook", "rain").unwrap(),
            codebook.code("Temperature", "hot").unwrap(),
            codebook.code("Humidity", "high").unwrap(),
            codebook.code("Wind", "strong").unwrap(),
        ];
        assert_eq!(tree.decide(&row).unwrap(), codebook.code("PlayTennis", "no").unwrap());
        assert_eq!(tree.leaf_for(&row).unwrap().num, 7);
    }

    #[test]
    fn test_decide_errors() {
        let (_, tree, _, _) = tennis();
        assert!(matches!(
            tree.decide(&[0]),
            Err(RulesheetError::UnknownAttribute(2, 1))
        ));
        assert!(matches!(
            tree.decide(&[5, 0, 0, 0]),
            Err(RulesheetError::InputOutOfRange { value: 5, arity: 3, .. })
        ));

        let bad = vec![0, 0, 0, 1, 0, 2, 0, 0];
        let inputs = Matrix::new(&bad, 2, 4);
        assert!(matches!(
            tree.predict(&inputs),
            Err(RulesheetError::InputOutOfRange { row: 1, value: 2, .. })
        ));

        let mut broken = tree.clone();
        broken.nodes.remove(&4);
        assert!(matches!(
            broken.decide(&[0, 0, 0, 0]),
            Err(RulesheetError::UnreachableNode(4, _))
        ));
    }

    #[test]
    fn test_predict_attribute_count() {
        let tree = DecisionTree {
            attributes: vec![DecisionVariable::new("a", 2)],
            ..tennis().1
        };
        let data = vec![0, 0];
        assert!(matches!(
            tree.predict(&Matrix::new(&data, 1, 2)),
            Err(RulesheetError::AttributeCountMismatch(2, 1))
        ));
    }
}
