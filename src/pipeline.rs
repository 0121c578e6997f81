//! Pipeline
//!
//! [`RuleInducer`] runs the whole chain on a raw table: codification, tree
//! induction, rule extraction and decoding. The resulting [`InducedRules`] can
//! be exported to any [`RulesheetSink`].
use crate::builder::TreeBuilder;
use crate::codec::Codebook;
use crate::config::{Config, SinkConfig, TreeConfig};
use crate::data::{Matrix, Table};
use crate::errors::RulesheetError;
use crate::rules::{decode_rules, DecodedRule, Rule};
use crate::sink::{export_rules, open_sink, RulesheetSink};
use crate::tree::DecisionTree;
use crate::utils::singularize;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Default)]
pub struct RuleInducer {
    pub cfg: Config,
}

impl RuleInducer {
    pub fn new(cfg: Config) -> Self {
        RuleInducer { cfg }
    }

    /// Set the output column, `None` uses the last column of the table.
    pub fn set_output(mut self, output: Option<String>) -> Self {
        self.cfg.output = output;
        self
    }

    /// Set the entity name, `None` derives it from the table name.
    pub fn set_entity(mut self, entity: Option<String>) -> Self {
        self.cfg.sink.entity = entity;
        self
    }

    /// Set the tree induction settings.
    pub fn set_tree_config(mut self, tree: TreeConfig) -> Self {
        self.cfg.tree = tree;
        self
    }

    /// Induce decoded rules from a raw table.
    ///
    /// Input columns holding a single value carry no information and are
    /// dropped with a warning. At least one input column must remain.
    pub fn induce(&self, table: &Table) -> Result<InducedRules, RulesheetError> {
        table.validate()?;
        let output = match &self.cfg.output {
            Some(o) => {
                table.column_index(o)?;
                o.as_str()
            }
            None => table.output_column()?,
        };
        let inputs = table.input_columns(output)?;

        let mut columns = inputs.clone();
        columns.push(output);
        let codebook = Codebook::fit(table, &columns)?;

        let mut attribute_names = Vec::with_capacity(inputs.len());
        for name in inputs {
            if codebook.arity(name)? <= 1 {
                warn!("column {} of {} holds a single value, dropping it", name, table.name);
            } else {
                attribute_names.push(name);
            }
        }
        if attribute_names.is_empty() {
            return Err(RulesheetError::NoAttributes);
        }

        let coded = codebook.encode(table)?;
        let data = coded.select(&attribute_names)?;
        let outputs = coded.column(output)?;
        let attributes = codebook.decision_variables(&attribute_names)?;
        let class_count = codebook.arity(output)?;

        let matrix = Matrix::new(&data, coded.rows, attribute_names.len());
        let tree = TreeBuilder::new(self.cfg.tree.clone()).fit(&attributes, class_count, &matrix, outputs)?;
        let rules = tree.to_rules()?;
        let decoded = decode_rules(rules.as_slice(), &codebook, &attribute_names, output)?;

        let entity = match &self.cfg.sink.entity {
            Some(e) => e.clone(),
            None => singularize(&table.name),
        };
        let sink = SinkConfig {
            entity: Some(entity.clone()),
            ..self.cfg.sink.clone().with_env_defaults()
        };
        info!(
            "induced {} rules for {}.{} from {} rows of {}",
            decoded.len(),
            entity,
            output,
            table.n_rows(),
            table.name
        );

        Ok(InducedRules {
            codebook,
            attributes: attribute_names.iter().map(|a| a.to_string()).collect(),
            output: output.to_string(),
            entity,
            sink,
            tree,
            rules,
            decoded,
        })
    }
}

/// Everything a run of [`RuleInducer::induce`] produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InducedRules {
    pub codebook: Codebook,
    /// Input columns the tree was grown on, in attribute index order.
    pub attributes: Vec<String>,
    pub output: String,
    pub entity: String,
    /// Sink settings, with the environment and entity filled in.
    pub sink: SinkConfig,
    pub tree: DecisionTree,
    pub rules: Vec<Rule>,
    pub decoded: Vec<DecodedRule>,
}

impl InducedRules {
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.as_str()).collect()
    }

    /// Write the decoded rules into a sink. The rules are left untouched, so a
    /// failed export can be retried against a fresh sink.
    pub fn export<S: RulesheetSink>(&self, sink: &mut S) -> Result<(), RulesheetError> {
        export_rules(sink, &self.entity, &self.attribute_names(), &self.output, &self.decoded)
    }

    /// Open a sink with the run's sink settings and export the rules into it.
    pub fn export_to<S: RulesheetSink>(&self) -> Result<S, RulesheetError> {
        let mut sink = open_sink::<S>(&self.sink)?;
        self.export(&mut sink)?;
        Ok(sink)
    }

    /// Classify a raw row, given as one value per input attribute in attribute order.
    pub fn decide(&self, row: &[&str]) -> Result<&str, RulesheetError> {
        if row.len() != self.attributes.len() {
            return Err(RulesheetError::AttributeCountMismatch(row.len(), self.attributes.len()));
        }
        let coded = self
            .attributes
            .iter()
            .zip(row)
            .map(|(a, v)| self.codebook.code(a, v))
            .collect::<Result<Vec<u16>, RulesheetError>>()?;
        let class = self.tree.decide(&coded)?;
        self.codebook.decode(&self.output, class)
    }
}

impl fmt::Display for InducedRules {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, rule) in self.decoded.iter().enumerate() {
            writeln!(f, "{}: {}", i + 1, rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MatrixId, MemorySink};
    use crate::splitter::Criterion;

    fn applicants() -> Table {
        let mut table = Table::new("Applicants", &["Age", "Skydiver", "Weight", "Gender", "Risk"]);
        for row in [
            ["young", "yes", "heavy", "male", "high"],
            ["young", "yes", "light", "female", "high"],
            ["old", "yes", "heavy", "male", "high"],
            ["old", "yes", "light", "female", "high"],
            ["young", "no", "light", "female", "low"],
            ["young", "no", "heavy", "female", "medium"],
            ["young", "no", "heavy", "male", "medium"],
            ["old", "no", "light", "male", "medium"],
            ["old", "no", "heavy", "female", "medium"],
        ] {
            table.push_row(&row).unwrap();
        }
        table
    }

    #[test]
    fn test_induce_applicants() {
        for criterion in [Criterion::ID3, Criterion::C45] {
            let inducer = RuleInducer::default().set_tree_config(TreeConfig {
                criterion,
                ..Default::default()
            });
            let induced = inducer.induce(&applicants()).unwrap();
            assert_eq!(induced.entity, "Applicant");
            assert_eq!(induced.output, "Risk");
            assert_eq!(induced.decoded.len(), 4);
            assert_eq!(induced.decoded[0].to_string(), "IF Skydiver='yes' THEN Risk='high'");
            assert_eq!(
                induced.to_string(),
                "1: IF Skydiver='yes' THEN Risk='high'\n\
                 2: IF Skydiver='no' AND Weight='heavy' THEN Risk='medium'\n\
                 3: IF Skydiver='no' AND Weight='light' AND Age='young' THEN Risk='low'\n\
                 4: IF Skydiver='no' AND Weight='light' AND Age='old' THEN Risk='medium'\n"
            );
        }
    }

    #[test]
    fn test_induce_and_export() {
        let induced = RuleInducer::default().induce(&applicants()).unwrap();
        let mut sink = MemorySink::new();
        induced.export(&mut sink).unwrap();
        assert_eq!(sink.get(MatrixId::Conditions, 0, 1), Some("Applicant.Skydiver"));
        assert_eq!(sink.get(MatrixId::If, 1, 1), Some("'yes'"));
        assert_eq!(sink.get(MatrixId::If, 3, 0), Some("'young'"));
        assert_eq!(sink.get(MatrixId::Actions, 0, 0), Some("Applicant.Risk"));
        assert_eq!(sink.get(MatrixId::Then, 1, 0), Some("'high'"));
        assert_eq!(sink.get(MatrixId::Then, 4, 0), Some("'medium'"));
        assert!(sink.saved && sink.disposed);
    }

    #[test]
    fn test_export_to_opens_sink_with_config() {
        let inducer = RuleInducer::new(Config {
            sink: SinkConfig {
                rulesheet_path: Some("risk.rules".to_string()),
                vocabulary_path: Some("risk.vocab".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let induced = inducer.induce(&applicants()).unwrap();
        assert_eq!(induced.sink.entity.as_deref(), Some("Applicant"));

        let sink: MemorySink = induced.export_to().unwrap();
        assert_eq!(sink.config.rulesheet_path.as_deref(), Some("risk.rules"));
        assert_eq!(sink.config.vocabulary_path.as_deref(), Some("risk.vocab"));
        assert_eq!(sink.config.entity.as_deref(), Some("Applicant"));
        assert_eq!(sink.get(MatrixId::Actions, 0, 0), Some("Applicant.Risk"));
        assert!(sink.saved && sink.disposed);
    }

    #[test]
    fn test_induce_drops_constant_columns() {
        let mut table = Table::new("Policies", &["Region", "Smoker", "Premium"]);
        for row in [
            ["north", "yes", "high"],
            ["north", "no", "low"],
            ["north", "yes", "high"],
        ] {
            table.push_row(&row).unwrap();
        }
        let induced = RuleInducer::default().induce(&table).unwrap();
        assert_eq!(induced.attributes, vec!["Smoker".to_string()]);
        assert_eq!(induced.entity, "Policy");
        assert_eq!(induced.decoded[0].to_string(), "IF Smoker='yes' THEN Premium='high'");
        assert_eq!(induced.decoded[0].antecedents[0].index, 0);

        let mut constant = Table::new("Policies", &["Region", "Premium"]);
        constant.push_row(&["north", "high"]).unwrap();
        constant.push_row(&["north", "low"]).unwrap();
        assert!(matches!(
            RuleInducer::default().induce(&constant),
            Err(RulesheetError::NoAttributes)
        ));
    }

    #[test]
    fn test_induce_named_output_and_entity() {
        let inducer = RuleInducer::new(Config {
            sink: SinkConfig {
                entity: Some("Person".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .set_output(Some("Skydiver".to_string()));
        let induced = inducer.induce(&applicants()).unwrap();
        assert_eq!(induced.entity, "Person");
        assert_eq!(induced.attribute_names(), vec!["Age", "Weight", "Gender", "Risk"]);
        // Risk alone separates skydivers from the rest.
        assert_eq!(induced.decoded[0].to_string(), "IF Risk='high' THEN Skydiver='yes'");

        assert!(matches!(
            RuleInducer::default()
                .set_output(Some("Income".to_string()))
                .induce(&applicants()),
            Err(RulesheetError::MissingColumn(_, _))
        ));
    }

    #[test]
    fn test_induced_rules_decide() {
        let induced = RuleInducer::default().induce(&applicants()).unwrap();
        assert_eq!(induced.decide(&["old", "no", "light", "female"]).unwrap(), "medium");
        assert_eq!(induced.decide(&["young", "yes", "light", "male"]).unwrap(), "high");
        assert!(matches!(
            induced.decide(&["middle", "no", "light", "male"]),
            Err(RulesheetError::UnknownCategory { ref column, ref value }) if column == "Age" && value == "middle"
        ));
        assert!(matches!(
            induced.decide(&["old"]),
            Err(RulesheetError::AttributeCountMismatch(1, 4))
        ));
    }

    #[test]
    fn test_induce_rejects_bad_tables() {
        let empty = Table::new("Applicants", &["Age", "Risk"]);
        assert!(matches!(
            RuleInducer::default().induce(&empty),
            Err(RulesheetError::EmptyTable(_, _))
        ));
        let narrow = Table::new("Applicants", &["Risk"]);
        assert!(matches!(
            RuleInducer::default().induce(&narrow),
            Err(RulesheetError::TooFewColumns(_, 1))
        ));
    }
}
