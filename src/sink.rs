//! Sink
//!
//! The rulesheet a set of decoded rules is written into. A rulesheet has four
//! cell matrices: the condition headers, the IF matrix with one row per rule,
//! the action headers and the THEN matrix with one row per rule.
use crate::config::SinkConfig;
use crate::errors::RulesheetError;
use crate::rules::DecodedRule;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{self, Display};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatrixId {
    Conditions,
    If,
    Actions,
    Then,
}

impl MatrixId {
    pub const ALL: [MatrixId; 4] = [MatrixId::Conditions, MatrixId::If, MatrixId::Actions, MatrixId::Then];
}

impl Display for MatrixId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatrixId::Conditions => write!(f, "Conditions"),
            MatrixId::If => write!(f, "If"),
            MatrixId::Actions => write!(f, "Actions"),
            MatrixId::Then => write!(f, "Then"),
        }
    }
}

/// A document rules can be written into, one cell at a time.
pub trait RulesheetSink {
    type Error: Display;

    /// Open a sink on the documents a config points to.
    fn open(cfg: &SinkConfig) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn set_cell(&mut self, matrix: MatrixId, row: usize, col: usize, value: &str) -> Result<(), Self::Error>;

    fn save(&mut self) -> Result<(), Self::Error>;

    /// Release whatever the sink holds. Called exactly once per session.
    fn dispose(&mut self);
}

/// Scoped use of a sink, disposed when the session goes out of scope.
pub struct SinkSession<'a, S: RulesheetSink> {
    sink: &'a mut S,
}

impl<'a, S: RulesheetSink> SinkSession<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        SinkSession { sink }
    }

    pub fn set_cell(&mut self, matrix: MatrixId, row: usize, col: usize, value: &str) -> Result<(), RulesheetError> {
        self.sink
            .set_cell(matrix, row, col, value)
            .map_err(|e| RulesheetError::SinkWrite {
                matrix,
                row,
                col,
                reason: e.to_string(),
            })
    }

    pub fn save(&mut self) -> Result<(), RulesheetError> {
        self.sink.save().map_err(|e| RulesheetError::SinkSave(e.to_string()))
    }
}

impl<'a, S: RulesheetSink> Drop for SinkSession<'a, S> {
    fn drop(&mut self) {
        debug!("disposing rulesheet sink");
        self.sink.dispose();
    }
}

/// Write decoded rules into a sink, then save it.
///
/// * `sink` - Sink to write to, disposed before returning, whatever the outcome.
/// * `entity` - Singular name of the entity the rules are about.
/// * `attribute_names` - Input column names, in attribute index order.
/// * `output_name` - Output column name.
/// * `rules` - Rules, written in order to rows `1..=rules.len()`.
pub fn export_rules<S: RulesheetSink>(
    sink: &mut S,
    entity: &str,
    attribute_names: &[&str],
    output_name: &str,
    rules: &[DecodedRule],
) -> Result<(), RulesheetError> {
    let mut session = SinkSession::new(sink);

    for (i, name) in attribute_names.iter().enumerate() {
        session.set_cell(MatrixId::Conditions, 0, i, &format!("{}.{}", entity, name))?;
    }
    for (d, rule) in rules.iter().enumerate() {
        for antecedent in &rule.antecedents {
            if antecedent.index >= attribute_names.len() {
                return Err(RulesheetError::UnknownAttribute(antecedent.index, attribute_names.len()));
            }
            session.set_cell(MatrixId::If, d + 1, antecedent.index, &antecedent.condition())?;
        }
    }
    session.set_cell(MatrixId::Actions, 0, 0, &format!("{}.{}", entity, output_name))?;
    for (d, rule) in rules.iter().enumerate() {
        session.set_cell(MatrixId::Then, d + 1, 0, &rule.action())?;
    }
    session.save()?;

    info!("exported {} rules for {}.{}", rules.len(), entity, output_name);
    Ok(())
}

/// Open a sink from a config, mapping its error.
pub fn open_sink<S: RulesheetSink>(cfg: &SinkConfig) -> Result<S, RulesheetError> {
    debug!(
        "opening rulesheet sink, rulesheet {:?}, vocabulary {:?}",
        cfg.rulesheet_path, cfg.vocabulary_path
    );
    S::open(cfg).map_err(|e| RulesheetError::SinkOpen(e.to_string()))
}

/// A sink keeping every cell in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemorySink {
    /// Settings the sink was opened with.
    pub config: SinkConfig,
    pub cells: BTreeMap<(MatrixId, usize, usize), String>,
    pub saved: bool,
    pub disposed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn get(&self, matrix: MatrixId, row: usize, col: usize) -> Option<&str> {
        self.cells.get(&(matrix, row, col)).map(|s| s.as_str())
    }

    /// Text grid of every non empty matrix, cells separated by ` | `.
    pub fn render(&self) -> String {
        let mut r = String::new();
        for matrix in MatrixId::ALL {
            let cells: Vec<(&(MatrixId, usize, usize), &String)> =
                self.cells.iter().filter(|((m, _, _), _)| *m == matrix).collect();
            if cells.is_empty() {
                continue;
            }
            let rows = cells.iter().map(|((_, i, _), _)| *i).max().unwrap_or(0);
            let cols = cells.iter().map(|((_, _, j), _)| *j).max().unwrap_or(0);
            r += format!("[{}]\n", matrix).as_str();
            for i in 0..=rows {
                let line: Vec<&str> = (0..=cols).map(|j| self.get(matrix, i, j).unwrap_or("")).collect();
                r += format!("{}\n", line.join(" | ")).as_str();
            }
        }
        r
    }
}

impl RulesheetSink for MemorySink {
    type Error = Infallible;

    fn open(cfg: &SinkConfig) -> Result<Self, Self::Error> {
        Ok(MemorySink {
            config: cfg.clone(),
            ..Default::default()
        })
    }

    fn set_cell(&mut self, matrix: MatrixId, row: usize, col: usize, value: &str) -> Result<(), Self::Error> {
        self.cells.insert((matrix, row, col), value.to_string());
        Ok(())
    }

    fn save(&mut self) -> Result<(), Self::Error> {
        self.saved = true;
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
