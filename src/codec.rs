//! Codec
//!
//! Reversible codification of categorical string values into dense integer
//! symbols. A [`CodebookBuilder`] observes rows and is frozen into a read-only
//! [`Codebook`], which then encodes tables and decodes single codes.
use crate::constants::MAX_CATEGORIES;
use crate::data::{CodedTable, Table};
use crate::errors::RulesheetError;
use crate::tree::DecisionVariable;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Distinct values of one column, in first-seen order.
/// The code of a value is its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ColumnValues")]
pub struct Column {
    name: String,
    values: Vec<String>,
    #[serde(skip_serializing)]
    lookup: HashMap<String, u16>,
}

#[derive(Deserialize)]
struct ColumnValues {
    name: String,
    values: Vec<String>,
}

impl TryFrom<ColumnValues> for Column {
    type Error = RulesheetError;

    fn try_from(raw: ColumnValues) -> Result<Self, Self::Error> {
        let mut column = Column::empty(raw.name);
        for value in raw.values {
            if column.lookup.contains_key(&value) {
                return Err(RulesheetError::InvalidParameter(
                    format!("values of column {}", column.name),
                    "distinct values".to_string(),
                    format!("duplicate '{}'", value),
                ));
            }
            column.insert(&value)?;
        }
        Ok(column)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.values == other.values
    }
}

impl Column {
    fn empty(name: String) -> Self {
        Column {
            name,
            values: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Get the code for a value, assigning the next free code if unseen.
    fn insert(&mut self, value: &str) -> Result<u16, RulesheetError> {
        if let Some(code) = self.lookup.get(value) {
            return Ok(*code);
        }
        if self.values.len() >= MAX_CATEGORIES {
            return Err(RulesheetError::TooManyCategories(self.name.clone(), MAX_CATEGORIES));
        }
        let code = self.values.len() as u16;
        self.values.push(value.to_string());
        self.lookup.insert(value.to_string(), code);
        Ok(code)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct values, indexed by code.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of distinct values.
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn code(&self, value: &str) -> Option<u16> {
        self.lookup.get(value).copied()
    }

    pub fn value(&self, code: u16) -> Option<&str> {
        self.values.get(code as usize).map(|v| v.as_str())
    }
}

/// Mutable first phase of a codebook. Observe rows, then [`build`](CodebookBuilder::build)
/// the frozen [`Codebook`].
#[derive(Debug)]
pub struct CodebookBuilder {
    table: String,
    columns: Vec<Column>,
    n_observed: usize,
}

impl CodebookBuilder {
    /// * `table` - Name of the table being codified, for error messages.
    /// * `columns` - Names of the columns to codify, in the order rows will be observed.
    pub fn new(table: &str, columns: &[&str]) -> Result<Self, RulesheetError> {
        if columns.is_empty() {
            return Err(RulesheetError::NoColumns);
        }
        Ok(CodebookBuilder {
            table: table.to_string(),
            columns: columns.iter().map(|c| Column::empty(c.to_string())).collect(),
            n_observed: 0,
        })
    }

    /// Record the values of one row, one value per codified column.
    pub fn observe(&mut self, values: &[&str]) -> Result<(), RulesheetError> {
        if values.len() != self.columns.len() {
            return Err(RulesheetError::RaggedRow(self.n_observed, values.len(), self.columns.len()));
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.insert(value)?;
        }
        self.n_observed += 1;
        Ok(())
    }

    /// Freeze the observed values. Fails if no row was observed.
    pub fn build(self) -> Result<Codebook, RulesheetError> {
        if self.n_observed == 0 {
            return Err(RulesheetError::EmptyTable(self.table, self.columns[0].name.clone()));
        }
        Ok(Codebook {
            table: self.table,
            columns: self.columns,
        })
    }
}

/// Frozen, read-only mapping between category strings and codes for a set of columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Codebook {
    table: String,
    columns: Vec<Column>,
}

impl Codebook {
    /// Build a codebook from the named columns of a table.
    ///
    /// * `table` - Training table.
    /// * `columns` - Columns to codify, this order is kept by [`encode`](Codebook::encode).
    pub fn fit(table: &Table, columns: &[&str]) -> Result<Self, RulesheetError> {
        let mut builder = CodebookBuilder::new(&table.name, columns)?;
        let positions = columns
            .iter()
            .map(|c| table.column_index(c))
            .collect::<Result<Vec<usize>, RulesheetError>>()?;

        let mut values = Vec::with_capacity(positions.len());
        for (i, row) in table.rows.iter().enumerate() {
            values.clear();
            for &p in &positions {
                match row.get(p) {
                    Some(v) => values.push(v.as_str()),
                    None => return Err(RulesheetError::RaggedRow(i, row.len(), table.columns.len())),
                }
            }
            builder.observe(&values)?;
        }
        builder.build()
    }

    /// Name of the table the codebook was built from.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&Column, RulesheetError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RulesheetError::UnknownColumn(name.to_string()))
    }

    /// Number of distinct values of a column.
    pub fn arity(&self, name: &str) -> Result<usize, RulesheetError> {
        Ok(self.column(name)?.arity())
    }

    /// Decision variables for the named columns, in the given order.
    pub fn decision_variables(&self, names: &[&str]) -> Result<Vec<DecisionVariable>, RulesheetError> {
        names
            .iter()
            .map(|n| Ok(DecisionVariable::new(n, self.arity(n)?)))
            .collect()
    }

    /// Code of a single value.
    pub fn code(&self, column: &str, value: &str) -> Result<u16, RulesheetError> {
        let col = self.column(column)?;
        col.code(value).ok_or_else(|| RulesheetError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
    }

    /// Translate a code back to the original value.
    pub fn decode(&self, column: &str, code: u16) -> Result<&str, RulesheetError> {
        self.column(column)?
            .value(code)
            .ok_or_else(|| RulesheetError::UnknownCode {
                column: column.to_string(),
                code,
            })
    }

    /// Replace every codified cell of a table by its code.
    /// Any value not seen while building the codebook is an error.
    pub fn encode(&self, table: &Table) -> Result<CodedTable, RulesheetError> {
        let rows = table.n_rows();
        let mut data = Vec::with_capacity(rows * self.columns.len());
        for column in &self.columns {
            let p = table.column_index(&column.name)?;
            for (i, row) in table.rows.iter().enumerate() {
                let value = match row.get(p) {
                    Some(v) => v,
                    None => return Err(RulesheetError::RaggedRow(i, row.len(), table.columns.len())),
                };
                let code = column.code(value).ok_or_else(|| RulesheetError::UnknownValue {
                    column: column.name.clone(),
                    row: i,
                    value: value.clone(),
                })?;
                data.push(code);
            }
        }
        Ok(CodedTable {
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            data,
            rows,
        })
    }

    /// Dump the codebook as a json object.
    pub fn json_dump(&self) -> Result<String, RulesheetError> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(RulesheetError::UnableToWrite(e.to_string())),
        }
    }

    /// Load a codebook from a json string.
    pub fn from_json(json_str: &str) -> Result<Self, RulesheetError> {
        match serde_json::from_str::<Codebook>(json_str) {
            Ok(c) => Ok(c),
            Err(e) => Err(RulesheetError::UnableToRead(e.to_string())),
        }
    }

    /// Save the codebook as json to a file.
    ///
    /// * `path` - Path to save the codebook.
    pub fn save(&self, path: &str) -> Result<(), RulesheetError> {
        let json = self.json_dump()?;
        match fs::write(path, json) {
            Err(e) => Err(RulesheetError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Load a codebook from a json file.
    ///
    /// * `path` - Path to load the codebook from.
    pub fn load(path: &str) -> Result<Self, RulesheetError> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(RulesheetError::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: [&str; 5] = ["Age", "Skydiver", "Weight", "Gender", "Risk"];

    fn applicants() -> Table {
        Table::from_csv_path("resources/applicants.csv").unwrap()
    }

    #[test]
    fn test_codebook_first_seen_order() {
        let table = applicants();
        let codebook = Codebook::fit(&table, &COLUMNS).unwrap();
        assert_eq!(codebook.column("Age").unwrap().values(), &["young", "old"]);
        assert_eq!(codebook.column("Risk").unwrap().values(), &["high", "low", "medium"]);
        assert_eq!(codebook.arity("Gender").unwrap(), 2);
        assert_eq!(codebook.code("Risk", "medium").unwrap(), 2);
        assert_eq!(codebook.decode("Weight", 1).unwrap(), "light");
        assert_eq!(codebook.table(), "applicants");
    }

    #[test]
    fn test_codebook_round_trip() {
        let table = applicants();
        let codebook = Codebook::fit(&table, &COLUMNS).unwrap();
        let coded = codebook.encode(&table).unwrap();
        assert_eq!(coded.rows, 9);
        let matrix = coded.matrix();
        for (i, row) in table.rows.iter().enumerate() {
            for (j, name) in COLUMNS.iter().enumerate() {
                let code = *matrix.get(i, j);
                assert_eq!(codebook.decode(name, code).unwrap(), row[j]);
            }
        }
    }

    #[test]
    fn test_codebook_column_subset_order() {
        let table = applicants();
        let codebook = Codebook::fit(&table, &["Risk", "Age"]).unwrap();
        let coded = codebook.encode(&table).unwrap();
        assert_eq!(coded.columns, vec!["Risk", "Age"]);
        assert_eq!(coded.column("Age").unwrap(), &[0, 0, 1, 1, 0, 0, 0, 1, 1]);
        assert_eq!(coded.select(&["Age"]).unwrap(), vec![0, 0, 1, 1, 0, 0, 0, 1, 1]);
        let vars = codebook.decision_variables(&["Age"]).unwrap();
        assert_eq!(vars[0].name, "Age");
        assert_eq!(vars[0].arity, 2);
    }

    #[test]
    fn test_codebook_schema_errors() {
        let table = applicants();
        assert!(matches!(
            Codebook::fit(&table, &["Age", "Height"]),
            Err(RulesheetError::MissingColumn(c, _)) if c == "Height"
        ));
        assert!(matches!(Codebook::fit(&table, &[]), Err(RulesheetError::NoColumns)));

        let empty = Table::new("Applicants", &["Age", "Risk"]);
        assert!(matches!(
            Codebook::fit(&empty, &["Age", "Risk"]),
            Err(RulesheetError::EmptyTable(_, _))
        ));
    }

    #[test]
    fn test_codebook_unknown_value_and_code() {
        let table = applicants();
        let codebook = Codebook::fit(&table, &COLUMNS).unwrap();

        let mut other = Table::new("Applicants", &COLUMNS);
        other.push_row(&["young", "yes", "heavy", "male", "high"]).unwrap();
        other.push_row(&["middle", "yes", "heavy", "male", "high"]).unwrap();
        match codebook.encode(&other) {
            Err(RulesheetError::UnknownValue { column, row, value }) => {
                assert_eq!(column, "Age");
                assert_eq!(row, 1);
                assert_eq!(value, "middle");
            }
            _ => panic!("expected an unknown value error"),
        }
        match codebook.code("Age", "middle") {
            Err(RulesheetError::UnknownCategory { column, value }) => {
                assert_eq!(column, "Age");
                assert_eq!(value, "middle");
            }
            _ => panic!("expected an unknown category error"),
        }
        assert!(matches!(
            codebook.code("Height", "tall"),
            Err(RulesheetError::UnknownColumn(_))
        ));

        assert!(matches!(
            codebook.decode("Age", 2),
            Err(RulesheetError::UnknownCode { code: 2, .. })
        ));
        assert!(matches!(
            codebook.decode("Height", 0),
            Err(RulesheetError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_builder_two_phase() {
        let mut builder = CodebookBuilder::new("Pets", &["Kind", "Sound"]).unwrap();
        builder.observe(&["dog", "woof"]).unwrap();
        builder.observe(&["cat", "meow"]).unwrap();
        builder.observe(&["dog", "woof"]).unwrap();
        assert!(matches!(
            builder.observe(&["dog"]),
            Err(RulesheetError::RaggedRow(3, 1, 2))
        ));
        let codebook = builder.build().unwrap();
        assert_eq!(codebook.column("Kind").unwrap().values(), &["dog", "cat"]);

        let builder = CodebookBuilder::new("Pets", &["Kind"]).unwrap();
        assert!(matches!(builder.build(), Err(RulesheetError::EmptyTable(_, _))));
    }

    #[test]
    fn test_codebook_json() {
        let table = applicants();
        let codebook = Codebook::fit(&table, &COLUMNS).unwrap();
        let json = codebook.json_dump().unwrap();
        assert_eq!(json, codebook.json_dump().unwrap());
        let loaded = Codebook::from_json(&json).unwrap();
        assert_eq!(loaded, codebook);
        assert_eq!(loaded.code("Skydiver", "no").unwrap(), 1);

        let duplicated = r#"{"table":"t","columns":[{"name":"a","values":["x","x"]}]}"#;
        assert!(Codebook::from_json(duplicated).is_err());
    }
}
