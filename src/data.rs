//! Data
//!
//! In-memory containers for the tabular data fed to the rule inducer: the raw
//! string [`Table`] handed over by an external source, and the column-major
//! [`Matrix`] view used over integer-coded values.
use crate::errors::RulesheetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Contiguous Column Major Matrix data container.
///
/// This structure holds a dense matrix of values in a single contiguous memory block,
/// in column-major order, which allows for efficient column slicing.
///
/// # Type Parameters
/// * `T` - The type of the data, `u16` for coded categorical values.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Indices into the data row-wise.
    pub index: Vec<usize>,
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
    stride1: usize,
    stride2: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix {
            data,
            index: (0..rows).collect(),
            rows,
            cols,
            stride1: rows,
            stride2: 1,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.item_index(i, j)]
    }

    fn item_index(&self, i: usize, j: usize) -> usize {
        let mut idx = self.stride2 * i;
        idx += j * self.stride1;
        idx
    }

    /// Get access to a row of the data, as an iterator.
    pub fn get_row_iter(&self, row: usize) -> std::iter::StepBy<std::iter::Skip<std::slice::Iter<'a, T>>> {
        self.data.iter().skip(row).step_by(self.rows)
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        let i = self.item_index(0, col);
        let j = self.item_index(self.rows, col);
        &self.data[i..j]
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        self.get_row_iter(row).copied().collect()
    }
}

impl<'a, T> fmt::Display for Matrix<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut val = String::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                val.push_str(self.get(i, j).to_string().as_str());
                if j == (self.cols - 1) {
                    val.push('\n');
                } else {
                    val.push(' ');
                }
            }
        }
        write!(f, "{}", val)
    }
}

/// A named, rectangular table of string cells.
///
/// This is the shape every external tabular source (spreadsheet reader, csv file, ...)
/// must hand over. The last column is the output unless told otherwise.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Table {
    /// Name of the table, usually the plural of the entity the rows describe.
    pub name: String,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Ordered rows, each with one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<S: Into<String>>(name: S, columns: &[&str]) -> Self {
        Table {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, checking it has one cell per column.
    pub fn push_row(&mut self, row: &[&str]) -> Result<(), RulesheetError> {
        if row.len() != self.columns.len() {
            return Err(RulesheetError::RaggedRow(self.rows.len(), row.len(), self.columns.len()));
        }
        self.rows.push(row.iter().map(|c| c.to_string()).collect());
        Ok(())
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize, RulesheetError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RulesheetError::MissingColumn(name.to_string(), self.name.clone()))
    }

    /// Default output column, the last one.
    pub fn output_column(&self) -> Result<&str, RulesheetError> {
        self.validate()?;
        Ok(self.columns[self.columns.len() - 1].as_str())
    }

    /// Every column but the given output, in table order.
    pub fn input_columns(&self, output: &str) -> Result<Vec<&str>, RulesheetError> {
        self.column_index(output)?;
        Ok(self
            .columns
            .iter()
            .filter(|c| c.as_str() != output)
            .map(|c| c.as_str())
            .collect())
    }

    /// Check the table satisfies the tabular source contract: at least one input and
    /// an output column, at least one row, and every row as wide as the header.
    pub fn validate(&self) -> Result<(), RulesheetError> {
        if self.columns.len() < 2 {
            return Err(RulesheetError::TooFewColumns(self.name.clone(), self.columns.len()));
        }
        if self.rows.is_empty() {
            return Err(RulesheetError::EmptyTable(self.name.clone(), self.columns[0].clone()));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(RulesheetError::RaggedRow(i, row.len(), self.columns.len()));
            }
        }
        Ok(())
    }

    /// Read a table from csv data with a header row.
    ///
    /// * `name` - Name of the table.
    /// * `reader` - Source of the csv data.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> Result<Self, RulesheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| RulesheetError::UnableToRead(e.to_string()))?
            .clone();
        let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| RulesheetError::UnableToRead(e.to_string()))?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        let table = Table {
            name: name.to_string(),
            columns,
            rows,
        };
        table.validate()?;
        Ok(table)
    }

    /// Read a table from a csv file, the table is named after the file stem.
    ///
    /// * `path` - Path of the csv file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesheetError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = match File::open(path) {
            Ok(f) => Ok(f),
            Err(e) => Err(RulesheetError::UnableToRead(format!("{}: {}", path.display(), e))),
        }?;
        Self::from_csv_reader(&name, BufReader::new(file))
    }
}

/// A table whose cells were replaced by codes from a codebook.
///
/// The data is stored column-major, in the column order of the codebook
/// that produced it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CodedTable {
    /// Coded column names, in codebook order.
    pub columns: Vec<String>,
    /// Column-major codes.
    pub data: Vec<u16>,
    /// Number of rows.
    pub rows: usize,
}

impl CodedTable {
    /// Position of a coded column by name.
    pub fn column_index(&self, name: &str) -> Result<usize, RulesheetError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RulesheetError::UnknownColumn(name.to_string()))
    }

    /// Codes of a single column.
    pub fn column(&self, name: &str) -> Result<&[u16], RulesheetError> {
        let col = self.column_index(name)?;
        Ok(&self.data[col * self.rows..(col + 1) * self.rows])
    }

    /// A matrix view over the whole coded table.
    pub fn matrix(&self) -> Matrix<'_, u16> {
        Matrix::new(&self.data, self.rows, self.columns.len())
    }

    /// Gather the given columns, in the given order, into a new column-major buffer.
    pub fn select(&self, names: &[&str]) -> Result<Vec<u16>, RulesheetError> {
        let mut data = Vec::with_capacity(names.len() * self.rows);
        for name in names {
            data.extend_from_slice(self.column(name)?);
        }
        Ok(data)
    }
}
