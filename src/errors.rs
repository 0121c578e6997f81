//! Errors
//!
//! Custom error types used throughout the `rulesheet` crate.
use crate::sink::MatrixId;
use thiserror::Error;

/// Errors that can occur while inducing and exporting rules.
#[derive(Debug, Error)]
pub enum RulesheetError {
    // Schema errors
    /// The table does not have an input and an output column.
    #[error("Table {0} has {1} columns, at least 2 are required (inputs and an output).")]
    TooFewColumns(String, usize),
    /// The table has no data rows.
    #[error("Table {0} has no data rows, column {1} has no codeable values.")]
    EmptyTable(String, String),
    /// A referenced column is not part of the table.
    #[error("Column {0} is not present in table {1}.")]
    MissingColumn(String, String),
    /// A row has a different number of cells than the header.
    #[error("Row {0} has {1} cells, but the table has {2} columns.")]
    RaggedRow(usize, usize, usize),
    /// No columns were requested for codification.
    #[error("No columns were given to build a codebook from.")]
    NoColumns,
    /// More distinct values than a code can hold.
    #[error("Column {0} has more than {1} distinct values.")]
    TooManyCategories(String, usize),

    // Encoding errors
    /// A value was never seen while the codebook was built.
    #[error("Value '{value}' in column {column} at row {row} is not in the codebook.")]
    UnknownValue { column: String, row: usize, value: String },
    /// A single value looked up outside of a table was never seen.
    #[error("Value '{value}' is not in the codebook for column {column}.")]
    UnknownCategory { column: String, value: String },
    /// A code is out of range for a column.
    #[error("Code {code} is out of range for column {column}.")]
    UnknownCode { column: String, code: u16 },
    /// The codebook has no such column.
    #[error("Column {0} is not part of the codebook.")]
    UnknownColumn(String),

    // Induction errors
    /// No input attributes were provided.
    #[error("At least one input attribute is required to fit a tree.")]
    NoAttributes,
    /// An attribute can take at most one value.
    #[error("Attribute {0} has arity {1}, at least 2 values are required to split on it.")]
    ConstantAttribute(String, usize),
    /// No output classes.
    #[error("The output must have at least one class.")]
    NoClasses,
    /// Inputs and outputs have different lengths.
    #[error("Inputs have {0} rows but outputs have {1} labels.")]
    LengthMismatch(usize, usize),
    /// Inputs have a different number of columns than there are attributes.
    #[error("Inputs have {0} columns but {1} attributes were declared.")]
    AttributeCountMismatch(usize, usize),
    /// An input code lies outside its attribute's arity.
    #[error("Input value {value} at row {row} is out of range for attribute {attribute} (arity {arity}).")]
    InputOutOfRange {
        row: usize,
        attribute: String,
        value: u16,
        arity: usize,
    },
    /// An output code lies outside the class count.
    #[error("Output value {value} at row {row} is out of range for {class_count} classes.")]
    OutputOutOfRange { row: usize, value: u16, class_count: usize },
    /// A rule or row refers to an attribute the tree does not know.
    #[error("Attribute index {0} is out of range for {1} attributes.")]
    UnknownAttribute(usize, usize),
    /// No rule fires for a row.
    #[error("No rule covers row {0}.")]
    UncoveredRow(usize),
    /// A node path points at a node that does not exist.
    #[error("Node {0} is missing from the tree, reached via path {1}.")]
    UnreachableNode(usize, String),

    // Sink errors
    /// Writing a single cell to the sink failed.
    #[error("Unable to write cell ({row}, {col}) of the {matrix} matrix: {reason}")]
    SinkWrite {
        matrix: MatrixId,
        row: usize,
        col: usize,
        reason: String,
    },
    /// Saving the rulesheet failed.
    #[error("Unable to save rulesheet: {0}")]
    SinkSave(String),
    /// The sink could not be opened with the given settings.
    #[error("Unable to open rulesheet: {0}")]
    SinkOpen(String),

    /// Unable to write a model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read a model or table from file.
    #[error("Unable to read from file {0}")]
    UnableToRead(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
}
