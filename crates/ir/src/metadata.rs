// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for database schema information
//!
//! This module defines the types used to represent database schema metadata:
//! tables, columns, routines, indices, foreign keys and constraints.
//!
//! All records deserialize with defaults for optional fields so that static
//! catalogs can be written by hand in JSON or YAML.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SQL Server data types
///
/// Serialized as the type name as written in T-SQL (`"int"`,
/// `"nvarchar(200)"`, `"decimal(10, 2)"`); names that are not recognised
/// deserialize to [`DataType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[non_exhaustive]
pub enum DataType {
    // Exact numerics
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal(Option<(u8, u8)>),
    Money,

    // Approximate numerics
    Float,
    Real,

    // Character strings
    Char(Option<usize>),
    VarChar(Option<usize>),
    NChar(Option<usize>),
    NVarChar(Option<usize>),
    Text,

    // Binary strings
    VarBinary(Option<usize>),

    // Date and time
    Date,
    Time,
    DateTime,
    DateTime2,
    DateTimeOffset,

    // Other
    UniqueIdentifier,
    Xml,
    RowVersion,

    /// Anything else, with the original type name
    Other(String),
}

fn length(f: &mut fmt::Formatter<'_>, name: &str, len: &Option<usize>) -> fmt::Result {
    match len {
        Some(n) => write!(f, "{}({})", name, n),
        None => write!(f, "{}(max)", name),
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bit => f.write_str("bit"),
            DataType::TinyInt => f.write_str("tinyint"),
            DataType::SmallInt => f.write_str("smallint"),
            DataType::Int => f.write_str("int"),
            DataType::BigInt => f.write_str("bigint"),
            DataType::Decimal(Some((p, s))) => write!(f, "decimal({}, {})", p, s),
            DataType::Decimal(None) => f.write_str("decimal"),
            DataType::Money => f.write_str("money"),
            DataType::Float => f.write_str("float"),
            DataType::Real => f.write_str("real"),
            DataType::Char(n) => length(f, "char", n),
            DataType::VarChar(n) => length(f, "varchar", n),
            DataType::NChar(n) => length(f, "nchar", n),
            DataType::NVarChar(n) => length(f, "nvarchar", n),
            DataType::Text => f.write_str("text"),
            DataType::VarBinary(n) => length(f, "varbinary", n),
            DataType::Date => f.write_str("date"),
            DataType::Time => f.write_str("time"),
            DataType::DateTime => f.write_str("datetime"),
            DataType::DateTime2 => f.write_str("datetime2"),
            DataType::DateTimeOffset => f.write_str("datetimeoffset"),
            DataType::UniqueIdentifier => f.write_str("uniqueidentifier"),
            DataType::Xml => f.write_str("xml"),
            DataType::RowVersion => f.write_str("rowversion"),
            DataType::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for DataType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let written = s.trim();
        let lower = written.to_ascii_lowercase();
        let other = || DataType::Other(written.to_string());
        let (name, args) = match lower.split_once('(') {
            Some((name, rest)) => match rest.strip_suffix(')') {
                Some(args) => (name.trim(), Some(args.trim())),
                None => return Ok(other()),
            },
            None => (lower.as_str(), None),
        };

        let data_type = match (name, args) {
            ("bit", None) => DataType::Bit,
            ("tinyint", None) => DataType::TinyInt,
            ("smallint", None) => DataType::SmallInt,
            ("int", None) => DataType::Int,
            ("bigint", None) => DataType::BigInt,
            ("money", None) => DataType::Money,
            ("float", None) => DataType::Float,
            ("real", None) => DataType::Real,
            ("text", None) => DataType::Text,
            ("date", None) => DataType::Date,
            ("time", None) => DataType::Time,
            ("datetime", None) => DataType::DateTime,
            ("datetime2", None) => DataType::DateTime2,
            ("datetimeoffset", None) => DataType::DateTimeOffset,
            ("uniqueidentifier", None) => DataType::UniqueIdentifier,
            ("xml", None) => DataType::Xml,
            ("rowversion" | "timestamp", None) => DataType::RowVersion,
            ("decimal" | "numeric", None) => DataType::Decimal(None),
            ("decimal" | "numeric", Some(args)) => {
                let mut parts = args.split(',').map(|p| p.trim().parse::<u8>());
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(p)), None, None) => DataType::Decimal(Some((p, 0))),
                    (Some(Ok(p)), Some(Ok(s)), None) => DataType::Decimal(Some((p, s))),
                    _ => other(),
                }
            }
            ("char" | "varchar" | "nchar" | "nvarchar" | "varbinary", args) => {
                let len = match args {
                    // Declared without a length: T-SQL defaults to 1
                    None => Some(1),
                    Some("max") => None,
                    Some(n) => match n.parse() {
                        Ok(n) => Some(n),
                        Err(_) => return Ok(other()),
                    },
                };
                match name {
                    "char" => DataType::Char(len),
                    "varchar" => DataType::VarChar(len),
                    "nchar" => DataType::NChar(len),
                    "nvarchar" => DataType::NVarChar(len),
                    _ => DataType::VarBinary(len),
                }
            }
            _ => other(),
        };
        Ok(data_type)
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(data_type) => data_type,
            Err(never) => match never {},
        }
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.to_string()
    }
}

/// Table type classification
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    #[default]
    Table,
    View,
    System,
    Other(String),
}

/// Metadata for a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether the column is nullable
    #[serde(default)]
    pub nullable: bool,
    /// Whether this is a primary key column
    #[serde(default)]
    pub is_primary_key: bool,
    /// Column description (MS_Description)
    #[serde(default)]
    pub comment: Option<String>,
}

impl ColumnMetadata {
    /// Create a new column metadata with builder pattern
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            is_primary_key: false,
            comment: None,
        }
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: mark as primary key
    pub fn with_primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Metadata for a table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,
    /// Owning schema
    pub schema: String,
    /// Column definitions, in ordinal order
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    /// Table type (TABLE, VIEW, ...)
    #[serde(default)]
    pub table_type: TableType,
    /// Table description
    #[serde(default)]
    pub comment: Option<String>,
}

impl TableMetadata {
    /// Create new table metadata with builder pattern
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            columns: Vec::new(),
            table_type: TableType::Table,
            comment: None,
        }
    }

    /// Builder method: add columns
    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder method: set table type
    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get primary key columns
    pub fn primary_keys(&self) -> Vec<&ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// Whether this entry is a view
    pub fn is_view(&self) -> bool {
        self.table_type == TableType::View
    }
}

/// Routine classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineType {
    #[default]
    Procedure,
    ScalarFunction,
    TableFunction,
}

/// Routine parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineParameter {
    /// Parameter name, including the leading `@`
    pub name: String,
    /// Parameter data type
    pub data_type: DataType,
    /// Whether the parameter is declared OUTPUT
    #[serde(default)]
    pub is_output: bool,
}

impl RoutineParameter {
    /// Create a new input parameter
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_output: false,
        }
    }
}

/// Metadata for a stored procedure or user-defined function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineMetadata {
    /// Routine name
    pub name: String,
    /// Owning schema
    pub schema: String,
    /// Procedure / scalar function / table-valued function
    #[serde(default)]
    pub routine_type: RoutineType,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<RoutineParameter>,
    /// Result columns of a table-valued function
    #[serde(default)]
    pub result_columns: Vec<ColumnMetadata>,
    /// Routine description
    #[serde(default)]
    pub comment: Option<String>,
}

impl RoutineMetadata {
    /// Create new routine metadata with builder pattern
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            routine_type: RoutineType::Procedure,
            parameters: Vec::new(),
            result_columns: Vec::new(),
            comment: None,
        }
    }

    /// Builder method: set routine type
    pub fn with_type(mut self, routine_type: RoutineType) -> Self {
        self.routine_type = routine_type;
        self
    }

    /// Builder method: add parameters
    pub fn with_parameters(mut self, parameters: Vec<RoutineParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builder method: set the result columns of a table-valued function
    pub fn with_result_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.result_columns = columns;
        self
    }

    /// Builder method: set comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether this routine is a function of any kind
    pub fn is_function(&self) -> bool {
        self.routine_type != RoutineType::Procedure
    }

    /// Get routine signature (for display in completion and tooltips)
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                if p.is_output {
                    format!("{} {} OUTPUT", p.name, p.data_type)
                } else {
                    format!("{} {}", p.name, p.data_type)
                }
            })
            .collect();
        format!("{}.{}({})", self.schema, self.name, params.join(", "))
    }
}

/// Metadata for an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Index name
    pub name: String,
    /// Schema of the indexed table
    pub schema: String,
    /// Indexed table
    pub table: String,
    /// Key columns in order
    #[serde(default)]
    pub columns: Vec<String>,
    /// Whether the index is unique
    #[serde(default)]
    pub is_unique: bool,
    /// Whether the index is clustered
    #[serde(default)]
    pub is_clustered: bool,
}

/// Metadata for a foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyMetadata {
    /// Constraint name
    pub name: String,
    /// Schema of the referencing table
    pub schema: String,
    /// Referencing table
    pub table: String,
    /// Referencing columns
    #[serde(default)]
    pub columns: Vec<String>,
    /// Schema of the referenced table
    pub referenced_schema: String,
    /// Referenced table
    pub referenced_table: String,
    /// Referenced columns
    #[serde(default)]
    pub referenced_columns: Vec<String>,
}

/// Constraint classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    PrimaryKey,
    Unique,
    Check,
    Default,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintType::PrimaryKey => "PRIMARY KEY",
            ConstraintType::Unique => "UNIQUE",
            ConstraintType::Check => "CHECK",
            ConstraintType::Default => "DEFAULT",
        })
    }
}

/// Metadata for a table constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintMetadata {
    /// Constraint name
    pub name: String,
    /// Schema of the constrained table
    pub schema: String,
    /// Constrained table
    pub table: String,
    /// Constraint type
    pub constraint_type: ConstraintType,
    /// Definition text (CHECK / DEFAULT expressions)
    #[serde(default)]
    pub definition: Option<String>,
}
