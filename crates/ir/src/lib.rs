// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # T-SQL Insight - Shared Data Model
//!
//! This crate holds the plain data types every other layer agrees on:
//! - Dialects and their syntax extensions
//! - Multi-part object names with case-insensitive identity
//! - Catalog metadata records (tables, columns, routines, indices,
//!   foreign keys, constraints)

pub mod dialect;
pub mod metadata;
pub mod name;

// Re-export commonly used types
pub use dialect::{Dialect, DialectExtensions};
pub use metadata::{
    ColumnMetadata, ConstraintMetadata, ConstraintType, DataType, ForeignKeyMetadata,
    IndexMetadata, RoutineMetadata, RoutineParameter, RoutineType, TableMetadata, TableType,
};
pub use name::{ObjectKind, ObjectName, QualifiedName};
