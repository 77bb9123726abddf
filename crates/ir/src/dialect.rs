// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module defines the Transact-SQL dialects the engine understands and the
//! syntax features that vary between them.
//!
//! ## Dialects
//!
//! - **SQL Server**: the on-premises engine, supports every extension
//! - **Azure SQL Database**: single-database service; cross-database names are
//!   not resolvable
//! - **Azure Synapse**: dedicated SQL pools; no change tracking, no `APPLY`
//!
//! ## Dialect Extensions
//!
//! - `ChangeTracking`: `CHANGETABLE(CHANGES ...)` row sources
//! - `Apply`: `CROSS APPLY` / `OUTER APPLY` lateral joins
//! - `CrossDatabaseNames`: three-part `database.schema.object` names
//! - `TempTables`: `#temp` session tables
//! - `TableVariables`: `DECLARE @t TABLE (...)`

use serde::{Deserialize, Serialize};

/// Supported T-SQL dialects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Dialect {
    /// Microsoft SQL Server (2016+)
    #[default]
    SqlServer,
    /// Azure SQL Database
    AzureSql,
    /// Azure Synapse dedicated SQL pool
    AzureSynapse,
}

impl Dialect {
    /// Check if this dialect supports a specific extension
    pub fn supports(&self, ext: DialectExtensions) -> bool {
        match self {
            Dialect::SqlServer => true,
            Dialect::AzureSql => ext != DialectExtensions::CrossDatabaseNames,
            Dialect::AzureSynapse => matches!(
                ext,
                DialectExtensions::TempTables | DialectExtensions::CrossDatabaseNames
            ),
        }
    }

    /// Stable lower-case name, used by configuration files and templates
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::SqlServer => "sql_server",
            Dialect::AzureSql => "azure_sql",
            Dialect::AzureSynapse => "azure_synapse",
        }
    }
}

/// Dialect-specific extensions and features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DialectExtensions {
    /// `CHANGETABLE(CHANGES table, version)`
    ChangeTracking,

    /// `CROSS APPLY` / `OUTER APPLY`
    Apply,

    /// Three-part names that reach into another database
    CrossDatabaseNames,

    /// `#temp` tables
    TempTables,

    /// `DECLARE @t TABLE (...)`
    TableVariables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_server_supports_everything() {
        for ext in [
            DialectExtensions::ChangeTracking,
            DialectExtensions::Apply,
            DialectExtensions::CrossDatabaseNames,
            DialectExtensions::TempTables,
            DialectExtensions::TableVariables,
        ] {
            assert!(Dialect::SqlServer.supports(ext));
        }
    }

    #[test]
    fn test_synapse_has_no_change_tracking() {
        assert!(!Dialect::AzureSynapse.supports(DialectExtensions::ChangeTracking));
        assert!(!Dialect::AzureSynapse.supports(DialectExtensions::Apply));
        assert!(Dialect::AzureSynapse.supports(DialectExtensions::TempTables));
    }

    #[test]
    fn test_dialect_serde_names() {
        let json = serde_json::to_string(&Dialect::AzureSql).unwrap();
        assert_eq!(json, "\"azure_sql\"");
        assert_eq!(Dialect::AzureSql.as_str(), "azure_sql");
    }
}
