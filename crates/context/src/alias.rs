// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Table aliases visible in a scope

use std::fmt;
use std::hash::{Hash, Hasher};

use tsql_insight_ir::ObjectName;

/// Extra columns every `CHANGETABLE(CHANGES ...)` source exposes
pub const CHANGE_TABLE_COLUMNS: &[&str] = &[
    "SYS_CHANGE_VERSION",
    "SYS_CHANGE_CREATION_VERSION",
    "SYS_CHANGE_OPERATION",
    "SYS_CHANGE_COLUMNS",
    "SYS_CHANGE_CONTEXT",
];

/// What kind of source a [`TableAlias`] stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasKind {
    Table,
    TableFunction,
    TempTable,
    TableVariable,
    Subquery,
    ChangeTable,
}

impl AliasKind {
    /// Whether the source's columns come from the catalog
    pub fn uses_catalog(self) -> bool {
        matches!(
            self,
            AliasKind::Table | AliasKind::TableFunction | AliasKind::ChangeTable
        )
    }

    /// Whether the source is declared in the script itself
    pub fn is_session_local(self) -> bool {
        matches!(self, AliasKind::TempTable | AliasKind::TableVariable)
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AliasKind::Table => "TABLE",
            AliasKind::TableFunction => "TABLE_FUNCTION",
            AliasKind::TempTable => "TEMP_TABLE",
            AliasKind::TableVariable => "TABLE_VARIABLE",
            AliasKind::Subquery => "SUBQUERY",
            AliasKind::ChangeTable => "CHANGE_TABLE",
        };
        f.write_str(s)
    }
}

/// A resolved, possibly aliased table-like source
///
/// Identity is `(alias, object_name, kind)`; `extended_columns` does not
/// take part in equality. Aliases compare case-insensitively.
#[derive(Debug, Clone)]
pub struct TableAlias {
    /// Alias as written, empty when the source is not aliased
    pub alias: String,
    pub object_name: ObjectName,
    pub kind: AliasKind,
    /// Synthetic columns (subquery projections, change-table system columns)
    pub extended_columns: Vec<String>,
}

impl TableAlias {
    pub fn new(alias: impl Into<String>, object_name: ObjectName, kind: AliasKind) -> Self {
        Self {
            alias: alias.into(),
            object_name,
            kind,
            extended_columns: Vec::new(),
        }
    }

    /// Builder method: set the synthetic columns
    pub fn with_extended_columns(mut self, columns: Vec<String>) -> Self {
        self.extended_columns = columns;
        self
    }

    pub fn has_alias(&self) -> bool {
        !self.alias.is_empty()
    }

    /// Whether `qualifier` (as in `q.column`) refers to this source
    ///
    /// An aliased source answers to its alias only; an unaliased one to its
    /// object name.
    pub fn answers_to(&self, qualifier: &str) -> bool {
        if self.has_alias() {
            self.alias.eq_ignore_ascii_case(qualifier)
        } else {
            self.object_name.name.eq_ignore_ascii_case(qualifier)
        }
    }
}

impl PartialEq for TableAlias {
    fn eq(&self, other: &Self) -> bool {
        self.alias.eq_ignore_ascii_case(&other.alias)
            && self.object_name == other.object_name
            && self.kind == other.kind
    }
}

impl Eq for TableAlias {}

impl Hash for TableAlias {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.to_lowercase().hash(state);
        self.object_name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for TableAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_alias() {
            write!(f, "{} -> {} ({})", self.alias, self.object_name, self.kind)
        } else {
            write!(f, "{} ({})", self.object_name, self.kind)
        }
    }
}
