// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Rule identifiers
//!
//! Grammars identify their non-terminals with opaque [`RuleId`] numbers. The
//! [`tsql`] module lists the rules of the T-SQL grammar that the default
//! node-kind table understands; other grammars bring their own table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque grammar rule identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u16);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match tsql::name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "rule#{}", self.0),
        }
    }
}

macro_rules! rule_table {
    ($($name:ident = $id:literal),* $(,)?) => {
        $(pub const $name: RuleId = RuleId($id);)*

        /// All rules of the table, in id order
        pub const ALL: &[RuleId] = &[$($name),*];

        /// Symbolic name of a rule
        pub fn name(rule: RuleId) -> Option<&'static str> {
            match rule.0 {
                $($id => Some(stringify!($name)),)*
                _ => None,
            }
        }
    };
}

/// Rule ids of the T-SQL grammar
pub mod tsql {
    use super::RuleId;

    rule_table! {
        BATCH = 1,
        SQL_CLAUSE = 2,
        SELECT_STATEMENT = 3,
        QUERY_EXPRESSION = 4,
        QUERY_SPECIFICATION = 5,
        SELECT_LIST = 6,
        SELECT_LIST_ELEM = 7,
        COLUMN_ALIAS = 8,
        TABLE_SOURCES = 9,
        TABLE_SOURCE_ITEM = 10,
        JOIN_PART = 11,
        APPLY_PART = 12,
        FULL_TABLE_NAME = 13,
        TABLE_ALIAS = 14,
        TABLE_VARIABLE = 15,
        DERIVED_TABLE = 16,
        SUBQUERY = 17,
        FUNCTION_CALL = 18,
        FUNC_PROC_NAME = 19,
        CHANGE_TABLE = 20,
        SEARCH_CONDITION = 21,
        PREDICATE = 22,
        EXISTS_PREDICATE = 23,
        EXPRESSION = 24,
        FULL_COLUMN_NAME = 25,
        UPDATE_STATEMENT = 26,
        UPDATE_ELEM = 27,
        DELETE_STATEMENT = 28,
        INSERT_STATEMENT = 29,
        DML_TARGET = 30,
        CREATE_TABLE = 31,
        DECLARE_STATEMENT = 32,
        TABLE_TYPE_DEFINITION = 33,
        COLUMN_DEFINITION = 34,
        COLUMN_NAME_LIST = 35,
        EXECUTE_STATEMENT = 36,
        INTO_CLAUSE = 37,
        GROUP_BY_CLAUSE = 38,
        ORDER_BY_CLAUSE = 39,
        ID = 40,
        FROM_CLAUSE = 41,
        WHERE_CLAUSE = 42,
    }
}
