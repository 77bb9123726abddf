// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample T-SQL documents
//!
//! Queries are written against the standard mock schema
//! ([`crate::MockCatalogBuilder::with_standard_schema`]); `|` marks the caret.

/// Sample SQL queries for testing
pub struct SqlFixtures;

impl SqlFixtures {
    // ===== Scope =====

    /// Caret in the select list of a two-table join
    pub const fn join_select_list() -> &'static str {
        "SELECT | FROM dbo.Orders o JOIN dbo.Customers c ON o.CustomerId = c.Id"
    }

    /// Caret in the ON clause of the second join branch
    pub const fn join_on_clause() -> &'static str {
        "SELECT * FROM dbo.Orders o JOIN dbo.Customers c ON c.| JOIN dbo.Table1 t ON t.Id = o.Id"
    }

    /// Caret after a derived table with an aliased projection
    pub const fn derived_table_where() -> &'static str {
        "SELECT * FROM (SELECT 1 AS x) s WHERE |"
    }

    /// Caret inside an EXISTS subquery correlated to the outer query
    pub const fn exists_correlation() -> &'static str {
        "SELECT * FROM dbo.Orders o WHERE EXISTS (SELECT 1 FROM dbo.Customers c WHERE c.Id = o.|)"
    }

    /// Caret inside a derived table that must not see outer sources
    pub const fn derived_table_isolation() -> &'static str {
        "SELECT * FROM dbo.Orders o JOIN (SELECT * FROM dbo.Customers c WHERE c.|) d ON d.Id = o.Id"
    }

    /// Caret inside an APPLY derived table correlated to the outer query
    pub const fn apply_correlation() -> &'static str {
        "SELECT * FROM dbo.Orders o CROSS APPLY (SELECT * FROM dbo.Customers c WHERE c.Id = o.|) x"
    }

    // ===== Completion =====

    /// Caret after FROM
    pub const fn table_position() -> &'static str {
        "SELECT * FROM |"
    }

    /// Caret after EXEC
    pub const fn routine_position() -> &'static str {
        "EXEC |"
    }

    /// Caret after an alias qualifier in WHERE
    pub const fn qualified_column() -> &'static str {
        "SELECT * FROM dbo.Orders o WHERE o.|"
    }

    /// Change table alias in the select list
    pub const fn change_table() -> &'static str {
        "SELECT | FROM CHANGETABLE(CHANGES dbo.Orders, @last) AS ct"
    }

    // ===== Diagnostics =====

    /// UPDATE through an alias declared in FROM
    pub const fn update_through_alias() -> &'static str {
        "UPDATE t SET x = 1 FROM dbo.Table1 t"
    }

    /// Declared and undeclared temp tables
    pub const fn temp_tables() -> &'static str {
        "CREATE TABLE #t (a int, b int)\nSELECT a FROM #t\nSELECT * FROM #z"
    }

    /// Tautological predicate
    pub const fn tautology() -> &'static str {
        "SELECT * FROM dbo.Orders a WHERE a.x = a.x"
    }

    /// A longer script exercising every statement kind
    pub const fn script() -> &'static str {
        "DECLARE @ids TABLE (Id int)
         CREATE TABLE #recent (OrderId int, Total decimal(10, 2))
         INSERT INTO #recent (OrderId, Total)
         SELECT o.Id, o.Total FROM dbo.Orders o WHERE o.OrderDate > '2024-01-01'
         SELECT r.OrderId, c.Name
         FROM #recent r
         JOIN dbo.Orders o ON o.Id = r.OrderId
         LEFT JOIN dbo.Customers c ON c.Id = o.CustomerId
         WHERE r.Total > 100 AND EXISTS (SELECT 1 FROM @ids i WHERE i.Id = o.Id)
         UPDATE t SET x = t.x + 1 FROM dbo.Table1 t JOIN #recent r ON r.OrderId = t.Id
         DELETE FROM #recent WHERE Total IS NULL
         EXEC dbo.GetOrders @CustomerId = 1"
    }
}
