// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalogs for testing
//!
//! [`MockCatalogBuilder`] assembles a [`StaticCatalog`] with a fluent API and
//! ships a standard `Sales` schema used across the workspace tests.
//! [`UnavailableCatalog`] models a provider whose metadata is still loading.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tsql_insight_catalog::{
    CatalogLookup, CatalogProvider, ConnectionContext, DatabaseCatalog, StaticCatalog,
};
use tsql_insight_ir::{
    ColumnMetadata, ConstraintMetadata, ConstraintType, DataType, ForeignKeyMetadata,
    IndexMetadata, RoutineMetadata, RoutineParameter, RoutineType, TableMetadata, TableType,
};

/// Name of the database created by [`MockCatalogBuilder::with_standard_schema`]
pub const STANDARD_DATABASE: &str = "Sales";

/// Builder for creating mock catalogs with a fluent API
#[derive(Debug, Default)]
pub struct MockCatalogBuilder {
    databases: Vec<DatabaseCatalog>,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the standard test schema
    ///
    /// `Sales` holds `dbo.Orders`, `dbo.Customers`, `dbo.Table1`, the view
    /// `dbo.ActiveOrders`, `archive.Orders` and three routines; `Hr` holds
    /// `dbo.Employees`.
    pub fn with_standard_schema(mut self) -> Self {
        self.databases.push(standard_sales());
        self.databases.push(DatabaseCatalog::new("Hr").with_table(
            TableMetadata::new("Employees", "dbo").with_columns(vec![
                ColumnMetadata::new("Id", DataType::Int).with_primary_key(),
                ColumnMetadata::new("Name", DataType::NVarChar(Some(100))),
            ]),
        ));
        self
    }

    /// Add a custom database
    pub fn with_database(mut self, database: DatabaseCatalog) -> Self {
        self.databases.push(database);
        self
    }

    /// Add a table to a database, creating the database if needed
    pub fn with_table(mut self, database: &str, table: TableMetadata) -> Self {
        match self
            .databases
            .iter_mut()
            .find(|db| db.name.eq_ignore_ascii_case(database))
        {
            Some(db) => db.tables.push(table),
            None => self
                .databases
                .push(DatabaseCatalog::new(database).with_table(table)),
        }
        self
    }

    /// Build the static catalog
    pub fn build(self) -> StaticCatalog {
        self.databases
            .into_iter()
            .fold(StaticCatalog::new(), |catalog, db| catalog.with_database(db))
    }
}

fn standard_sales() -> DatabaseCatalog {
    DatabaseCatalog::new(STANDARD_DATABASE)
        .with_table(
            TableMetadata::new("Orders", "dbo")
                .with_columns(vec![
                    ColumnMetadata::new("Id", DataType::Int).with_primary_key(),
                    ColumnMetadata::new("CustomerId", DataType::Int),
                    ColumnMetadata::new("OrderDate", DataType::DateTime2),
                    ColumnMetadata::new("Total", DataType::Decimal(Some((10, 2))))
                        .with_nullable(true),
                    ColumnMetadata::new("Status", DataType::NVarChar(Some(20))),
                ])
                .with_comment("Customer orders"),
        )
        .with_table(
            TableMetadata::new("Customers", "dbo").with_columns(vec![
                ColumnMetadata::new("Id", DataType::Int).with_primary_key(),
                ColumnMetadata::new("Name", DataType::NVarChar(Some(100))),
                ColumnMetadata::new("Email", DataType::NVarChar(Some(200))).with_nullable(true),
            ]),
        )
        .with_table(
            TableMetadata::new("Table1", "dbo").with_columns(vec![
                ColumnMetadata::new("Id", DataType::Int).with_primary_key(),
                ColumnMetadata::new("x", DataType::Int),
                ColumnMetadata::new("y", DataType::NVarChar(Some(50))),
            ]),
        )
        .with_table(
            TableMetadata::new("ActiveOrders", "dbo")
                .with_columns(vec![
                    ColumnMetadata::new("Id", DataType::Int),
                    ColumnMetadata::new("CustomerId", DataType::Int),
                ])
                .with_type(TableType::View),
        )
        .with_table(
            TableMetadata::new("Orders", "archive").with_columns(vec![
                ColumnMetadata::new("Id", DataType::Int).with_primary_key(),
                ColumnMetadata::new("ArchivedAt", DataType::DateTime2),
            ]),
        )
        .with_routine(
            RoutineMetadata::new("GetOrders", "dbo")
                .with_parameters(vec![RoutineParameter::new("@CustomerId", DataType::Int)])
                .with_comment("Orders of one customer"),
        )
        .with_routine(
            RoutineMetadata::new("OrderTotal", "dbo")
                .with_type(RoutineType::ScalarFunction)
                .with_parameters(vec![RoutineParameter::new("@OrderId", DataType::Int)]),
        )
        .with_routine(
            RoutineMetadata::new("OrdersByCustomer", "dbo")
                .with_type(RoutineType::TableFunction)
                .with_parameters(vec![RoutineParameter::new("@CustomerId", DataType::Int)])
                .with_result_columns(vec![
                    ColumnMetadata::new("OrderId", DataType::Int),
                    ColumnMetadata::new("Total", DataType::Decimal(Some((10, 2)))),
                ]),
        )
        .with_index(IndexMetadata {
            name: "PK_Orders".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            columns: vec!["Id".to_string()],
            is_unique: true,
            is_clustered: true,
        })
        .with_index(IndexMetadata {
            name: "IX_Orders_CustomerId".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            columns: vec!["CustomerId".to_string()],
            is_unique: false,
            is_clustered: false,
        })
        .with_foreign_key(ForeignKeyMetadata {
            name: "FK_Orders_Customers".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            columns: vec!["CustomerId".to_string()],
            referenced_schema: "dbo".to_string(),
            referenced_table: "Customers".to_string(),
            referenced_columns: vec!["Id".to_string()],
        })
        .with_constraint(ConstraintMetadata {
            name: "PK_Orders".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            constraint_type: ConstraintType::PrimaryKey,
            definition: None,
        })
        .with_constraint(ConstraintMetadata {
            name: "DF_Orders_Status".to_string(),
            schema: "dbo".to_string(),
            table: "Orders".to_string(),
            constraint_type: ConstraintType::Default,
            definition: Some("('new')".to_string()),
        })
}

/// Standard catalog as a shared provider
pub fn standard_catalog() -> Arc<StaticCatalog> {
    Arc::new(MockCatalogBuilder::new().with_standard_schema().build())
}

/// Provider that answers "unavailable" for every database
///
/// Counts lookups so tests can assert the engine asked.
#[derive(Debug, Default)]
pub struct UnavailableCatalog {
    lookups: AtomicUsize,
}

impl UnavailableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CatalogProvider for UnavailableCatalog {
    fn get_catalog(&self, _connection: &ConnectionContext, _database: &str) -> CatalogLookup {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        CatalogLookup::Unavailable
    }
}
