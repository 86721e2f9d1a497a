//! SlimGen - change-tracking entities and CRUD SQL generation for SQL Server.
//!
//! SlimGen derives entity metadata from plain structs and provides:
//!
//! - Key and computed-column classification with the implicit `Id` convention
//! - Change-tracking surrogates that report which properties were modified
//! - Parameterized INSERT, SELECT, UPDATE and DELETE statements
//! - Row materialization into clean, tracked entities
//! - Table-valued parameters built from slices
//!
//! # Quick Start
//!
//! ```ignore
//! use slimgen::prelude::*;
//!
//! #[derive(Entity, Debug, Default)]
//! #[slimgen(table = "Heroes")]
//! struct Hero {
//!     id: i32,
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! fn example(row: &Row) -> Result<()> {
//!     let generator = MssqlGenerator::<Hero>::new()?;
//!
//!     // Read
//!     let sql = generator.select_sql(Some(10));
//!     assert_eq!(sql, "SELECT TOP (10) [Id], [Name], [Age] FROM [Heroes]");
//!
//!     // Materialize and modify
//!     let mut hero = materialize::<Hero>(row, &TrackingOptions::default())?;
//!     hero.name = "Spider-Man".to_string();
//!
//!     // Only the changed column is written
//!     let sql = generator.update_sql(Some(&hero));
//!     assert_eq!(sql, "UPDATE [Heroes] SET [Name] = @Name WHERE [Id] = @Id;");
//!     Ok(())
//! }
//! ```
//!
//! Statements carry `@Property` placeholders only; values are bound by the
//! caller's database driver.

pub use slimgen_core::{
    ChangeTracking, ColumnInfo, Entity, EntityShape, EntitySource, Error, FieldInfo,
    IMPLICIT_KEY_NAME, Instance, Marker, MarkerSet, PropertyRole, Result, Row, ShapeError,
    ShapeErrorKind, SqlType, Tracked, TrackingOptions, TypeError, TypeInfo, Value, ValueType,
    create_instance, materialize, materialize_all, materialize_scalar, should_track,
};
pub use slimgen_macros::Entity;
pub use slimgen_query::{
    DEFAULT_TEXT_LENGTH, MssqlGenerator, SqlGenerator, TableParameterExt, TableValueParameter,
    TvpBuilder, TvpColumn,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use slimgen::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChangeTracking, Entity, EntitySource, Error, FieldInfo, Instance, MssqlGenerator,
        Result, Row, SqlGenerator, TableParameterExt, Tracked, TrackingOptions, TvpBuilder,
        Value, create_instance, materialize, materialize_scalar,
    };
}
