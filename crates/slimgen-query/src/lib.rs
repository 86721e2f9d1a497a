//! CRUD SQL generation for SlimGen entities.
//!
//! `slimgen-query` is the **statement construction layer**. It turns the
//! classified shape of an `Entity` into parameterized SQL Server statements,
//! and builds table-valued parameters from slices of values.
//!
//! # Role In The Architecture
//!
//! - **Generator**: [`MssqlGenerator`] renders INSERT, SELECT, UPDATE and
//!   DELETE statements with `@Property` placeholders.
//! - **Dirty fields**: change-tracked entities write only what changed.
//! - **Table-valued parameters**: [`TvpBuilder`] maps items to records of a
//!   server-side table type.
//!
//! Statements are plain strings; executing them is left to the caller's
//! database driver. Most users access this crate via the `slimgen` facade.

pub mod generator;
pub mod tvp;

pub use generator::{MssqlGenerator, SqlGenerator};
pub use tvp::{DEFAULT_TEXT_LENGTH, TableParameterExt, TableValueParameter, TvpBuilder, TvpColumn};
