//! Core types and traits for SlimGen.
//!
//! This crate provides the foundations the SQL generator and the derive
//! macro build on:
//!
//! - `Entity` trait for by-name property reflection
//! - `EntityShape` property role classification, cached per type
//! - `Tracked<T>` change-tracking surrogate and the instance factory
//! - `Value`, `SqlType` and rows for moving data in and out

pub mod entity;
pub mod error;
pub mod field;
pub mod materialize;
pub mod row;
pub mod shape;
pub mod tracked;
pub mod types;
pub mod value;

pub use entity::Entity;
pub use error::{Error, Result, ShapeError, ShapeErrorKind, TypeError};
pub use field::{FieldInfo, IMPLICIT_KEY_NAME, Marker, MarkerSet};
pub use materialize::{materialize, materialize_all, materialize_scalar};
pub use row::{ColumnInfo, Row};
pub use shape::{EntityShape, PropertyRole};
pub use tracked::{
    ChangeTracking, EntitySource, Instance, Tracked, TrackingOptions, create_instance,
    should_track,
};
pub use types::{SqlType, TypeInfo, ValueType};
pub use value::Value;
