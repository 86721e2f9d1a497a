//! Error types for SlimGen operations.

use std::fmt;

/// The primary error type for all SlimGen operations.
#[derive(Debug)]
pub enum Error {
    /// Entity shape cannot support the requested operation
    Shape(ShapeError),
    /// Value conversion errors
    Type(TypeError),
    /// A property name that the entity does not declare
    UnknownProperty {
        entity: &'static str,
        property: String,
    },
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct ShapeError {
    pub kind: ShapeErrorKind,
    pub entity: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeErrorKind {
    /// The entity declares no properties
    NoProperties,
    /// More than one store-generated key; INSERT cannot return a single identity
    MultipleGeneratedKeys,
    /// Nothing left to insert once keys are removed
    InvalidInsert,
    /// No key columns to build a WHERE clause from
    NoKeys,
    /// A property's value type has no SQL Server equivalent
    UnmappableType,
    /// Table-name marker is blank or too short
    InvalidTableName,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

impl ShapeError {
    pub fn new(kind: ShapeErrorKind, entity: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity,
            message: message.into(),
        }
    }
}

impl TypeError {
    /// Attach the column (property) name the conversion was for.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl Error {
    /// The shape error kind, if this is a shape error.
    pub fn shape_kind(&self) -> Option<ShapeErrorKind> {
        match self {
            Error::Shape(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Name the column a type error belongs to. Other errors pass through.
    pub fn in_column(self, column: &str) -> Self {
        match self {
            Error::Type(e) if e.column.is_none() => Error::Type(e.with_column(column)),
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Shape(e) => write!(f, "Entity error ({}): {}", e.entity, e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::UnknownProperty { entity, property } => {
                write!(f, "{} has no property named '{}'", entity, property)
            }
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<ShapeError> for Error {
    fn from(err: ShapeError) -> Self {
        Error::Shape(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for SlimGen operations.
pub type Result<T> = std::result::Result<T, Error>;
