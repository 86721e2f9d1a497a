//! Table-valued parameters.
//!
//! A [`TvpBuilder`] maps each item of a slice onto one record of a
//! server-side table type. Columns are added in order, each with a selector
//! that extracts the column value from an item.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use slimgen_core::{ColumnInfo, Result, Row, SqlType, TypeInfo, Value};

/// Length applied to text columns declared without one.
pub const DEFAULT_TEXT_LENGTH: u32 = 4000;

/// Column metadata of a table-valued parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvpColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub max_length: Option<u32>,
    /// Zero-based position within the record.
    pub ordinal: usize,
}

/// A named table-valued parameter ready to be bound.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValueParameter {
    name: String,
    columns: Vec<TvpColumn>,
    records: Vec<Vec<Value>>,
}

impl TableValueParameter {
    /// Name of the server-side table type.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[TvpColumn] {
        &self.columns
    }

    /// One record per input item, values in column order.
    pub fn records(&self) -> &[Vec<Value>] {
        &self.records
    }

    /// Records as rows sharing one column set.
    pub fn rows(&self) -> Vec<Row> {
        let columns = Arc::new(ColumnInfo::new(self.columns.iter().map(|c| c.name.as_str())));
        self.records
            .iter()
            .map(|values| Row::with_columns(Arc::clone(&columns), values.clone()))
            .collect()
    }
}

type Selector<'a, I> = Box<dyn Fn(&I) -> Value + 'a>;

/// Builder for a [`TableValueParameter`] over a slice of items.
///
/// # Example
///
/// ```ignore
/// let tvp = TvpBuilder::new("dbo.HeroList", &heroes)
///     .add_column(|h: &Hero| h.id, "Id", None)?
///     .add_column(|h: &Hero| h.name.clone(), "Name", Some(200))?
///     .build();
/// ```
pub struct TvpBuilder<'a, I> {
    name: String,
    items: &'a [I],
    columns: Vec<TvpColumn>,
    selectors: Vec<Selector<'a, I>>,
}

impl<'a, I> TvpBuilder<'a, I> {
    pub fn new(name: impl Into<String>, items: &'a [I]) -> Self {
        Self {
            name: name.into(),
            items,
            columns: Vec::new(),
            selectors: Vec::new(),
        }
    }

    /// Append a column whose values come from `selector`.
    ///
    /// The column's SQL type is derived from the selector's return type;
    /// types without a SQL Server mapping fail with `UnmappableType`. Text
    /// columns without a length, and any column with a length of zero, get
    /// [`DEFAULT_TEXT_LENGTH`].
    pub fn add_column<P, F>(
        mut self,
        selector: F,
        column_name: impl Into<String>,
        max_length: Option<u32>,
    ) -> Result<Self>
    where
        P: TypeInfo + Into<Value>,
        F: Fn(&I) -> P + 'a,
    {
        let sql_type = SqlType::resolve(type_name::<I>(), P::VALUE_TYPE)?;
        let max_length = match max_length {
            None if sql_type.is_text() => Some(DEFAULT_TEXT_LENGTH),
            Some(0) => Some(DEFAULT_TEXT_LENGTH),
            other => other,
        };

        self.columns.push(TvpColumn {
            name: column_name.into(),
            sql_type,
            max_length,
            ordinal: self.columns.len(),
        });
        self.selectors
            .push(Box::new(move |item: &I| -> Value { selector(item).into() }));
        Ok(self)
    }

    pub fn columns(&self) -> &[TvpColumn] {
        &self.columns
    }

    /// Evaluate every selector against every item.
    pub fn build(self) -> TableValueParameter {
        let records = self
            .items
            .iter()
            .map(|item| self.selectors.iter().map(|select| select(item)).collect())
            .collect::<Vec<Vec<Value>>>();

        tracing::debug!(
            tvp = %self.name,
            columns = self.columns.len(),
            records = records.len(),
            "Built table-valued parameter"
        );

        TableValueParameter {
            name: self.name,
            columns: self.columns,
            records,
        }
    }
}

impl<I> fmt::Debug for TvpBuilder<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TvpBuilder")
            .field("name", &self.name)
            .field("items", &self.items.len())
            .field("columns", &self.columns)
            .finish()
    }
}

/// Table-valued parameter construction on slices.
pub trait TableParameterExt<I> {
    /// Start a builder named `tvp_name` over these items.
    fn table_parameter(&self, tvp_name: impl Into<String>) -> TvpBuilder<'_, I>;

    /// Single-column parameter whose values are the items themselves.
    fn as_table_parameter(
        &self,
        tvp_name: impl Into<String>,
        column_name: impl Into<String>,
        max_length: Option<u32>,
    ) -> Result<TableValueParameter>
    where
        I: TypeInfo + Into<Value> + Clone;
}

impl<I> TableParameterExt<I> for [I] {
    fn table_parameter(&self, tvp_name: impl Into<String>) -> TvpBuilder<'_, I> {
        TvpBuilder::new(tvp_name, self)
    }

    fn as_table_parameter(
        &self,
        tvp_name: impl Into<String>,
        column_name: impl Into<String>,
        max_length: Option<u32>,
    ) -> Result<TableValueParameter>
    where
        I: TypeInfo + Into<Value> + Clone,
    {
        Ok(self
            .table_parameter(tvp_name)
            .add_column(I::clone, column_name, max_length)?
            .build())
    }
}
