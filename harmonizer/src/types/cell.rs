use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, TimeUnit};
use chrono::{DateTime, NaiveDate, Utc};

/// A single typed value flowing through the coalescer and the schema enforcer.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    String(String),
    Date(NaiveDate),
    TimestampTz(DateTime<Utc>),
    List(Vec<String>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Returns whether the value counts as provided by a source.
    ///
    /// Null and the empty list are absent, every other value is present.
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Null => false,
            Cell::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Short name of the variant, used in coercion diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::I64(_) => "i64",
            Cell::U64(_) => "u64",
            Cell::String(_) => "string",
            Cell::Date(_) => "date",
            Cell::TimestampTz(_) => "timestamptz",
            Cell::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Cell::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::I64(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<Vec<String>> for Cell {
    fn from(value: Vec<String>) -> Self {
        Cell::List(value)
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Declared type of a canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Bool,
    I64,
    U64,
    Date,
    TimestampTz,
    StringList,
}

impl ColumnType {
    /// Name of the inner field of list columns.
    pub const LIST_ITEM_FIELD: &'static str = "item";

    /// Timezone attached to timestamp columns.
    pub const TIMEZONE: &'static str = "UTC";

    /// Returns the Arrow type used to persist the column.
    pub fn arrow_type(&self) -> DataType {
        match self {
            ColumnType::String => DataType::Utf8,
            ColumnType::Bool => DataType::Boolean,
            ColumnType::I64 => DataType::Int64,
            ColumnType::U64 => DataType::UInt64,
            ColumnType::Date => DataType::Date32,
            ColumnType::TimestampTz => {
                DataType::Timestamp(TimeUnit::Microsecond, Some(Self::TIMEZONE.into()))
            }
            ColumnType::StringList => DataType::List(Arc::new(Field::new(
                Self::LIST_ITEM_FIELD,
                DataType::Utf8,
                true,
            ))),
        }
    }

    /// Typed null of this column: an empty list for list columns, [`Cell::Null`] otherwise.
    pub fn null_cell(&self) -> Cell {
        match self {
            ColumnType::StringList => Cell::List(Vec::new()),
            _ => Cell::Null,
        }
    }

    /// Returns whether `cell` already has the shape this column stores.
    pub fn accepts(&self, cell: &Cell) -> bool {
        matches!(
            (self, cell),
            (ColumnType::String, Cell::String(_))
                | (ColumnType::Bool, Cell::Bool(_))
                | (ColumnType::I64, Cell::I64(_))
                | (ColumnType::U64, Cell::U64(_))
                | (ColumnType::Date, Cell::Date(_))
                | (ColumnType::TimestampTz, Cell::TimestampTz(_))
                | (ColumnType::StringList, Cell::List(_))
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
            ColumnType::I64 => "int64",
            ColumnType::U64 => "uint64",
            ColumnType::Date => "date",
            ColumnType::TimestampTz => "timestamp",
            ColumnType::StringList => "list<string>",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_absent() {
        assert!(!Cell::List(vec![]).is_present());
        assert!(!Cell::Null.is_present());
        assert!(Cell::List(vec!["Asthma".to_string()]).is_present());
        assert!(Cell::Bool(false).is_present());
    }

    #[test]
    fn options_convert_to_null_or_value() {
        assert_eq!(Cell::from(None::<String>), Cell::Null);
        assert_eq!(Cell::from(Some(42_i64)), Cell::I64(42));
        assert_eq!(Cell::from(Some("x")), Cell::String("x".to_string()));
    }

    #[test]
    fn typed_nulls_match_column_kind() {
        assert_eq!(ColumnType::StringList.null_cell(), Cell::List(vec![]));
        assert_eq!(ColumnType::Date.null_cell(), Cell::Null);
    }
}
