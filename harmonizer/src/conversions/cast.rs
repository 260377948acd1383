//! Non-strict casting of coalesced values into canonical column types.

use chrono::{DateTime, NaiveTime, Utc};
use thiserror::Error;

use crate::conversions::bool::parse_bool;
use crate::conversions::date::parse_date;
use crate::conversions::list::{join_list, split_list};
use crate::conversions::numeric::{parse_i64_lenient, parse_u64_lenient};
use crate::types::{Cell, ColumnType};

/// A value that has no representation in the target column type.
#[derive(Debug, Error, PartialEq)]
#[error("cannot cast {from} value `{value}` to {to}")]
pub struct CastError {
    pub from: &'static str,
    pub to: ColumnType,
    pub value: String,
}

/// Casts `cell` to `target`.
///
/// Nulls become the typed null of the target (an empty list for list columns). Strings are
/// parsed leniently, numbers and booleans convert between each other, and a pipe-delimited
/// string becomes a list. Callers substitute the typed null when this returns an error.
pub fn cast_cell(cell: Cell, target: ColumnType) -> Result<Cell, CastError> {
    if cell.is_null() {
        return Ok(target.null_cell());
    }
    if target.accepts(&cell) {
        return Ok(cell);
    }

    let cast = match (target, &cell) {
        (ColumnType::String, Cell::Bool(value)) => Some(Cell::String(value.to_string())),
        (ColumnType::String, Cell::I64(value)) => Some(Cell::String(value.to_string())),
        (ColumnType::String, Cell::U64(value)) => Some(Cell::String(value.to_string())),
        (ColumnType::String, Cell::Date(value)) => Some(Cell::String(value.to_string())),
        (ColumnType::String, Cell::TimestampTz(value)) => Some(Cell::String(value.to_rfc3339())),
        (ColumnType::String, Cell::List(items)) => Some(join_list(items).into()),

        (ColumnType::Bool, Cell::String(value)) => parse_bool(value).map(Cell::Bool),
        (ColumnType::Bool, Cell::I64(value)) => Some(Cell::Bool(*value != 0)),
        (ColumnType::Bool, Cell::U64(value)) => Some(Cell::Bool(*value != 0)),

        (ColumnType::I64, Cell::String(value)) => parse_i64_lenient(value).map(Cell::I64),
        (ColumnType::I64, Cell::U64(value)) => i64::try_from(*value).ok().map(Cell::I64),
        (ColumnType::I64, Cell::Bool(value)) => Some(Cell::I64(i64::from(*value))),

        (ColumnType::U64, Cell::String(value)) => parse_u64_lenient(value).map(Cell::U64),
        (ColumnType::U64, Cell::I64(value)) => u64::try_from(*value).ok().map(Cell::U64),
        (ColumnType::U64, Cell::Bool(value)) => Some(Cell::U64(u64::from(*value))),

        (ColumnType::Date, Cell::String(value)) => parse_date(value).map(Cell::Date),
        (ColumnType::Date, Cell::TimestampTz(value)) => Some(Cell::Date(value.date_naive())),

        (ColumnType::TimestampTz, Cell::String(value)) => DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|ts| Cell::TimestampTz(ts.with_timezone(&Utc))),
        (ColumnType::TimestampTz, Cell::Date(value)) => Some(Cell::TimestampTz(
            value.and_time(NaiveTime::MIN).and_utc(),
        )),

        (ColumnType::StringList, Cell::String(value)) => Some(Cell::List(split_list(value))),
        (ColumnType::StringList, Cell::I64(value)) => Some(Cell::List(vec![value.to_string()])),
        (ColumnType::StringList, Cell::U64(value)) => Some(Cell::List(vec![value.to_string()])),

        _ => None,
    };

    cast.ok_or_else(|| CastError {
        from: cell.type_name(),
        to: target,
        value: render(&cell),
    })
}

fn render(cell: &Cell) -> String {
    match cell {
        Cell::Null => "null".to_string(),
        Cell::Bool(value) => value.to_string(),
        Cell::I64(value) => value.to_string(),
        Cell::U64(value) => value.to_string(),
        Cell::String(value) => value.clone(),
        Cell::Date(value) => value.to_string(),
        Cell::TimestampTz(value) => value.to_rfc3339(),
        Cell::List(items) => items.join("|"),
    }
}
