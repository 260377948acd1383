use crate::types::Cell;

/// One row of the canonical table.
///
/// Values are ordered like the canonical columns and each one already carries its column's
/// declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    values: Vec<Cell>,
}

impl TableRow {
    pub fn new(values: Vec<Cell>) -> Self {
        Self { values }
    }

    /// Returns the row values in canonical column order.
    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// Returns the value at `index`, if the row has that many columns.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }
}
