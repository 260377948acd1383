//! Lenient text conversions shared by the tabular preparer, the document flattener and the
//! schema enforcer.

pub mod bool;
pub mod cast;
pub mod date;
pub mod list;
pub mod numeric;
