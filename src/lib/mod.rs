//! Implementations that are useful accross the whole project
//!
//! Field names, expected-field sets, tables and the validated document

pub mod document;
pub mod expected;
pub mod table;
pub mod tag;
pub mod value;
