//! Output of the command line tool other than diagnostics

pub mod table;
pub mod template;
