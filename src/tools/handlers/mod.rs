pub mod common;
pub mod file_ops;
pub mod files;
pub mod project;
pub mod search;
pub mod symbols;
