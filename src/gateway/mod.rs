pub mod catalog;
pub mod extract;
pub mod file;
pub mod persist;
