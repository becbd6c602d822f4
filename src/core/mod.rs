pub mod config;
pub mod error;
pub mod filename;
pub mod image;
pub mod nl;
pub mod page;
pub mod registers;
pub mod symbols;
pub mod table;
