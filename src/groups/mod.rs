//! Groups of people, e.g. "Family" or "Book club".

pub mod db;
pub mod models;

pub use db::*;
pub use models::*;
