//! People tracked by a user and the reminders derived from them.

pub mod db;
pub mod models;

pub use db::*;
pub use models::*;
