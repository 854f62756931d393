//! Users, sessions and the calendar credentials stored for them.

pub mod db;
pub mod models;
pub use db::*;
pub use models::*;
