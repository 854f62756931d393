pub mod accounts;
pub mod api;
pub mod cli;
pub mod core;
pub mod google;
pub mod groups;
pub mod people;
pub mod reminders;
