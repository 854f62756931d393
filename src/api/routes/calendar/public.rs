//! Public types for the calendar API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub days_ahead: Option<i64>,
    pub calendar_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CalendarResponse {
    pub id: String,
    pub summary: String,
    pub start: Option<String>,
    pub end: Option<String>,
}
