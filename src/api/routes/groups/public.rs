//! Public types for the groups API
use serde::{Deserialize, Serialize};

pub use crate::groups::{Group, GroupDetail};
pub use crate::people::Person;

#[derive(Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub group_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
}
