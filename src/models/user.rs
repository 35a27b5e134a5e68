use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";
pub const ROLE_ASSIGNMENT_COLLECTION: &str = "role-assignment";
pub const ADMIN_ROLE: &str = "admin";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IdRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// `{ user: { _id }, role: { _id } }`, one per role a user holds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoleAssignment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: IdRef,
    pub role: IdRef,
}

impl RoleAssignment {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        RoleAssignment {
            id: None,
            user: IdRef { id: user_id.into() },
            role: IdRef { id: role.into() },
        }
    }
}
