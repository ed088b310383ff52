use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
}

/// One inventory row. Serializes as `{id, name, amount}`; the owner stays
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub amount: i32,
    #[serde(skip)]
    pub owner: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: i32,
    pub name: String,
    pub amount: i32,
}

impl ItemUpdate {
    pub fn new(id: i32, name: impl Into<String>, amount: i32) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
        }
    }
}
