use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;

pub const DEFAULT_CURRENCY: &str = "DKK";
pub const DEFAULT_USER_NAMES: [&str; 2] = ["Matias", "Agustina"];
pub const USER_LIST_LIMIT: usize = 100;
pub const ITEM_LIST_LIMIT: usize = 1000;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewUser {
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Cart,
    Expense,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Cart => "cart",
            ItemType::Expense => "expense",
        }
    }
}

/// An item as it goes over the wire. `createdAt` serializes as ISO-8601.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub paid_by: Option<UserId>,
    pub is_divided: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub kind: ItemType,
    #[serde(default)]
    pub paid_by: Option<UserId>,
    pub created_by: UserId,
    #[serde(default)]
    pub is_divided: bool,
}

/// Partial update. A field left as `None` keeps its stored value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<ItemType>,
    pub paid_by: Option<UserId>,
    pub is_divided: Option<bool>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.paid_by.is_none()
            && self.is_divided.is_none()
    }

    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(amount) = self.amount {
            item.amount = amount;
        }
        if let Some(kind) = self.kind {
            item.kind = kind;
        }
        if let Some(paid_by) = &self.paid_by {
            item.paid_by = Some(paid_by.clone());
        }
        if let Some(is_divided) = self.is_divided {
            item.is_divided = is_divided;
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UsersEnvelope {
    pub users: Vec<User>,
}
