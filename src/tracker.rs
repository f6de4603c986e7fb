//! The expense tracker's operations, independent of how they are served.
//!
//! The HTTP routes are thin wrappers over [`ExpenseTracker`]; a
//! function-per-route deployment would call the same methods.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ExpenseError;
use crate::schemas::{
    Item, ItemType, ItemUpdate, NewItem, User, DEFAULT_CURRENCY, DEFAULT_USER_NAMES,
    ITEM_LIST_LIMIT, USER_LIST_LIMIT,
};
use crate::store::ExpenseStore;

#[derive(Clone)]
pub struct ExpenseTracker {
    store: Arc<dyn ExpenseStore>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl ExpenseTracker {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ExpenseError> {
        self.store.list_users(USER_LIST_LIMIT).await
    }

    /// Returns the user with this name, creating it first if needed.
    pub async fn create_user(&self, name: &str) -> Result<User, ExpenseError> {
        if let Some(existing) = self.store.find_user_by_name(name).await? {
            debug!(user_id = %existing.id, "user already exists");
            return Ok(existing);
        }
        let user = User {
            id: new_id(),
            name: name.to_string(),
        };
        self.store.insert_user(&user).await?;
        info!(user_id = %user.id, name = %user.name, "user created");
        Ok(user)
    }

    pub async fn init_users(&self) -> Result<Vec<User>, ExpenseError> {
        let mut users = Vec::with_capacity(DEFAULT_USER_NAMES.len());
        for name in DEFAULT_USER_NAMES {
            users.push(self.create_user(name).await?);
        }
        Ok(users)
    }

    pub async fn list_items(&self, kind: Option<ItemType>) -> Result<Vec<Item>, ExpenseError> {
        self.store.list_items(kind, ITEM_LIST_LIMIT).await
    }

    pub async fn create_item(&self, new_item: NewItem) -> Result<Item, ExpenseError> {
        let item = Item {
            id: new_id(),
            name: new_item.name,
            amount: new_item.amount,
            currency: DEFAULT_CURRENCY.to_string(),
            kind: new_item.kind,
            paid_by: new_item.paid_by,
            is_divided: new_item.is_divided,
            // Millisecond precision, so the response matches what is read back.
            created_at: bson::DateTime::now().to_chrono(),
            created_by: new_item.created_by,
        };
        self.store.insert_item(&item).await?;
        info!(item_id = %item.id, kind = item.kind.as_str(), "item created");
        Ok(item)
    }

    pub async fn get_item(&self, id: &str) -> Result<Item, ExpenseError> {
        self.store
            .find_item(id)
            .await?
            .ok_or_else(ExpenseError::item_not_found)
    }

    pub async fn update_item(&self, id: &str, update: &ItemUpdate) -> Result<Item, ExpenseError> {
        self.store
            .update_item(id, update)
            .await?
            .ok_or_else(ExpenseError::item_not_found)
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), ExpenseError> {
        if !self.store.delete_item(id).await? {
            return Err(ExpenseError::item_not_found());
        }
        info!(item_id = id, "item deleted");
        Ok(())
    }

    pub async fn toggle_divided(&self, id: &str) -> Result<Item, ExpenseError> {
        self.store
            .toggle_divided(id)
            .await?
            .ok_or_else(ExpenseError::item_not_found)
    }

    /// Marks the item as an expense paid by `paid_by`, whatever its current type.
    pub async fn move_to_expense(
        &self,
        id: &str,
        paid_by: Option<&str>,
    ) -> Result<Item, ExpenseError> {
        let item = self
            .store
            .move_to_expense(id, paid_by)
            .await?
            .ok_or_else(ExpenseError::item_not_found)?;
        info!(item_id = id, paid_by = ?paid_by, "item moved to expenses");
        Ok(item)
    }
}
