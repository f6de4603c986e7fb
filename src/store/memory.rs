use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ExpenseError;
use crate::schemas::{Item, ItemType, ItemUpdate, User};
use crate::store::ExpenseStore;

/// Volatile store for local runs and tests. Each operation holds the lock
/// for its whole read-modify-write.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    items: RwLock<Vec<Item>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn list_users(&self, limit: usize) -> Result<Vec<User>, ExpenseError> {
        Ok(self.users.read().await.iter().take(limit).cloned().collect())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, ExpenseError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.name == name).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), ExpenseError> {
        self.users.write().await.push(user.clone());
        Ok(())
    }

    async fn list_items(
        &self,
        kind: Option<ItemType>,
        limit: usize,
    ) -> Result<Vec<Item>, ExpenseError> {
        let mut items = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| kind.map_or(true, |kind| item.kind == kind))
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn insert_item(&self, item: &Item) -> Result<(), ExpenseError> {
        self.items.write().await.push(item.clone());
        Ok(())
    }

    async fn find_item(&self, id: &str) -> Result<Option<Item>, ExpenseError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn update_item(
        &self,
        id: &str,
        update: &ItemUpdate,
    ) -> Result<Option<Item>, ExpenseError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|item| item.id == id).map(|item| {
            update.apply(item);
            item.clone()
        }))
    }

    async fn delete_item(&self, id: &str) -> Result<bool, ExpenseError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() < before)
    }

    async fn toggle_divided(&self, id: &str) -> Result<Option<Item>, ExpenseError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|item| item.id == id).map(|item| {
            item.is_divided = !item.is_divided;
            item.clone()
        }))
    }

    async fn move_to_expense(
        &self,
        id: &str,
        paid_by: Option<&str>,
    ) -> Result<Option<Item>, ExpenseError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|item| item.id == id).map(|item| {
            item.kind = ItemType::Expense;
            item.paid_by = paid_by.map(str::to_string);
            item.clone()
        }))
    }
}
