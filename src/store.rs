//! Persistence port for users and items.
//!
//! Every method touches at most one document. Methods that change an item
//! and return it do so in a single store operation, so concurrent toggles
//! cannot lose each other's writes.

use async_trait::async_trait;

use crate::error::ExpenseError;
use crate::schemas::{Item, ItemType, ItemUpdate, User};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn list_users(&self, limit: usize) -> Result<Vec<User>, ExpenseError>;

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, ExpenseError>;

    async fn insert_user(&self, user: &User) -> Result<(), ExpenseError>;

    /// Items matching `kind` (all when `None`), most recent first.
    async fn list_items(
        &self,
        kind: Option<ItemType>,
        limit: usize,
    ) -> Result<Vec<Item>, ExpenseError>;

    async fn insert_item(&self, item: &Item) -> Result<(), ExpenseError>;

    async fn find_item(&self, id: &str) -> Result<Option<Item>, ExpenseError>;

    /// Applies the provided fields and returns the item after the write.
    async fn update_item(
        &self,
        id: &str,
        update: &ItemUpdate,
    ) -> Result<Option<Item>, ExpenseError>;

    /// Returns whether a document was removed.
    async fn delete_item(&self, id: &str) -> Result<bool, ExpenseError>;

    async fn toggle_divided(&self, id: &str) -> Result<Option<Item>, ExpenseError>;

    async fn move_to_expense(
        &self,
        id: &str,
        paid_by: Option<&str>,
    ) -> Result<Option<Item>, ExpenseError>;

    async fn ensure_indexes(&self) -> Result<(), ExpenseError> {
        Ok(())
    }

    /// Releases the underlying connection. Called once after the server stops.
    async fn shutdown(&self) {}
}
