use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExpenseError;
use crate::schemas::{Item, ItemType, ItemUpdate, User, UserId};
use crate::store::ExpenseStore;

const USERS: &str = "users";
const ITEMS: &str = "items";

/// Stored shape of an item. Identical to [`Item`] except that `createdAt`
/// is a native BSON datetime. The store's `_id` is ignored on read.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemDocument {
    id: String,
    name: String,
    amount: f64,
    currency: String,
    #[serde(rename = "type")]
    kind: ItemType,
    paid_by: Option<UserId>,
    #[serde(default)]
    is_divided: bool,
    created_at: bson::DateTime,
    created_by: UserId,
}

impl From<&Item> for ItemDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            amount: item.amount,
            currency: item.currency.clone(),
            kind: item.kind,
            paid_by: item.paid_by.clone(),
            is_divided: item.is_divided,
            created_at: bson::DateTime::from_chrono(item.created_at),
            created_by: item.created_by.clone(),
        }
    }
}

impl From<ItemDocument> for Item {
    fn from(doc: ItemDocument) -> Self {
        let created_at: DateTime<Utc> = doc.created_at.to_chrono();
        Self {
            id: doc.id,
            name: doc.name,
            amount: doc.amount,
            currency: doc.currency,
            kind: doc.kind,
            paid_by: doc.paid_by,
            is_divided: doc.is_divided,
            created_at,
            created_by: doc.created_by,
        }
    }
}

fn set_document(update: &ItemUpdate) -> Document {
    let mut set = Document::new();
    if let Some(name) = &update.name {
        set.insert("name", name.as_str());
    }
    if let Some(amount) = update.amount {
        set.insert("amount", amount);
    }
    if let Some(kind) = update.kind {
        set.insert("type", kind.as_str());
    }
    if let Some(paid_by) = &update.paid_by {
        set.insert("paidBy", paid_by.as_str());
    }
    if let Some(is_divided) = update.is_divided {
        set.insert("isDivided", is_divided);
    }
    set
}

/// Pipeline update negating `isDivided` server-side; a missing field counts as false.
fn toggle_pipeline() -> Vec<Document> {
    vec![doc! {
        "$set": { "isDivided": { "$not": [ { "$ifNull": ["$isDivided", false] } ] } }
    }]
}

fn after_update() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

fn capped(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, ExpenseError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        info!(database = db_name, "connected to document store");
        Ok(Self { client, db })
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn items(&self) -> Collection<ItemDocument> {
        self.db.collection(ITEMS)
    }
}

#[async_trait]
impl ExpenseStore for MongoStore {
    async fn list_users(&self, limit: usize) -> Result<Vec<User>, ExpenseError> {
        let options = FindOptions::builder().limit(capped(limit)).build();
        let users = self.users().find(None, options).await?.try_collect().await?;
        Ok(users)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, ExpenseError> {
        Ok(self.users().find_one(doc! { "name": name }, None).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), ExpenseError> {
        self.users().insert_one(user, None).await?;
        debug!(user_id = %user.id, "user inserted");
        Ok(())
    }

    async fn list_items(
        &self,
        kind: Option<ItemType>,
        limit: usize,
    ) -> Result<Vec<Item>, ExpenseError> {
        let filter = kind.map(|kind| doc! { "type": kind.as_str() });
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(capped(limit))
            .build();
        let docs: Vec<ItemDocument> = self
            .items()
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(Item::from).collect())
    }

    async fn insert_item(&self, item: &Item) -> Result<(), ExpenseError> {
        self.items().insert_one(ItemDocument::from(item), None).await?;
        debug!(item_id = %item.id, "item inserted");
        Ok(())
    }

    async fn find_item(&self, id: &str) -> Result<Option<Item>, ExpenseError> {
        let doc = self.items().find_one(doc! { "id": id }, None).await?;
        Ok(doc.map(Item::from))
    }

    async fn update_item(
        &self,
        id: &str,
        update: &ItemUpdate,
    ) -> Result<Option<Item>, ExpenseError> {
        let set = set_document(update);
        if set.is_empty() {
            return self.find_item(id).await;
        }
        let doc = self
            .items()
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set }, after_update())
            .await?;
        Ok(doc.map(Item::from))
    }

    async fn delete_item(&self, id: &str) -> Result<bool, ExpenseError> {
        let result = self.items().delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn toggle_divided(&self, id: &str) -> Result<Option<Item>, ExpenseError> {
        let doc = self
            .items()
            .find_one_and_update(doc! { "id": id }, toggle_pipeline(), after_update())
            .await?;
        Ok(doc.map(Item::from))
    }

    async fn move_to_expense(
        &self,
        id: &str,
        paid_by: Option<&str>,
    ) -> Result<Option<Item>, ExpenseError> {
        let update = doc! {
            "$set": { "type": ItemType::Expense.as_str(), "paidBy": paid_by }
        };
        let doc = self
            .items()
            .find_one_and_update(doc! { "id": id }, update, after_update())
            .await?;
        Ok(doc.map(Item::from))
    }

    async fn ensure_indexes(&self) -> Result<(), ExpenseError> {
        let item_indexes = vec![
            IndexModel::builder().keys(doc! { "id": 1 }).build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
        ];
        let user_indexes = vec![
            IndexModel::builder().keys(doc! { "id": 1 }).build(),
            IndexModel::builder().keys(doc! { "name": 1 }).build(),
        ];
        self.items().create_indexes(item_indexes, None).await?;
        self.users().create_indexes(user_indexes, None).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("document store connection closed");
    }
}
