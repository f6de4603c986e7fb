use actix_web::{delete, get, post, put, web};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer};

use crate::error::ExpenseError;
use crate::schemas::{Item, ItemType, ItemUpdate, Message, NewItem, NewUser, User, UsersEnvelope};
use crate::tracker::ExpenseTracker;

pub const HEALTH_MESSAGE: &str = "Shared Expense Tracker API";

type ApiResult<T> = Result<web::Json<T>, ExpenseError>;

#[derive(Deserialize)]
struct ItemsQuery {
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    kind: Option<ItemType>,
}

/// `?type=` means no filter; any other value must name an item type.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<ItemType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => ItemType::deserialize(raw.into_deserializer()).map(Some),
    }
}

#[derive(Deserialize)]
struct MoveToExpenseQuery {
    paid_by: Option<String>,
}

#[get("/")]
async fn health() -> web::Json<Message> {
    web::Json(Message::new(HEALTH_MESSAGE))
}

#[get("/users")]
async fn list_users(tracker: web::Data<ExpenseTracker>) -> ApiResult<Vec<User>> {
    Ok(web::Json(tracker.list_users().await?))
}

#[post("/users")]
async fn create_user(
    tracker: web::Data<ExpenseTracker>,
    json: web::Json<NewUser>,
) -> ApiResult<User> {
    Ok(web::Json(tracker.create_user(&json.name).await?))
}

#[post("/users/init")]
async fn init_users(tracker: web::Data<ExpenseTracker>) -> ApiResult<UsersEnvelope> {
    let users = tracker.init_users().await?;
    Ok(web::Json(UsersEnvelope { users }))
}

#[get("/items")]
async fn list_items(
    tracker: web::Data<ExpenseTracker>,
    query: web::Query<ItemsQuery>,
) -> ApiResult<Vec<Item>> {
    Ok(web::Json(tracker.list_items(query.kind).await?))
}

#[post("/items")]
async fn create_item(
    tracker: web::Data<ExpenseTracker>,
    json: web::Json<NewItem>,
) -> ApiResult<Item> {
    Ok(web::Json(tracker.create_item(json.into_inner()).await?))
}

#[get("/items/{id}")]
async fn get_item(tracker: web::Data<ExpenseTracker>, id: web::Path<String>) -> ApiResult<Item> {
    Ok(web::Json(tracker.get_item(&id).await?))
}

#[put("/items/{id}")]
async fn update_item(
    tracker: web::Data<ExpenseTracker>,
    id: web::Path<String>,
    json: web::Json<ItemUpdate>,
) -> ApiResult<Item> {
    Ok(web::Json(tracker.update_item(&id, &json).await?))
}

#[delete("/items/{id}")]
async fn delete_item(
    tracker: web::Data<ExpenseTracker>,
    id: web::Path<String>,
) -> ApiResult<Message> {
    tracker.delete_item(&id).await?;
    Ok(web::Json(Message::new("Item deleted successfully")))
}

#[put("/items/{id}/toggle-divided")]
async fn toggle_divided(
    tracker: web::Data<ExpenseTracker>,
    id: web::Path<String>,
) -> ApiResult<Item> {
    Ok(web::Json(tracker.toggle_divided(&id).await?))
}

#[put("/items/{id}/move-to-expense")]
async fn move_to_expense(
    tracker: web::Data<ExpenseTracker>,
    id: web::Path<String>,
    query: web::Query<MoveToExpenseQuery>,
) -> ApiResult<Item> {
    let item = tracker
        .move_to_expense(&id, query.paid_by.as_deref())
        .await?;
    Ok(web::Json(item))
}

fn invalid_input(reason: String) -> actix_web::Error {
    ExpenseError::InvalidInput(reason).into()
}

/// Mounts every route on `cfg`. Extractor failures answer with the same
/// JSON error body as the handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _| invalid_input(err.to_string()));
    let query = web::QueryConfig::default().error_handler(|err, _| invalid_input(err.to_string()));
    let path = web::PathConfig::default().error_handler(|err, _| invalid_input(err.to_string()));
    cfg.app_data(json)
        .app_data(query)
        .app_data(path)
        .service(health)
        .service(list_users)
        .service(init_users)
        .service(create_user)
        .service(list_items)
        .service(create_item)
        .service(get_item)
        .service(update_item)
        .service(delete_item)
        .service(toggle_divided)
        .service(move_to_expense);
}

