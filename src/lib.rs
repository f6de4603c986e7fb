pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod schemas;
pub mod store;
pub mod tracker;

pub use error::ExpenseError;
pub use store::{ExpenseStore, InMemoryStore, MongoStore};
pub use tracker::ExpenseTracker;
