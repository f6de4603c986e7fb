use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;

use sharedexpenses::config::{Config, StoreBackend};
use sharedexpenses::{logging, routes, ExpenseStore, ExpenseTracker, InMemoryStore, MongoStore};

async fn open_store(backend: &StoreBackend) -> io::Result<Arc<dyn ExpenseStore>> {
    match backend {
        StoreBackend::Mongo { url, db_name } => {
            let store = MongoStore::connect(url, db_name)
                .await
                .map_err(io::Error::other)?;
            store.ensure_indexes().await.map_err(io::Error::other)?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory store; data is lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(io::Error::other)?;
    logging::init(config.log_format);

    let store = open_store(&config.store).await?;
    let tracker = web::Data::new(ExpenseTracker::new(store.clone()));
    let prefix = config.api_prefix.clone();

    info!(host = %config.host, port = config.port, prefix = %prefix, "starting server");
    let served = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(tracker.clone())
            .service(web::scope(&prefix).configure(routes::configure))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    store.shutdown().await;
    served
}
