use crate::cache::ReputationCache;
use crate::config::ReputationConfig;
use crate::engine::ReputationEngine;
use crate::scanner::HttpScanner;
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Result;
use log::*;
use repgate::http_client::build_client;
use std::net::TcpListener;
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod db;
pub mod endpoint;
pub mod engine;
mod http_error;
pub mod models;
pub mod scanner;

/// Wire the cache, the scanner and the engine from `config`.
pub async fn build_engine(config: &ReputationConfig) -> Result<ReputationEngine> {
    let pool = db::init_database(&config.database_path).await?;
    info!("Database initialized at {}", config.database_path);

    let cache = ReputationCache::new(pool, config.cache_ttl());
    let scanner = HttpScanner::new(build_client(), &config.keywords, config.chunk_size, config.snippet_len, config.scan_timeout());
    Ok(ReputationEngine::new(cache, Arc::new(scanner)))
}

pub async fn run(config: ReputationConfig) -> Result<()> {
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port))?;
    serve(listener, build_engine(&config).await?).await
}

/// Serve the `/reputation` endpoint on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, engine: ReputationEngine) -> Result<()> {
    let addr = listener.local_addr()?;
    let engine_data = web::Data::new(engine);

    let server = HttpServer::new(move || {
        App::new().app_data(engine_data.clone()).wrap(middleware::Logger::default()).configure(endpoint::configure)
    })
    .listen(listener)?
    .run();

    info!("Reputation service listening on http://{}", addr);

    let stop_result = server.await;
    debug!("Server stopped");

    Ok(stop_result?)
}
