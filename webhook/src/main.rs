//! Donation webhook listener
//!
//! Accepts form-encoded donation callbacks, checks the shared verification
//! token and keeps a running total plus recent history in a JSON ledger.

mod config;
mod error;
mod handlers;
mod ledger;

use actix_web::{HttpServer, middleware, web};
use anyhow::Context;

use crate::{
    config::WebhookConfig,
    handlers::{AppState, build_app},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WebhookConfig::from_env()?;
    let state = web::Data::new(AppState::from_config(&config));

    log::info!(
        "starting webhook listener: bind_addr={} path={} data_file={} max_donations={}",
        config.bind_addr,
        config.path,
        state.store.path().display(),
        config.max_donations
    );

    let path = config.path.clone();
    HttpServer::new(move || build_app(state.clone(), path.clone()).wrap(middleware::Logger::default()))
        .bind(&config.bind_addr)
        .with_context(|| format!("failed to bind {}", config.bind_addr))?
        .run()
        .await
        .context("webhook server stopped with an error")?;

    Ok(())
}
