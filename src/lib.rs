//! Bookshelf application library
//!
//! Wires the books module into the kernel registry and runs the HTTP server.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::books::{
    catalog::{BookCatalog, CatalogError},
    models::{Book, BookInput, Constraint, Violation},
};

/// Registry holding every project module, backed by `catalog`
pub fn build_registry(catalog: Arc<BookCatalog>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, catalog)?;
    Ok(registry)
}

/// Fully assembled HTTP application over `catalog`, without lifecycle hooks
pub fn app(catalog: Arc<BookCatalog>, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(catalog)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}

/// Run the service until shutdown: init and start modules, serve, then stop them
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let catalog = Arc::new(BookCatalog::seeded());
    let registry = build_registry(catalog)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry
        .stop_modules()
        .await
        .context("failed to stop modules")?;

    served
}
