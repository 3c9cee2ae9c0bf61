pub mod books;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

use books::{catalog::BookCatalog, BooksModule};

/// Register all project modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    catalog: Arc<BookCatalog>,
) -> anyhow::Result<()> {
    registry.register(Arc::new(BooksModule::new(catalog)))
}
