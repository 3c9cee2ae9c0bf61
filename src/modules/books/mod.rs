pub mod catalog;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use catalog::BookCatalog;
use models::{
    AUTHOR_MIN_LENGTH, DESCRIPTION_LENGTH, PUBLISHED_YEAR_RANGE, RATING_RANGE, TITLE_LENGTH,
};

/// Books module: serves the catalog at the server root
pub struct BooksModule {
    catalog: Arc<BookCatalog>,
}

impl BooksModule {
    pub fn new(catalog: Arc<BookCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<BookCatalog> {
        &self.catalog
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.catalog.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_list = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        }
                    }
                }
            })
        };
        let integer_param = |name: &str, location: &str| {
            json!({
                "name": name,
                "in": location,
                "required": true,
                "schema": { "type": "integer", "format": "int64" }
            })
        };

        let input_properties = json!({
            "title": {
                "type": "string",
                "minLength": *TITLE_LENGTH.start(),
                "maxLength": *TITLE_LENGTH.end()
            },
            "author": { "type": "string", "minLength": AUTHOR_MIN_LENGTH },
            "description": {
                "type": "string",
                "minLength": *DESCRIPTION_LENGTH.start(),
                "maxLength": *DESCRIPTION_LENGTH.end()
            },
            "rating": {
                "type": "integer",
                "minimum": *RATING_RANGE.start(),
                "maximum": *RATING_RANGE.end()
            },
            "published_date": {
                "type": "integer",
                "minimum": *PUBLISHED_YEAR_RANGE.start(),
                "maximum": *PUBLISHED_YEAR_RANGE.end()
            }
        });
        let mut book_properties = input_properties.clone();
        book_properties["id"] = json!({ "type": "integer", "format": "int64" });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "responses": { "200": book_list("All books in insertion order") }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [integer_param("id", "path")],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": error_response("No book with that id"),
                            "422": error_response("Id is not an integer")
                        }
                    }
                },
                "/books/": {
                    "get": {
                        "summary": "List books by rating",
                        "tags": ["Books"],
                        "parameters": [integer_param("book_rating", "query")],
                        "responses": {
                            "200": book_list("Books with the given rating"),
                            "422": error_response("Missing or non-integer rating")
                        }
                    }
                },
                "/books/publish/": {
                    "get": {
                        "summary": "List books by publication year",
                        "tags": ["Books"],
                        "parameters": [integer_param("published_date", "query")],
                        "responses": {
                            "200": book_list("Books published in the given year"),
                            "422": error_response("Missing or non-integer year")
                        }
                    }
                },
                "/create-book": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "The created book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "422": error_response("A field violates its constraints")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_properties,
                        "required": ["id", "title", "author", "description", "rating", "published_date"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": input_properties,
                        "required": ["title", "author", "description", "rating", "published_date"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.catalog.len(),
            "books module stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::settings::Settings;

    fn module() -> BooksModule {
        BooksModule::new(Arc::new(BookCatalog::seeded()))
    }

    #[test]
    fn mounts_at_server_root() {
        let module = module();
        assert_eq!(module.name(), "books");
        assert_eq!(module.mount_path(), "/");
    }

    #[test]
    fn openapi_covers_every_endpoint() {
        let spec = module().openapi().unwrap();
        for path in [
            "/books",
            "/books/{id}",
            "/books/",
            "/books/publish/",
            "/create-book",
        ] {
            assert!(spec["paths"][path].is_object(), "missing {path}");
        }
        assert!(spec["paths"]["/create-book"]["post"].is_object());
    }

    #[test]
    fn openapi_schema_mirrors_validation_bounds() {
        let spec = module().openapi().unwrap();
        let input = &spec["components"]["schemas"]["BookInput"]["properties"];
        assert_eq!(input["title"]["minLength"], 3);
        assert_eq!(input["title"]["maxLength"], 100);
        assert_eq!(input["rating"]["maximum"], 5);
        assert_eq!(input["published_date"]["minimum"], 2000);
        assert!(input.get("id").is_none());

        let book = &spec["components"]["schemas"]["Book"]["properties"];
        assert_eq!(book["id"]["type"], "integer");
    }

    #[tokio::test]
    async fn lifecycle_hooks_succeed() {
        let module = module();
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert_eq!(module.catalog().len(), 6);
    }
}
