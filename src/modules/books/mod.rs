pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{
    settings::{BookSettings, IdScheme},
    InitCtx, Module,
};
use tokio::sync::RwLock;

use crate::utils::{NanoIdGenerator, SystemClock, UuidGenerator};

pub use error::BookError;
pub use models::{Book, BookFilter, BookPayload, BookSummary, NewBook};
pub use routes::SharedStore;
pub use store::BookStore;

/// Books module: owns the in-memory shelf for the lifetime of the server.
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Store with the configured id scheme and the system clock.
    pub fn from_settings(settings: &BookSettings) -> Self {
        let store = match settings.id_generator {
            IdScheme::Nanoid => {
                BookStore::new(NanoIdGenerator::new(settings.id_length), SystemClock)
            }
            IdScheme::Uuid => BookStore::new(UuidGenerator, SystemClock),
        };
        Self::new(store)
    }

    /// Handle to the store the routes operate on.
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            id_generator = ?ctx.settings.books.id_generator,
            id_length = ctx.settings.books.id_length,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let discarded = self.store.write().await.clear();
        tracing::info!(module = self.name(), discarded, "books module stopped");
        Ok(())
    }
}

/// Create the books module from application settings
pub fn create_module(settings: &BookSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::from_settings(settings))
}

fn fail_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/FailResponse" }
            }
        }
    })
}

fn success_response(description: &str, data: serde_json::Value) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "status": { "type": "string", "enum": ["success"] },
        "message": { "type": "string" }
    });
    if !data.is_null() {
        properties["data"] = data;
    }

    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": ["status"]
                }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = serde_json::json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Book id",
        "schema": { "type": "string" }
    }]);
    let payload_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    });

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        {
                            "name": "name",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of the book name",
                            "schema": { "type": "string" }
                        },
                        {
                            "name": "reading",
                            "in": "query",
                            "required": false,
                            "description": "When present with any value, only books being read are listed",
                            "schema": { "type": "string" }
                        },
                        {
                            "name": "finished",
                            "in": "query",
                            "required": false,
                            "description": "`1` lists finished books, any other value unfinished ones",
                            "schema": { "type": "string" }
                        }
                    ],
                    "responses": {
                        "200": success_response("Matching books", serde_json::json!({
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/BookSummary" }
                                }
                            }
                        }))
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": payload_body.clone(),
                    "responses": {
                        "201": success_response("Book added", serde_json::json!({
                            "type": "object",
                            "properties": { "bookId": { "type": "string" } }
                        })),
                        "400": fail_response("Missing name, readPage greater than pageCount, or malformed body"),
                        "500": fail_response("Book could not be stored")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "responses": {
                        "200": success_response("The book", serde_json::json!({
                            "type": "object",
                            "properties": { "book": { "$ref": "#/components/schemas/Book" } }
                        })),
                        "404": fail_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "requestBody": payload_body,
                    "responses": {
                        "200": success_response("Book updated", serde_json::Value::Null),
                        "400": fail_response("Missing name, readPage greater than pageCount, or malformed body"),
                        "404": fail_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": success_response("Book deleted", serde_json::Value::Null),
                        "404": fail_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": "integer", "format": "int32" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "finished": { "type": "boolean" },
                        "reading": { "type": "boolean" },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "name", "year", "author", "summary", "publisher", "pageCount",
                        "readPage", "finished", "reading", "insertedAt", "updatedAt"
                    ]
                },
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer", "format": "int32" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                },
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "publisher": { "type": "string" }
                    },
                    "required": ["id", "name", "publisher"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use time::macros::datetime;

    fn module() -> BooksModule {
        BooksModule::new(BookStore::new(
            NanoIdGenerator::default(),
            ManualClock::new(datetime!(2024-01-01 0:00 UTC)),
        ))
    }

    #[tokio::test]
    async fn stop_discards_all_books() {
        let module = module();
        let store = module.store();
        store
            .write()
            .await
            .create(BookPayload {
                name: Some("Rust".to_string()),
                ..BookPayload::default()
            })
            .unwrap();

        module.stop().await.unwrap();

        assert!(store.read().await.is_empty());
    }

    async fn first_id(module: &BooksModule) -> String {
        module
            .store()
            .write()
            .await
            .create(BookPayload {
                name: Some("Rust".to_string()),
                ..BookPayload::default()
            })
            .unwrap()
    }

    #[tokio::test]
    async fn settings_choose_nanoid_of_configured_length() {
        let module = BooksModule::from_settings(&BookSettings {
            id_generator: IdScheme::Nanoid,
            id_length: 21,
        });

        assert_eq!(first_id(&module).await.len(), 21);
    }

    #[tokio::test]
    async fn settings_choose_uuid_ids() {
        let module = BooksModule::from_settings(&BookSettings {
            id_generator: IdScheme::Uuid,
            id_length: 3,
        });

        let id = first_id(&module).await;
        let parsed = uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn openapi_fragment_describes_every_operation() {
        let spec = module().openapi().unwrap();
        let root = &spec["paths"]["/"];
        let item = &spec["paths"]["/{id}"];

        assert!(root["get"].is_object());
        assert!(root["post"].is_object());
        assert!(item["get"].is_object());
        assert!(item["put"].is_object());
        assert!(item["delete"].is_object());
        assert!(spec["components"]["schemas"]["Book"].is_object());
    }
}
