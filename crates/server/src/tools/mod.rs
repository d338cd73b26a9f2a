//! MCP tool implementations.
//!
//! This module contains all tools exposed by the dranks server.

pub mod drink_get;
pub mod drinks_list;
pub mod image_assets;

use std::sync::Arc;

use dranks_client::{DrinksClientCached, ImageAssetOptions, NotionClientCached};
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use dranks_core::Error;

pub use drink_get::DrinkGetParams;
pub use drinks_list::DrinksListParams;
pub use image_assets::ImageAssetsParams;

/// The cached sources the tools read from.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub drinks: Arc<DrinksClientCached>,
    pub notion: NotionClientCached,
    /// Where decorative images live; `None` disables image lookups.
    pub image_assets: Option<ImageAssetOptions>,
}

/// Serialize a tool's output as a pretty JSON text result.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, Error> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Text of the first content item of a tool result.
#[cfg(test)]
fn result_text(result: &CallToolResult) -> String {
    result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod testing {
    //! A small in-memory Notion for tool tests.

    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use dranks_client::notion::{Block, Database, NotionApi, NotionError, Page};
    use dranks_client::{DrinksClient, DrinksClientCached, ImageAssetOptions, NotionClientCached};
    use dranks_core::CacheOptions;
    use serde_json::json;

    use super::Catalog;

    #[derive(Default)]
    pub struct StaticNotion {
        pub database: Option<Database>,
        pub pages: HashMap<String, Vec<Page>>,
        pub blocks: HashMap<String, Vec<Block>>,
    }

    #[async_trait]
    impl NotionApi for StaticNotion {
        async fn get_database(&self, database_id: &str) -> Result<Database, NotionError> {
            self.database.clone().ok_or_else(|| NotionError::NotFound(database_id.to_string()))
        }

        async fn get_database_pages(&self, database_id: &str) -> Result<Vec<Page>, NotionError> {
            self.pages.get(database_id).cloned().ok_or_else(|| NotionError::NotFound(database_id.to_string()))
        }

        async fn get_page(&self, page_id: &str) -> Result<Page, NotionError> {
            self.pages
                .values()
                .flatten()
                .find(|p| p.id == page_id)
                .cloned()
                .ok_or_else(|| NotionError::NotFound(page_id.to_string()))
        }

        async fn get_blocks_with_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
            self.blocks.get(block_id).cloned().ok_or_else(|| NotionError::NotFound(block_id.to_string()))
        }
    }

    fn drink(id: &str, title: &str, alcohol: &str) -> Page {
        serde_json::from_value(json!({
            "id": id,
            "last_edited_time": "2023-05-01T10:00:00.000Z",
            "properties": {
                "Navn": {"type": "title", "title": [{"plain_text": title}]},
                "Alkohol": {"type": "select", "select": {"name": alcohol, "color": "blue"}},
                "Tags": {"type": "multi_select", "multi_select": []},
                "Gruppering": {"type": "multi_select", "multi_select": []}
            }
        }))
        .unwrap()
    }

    fn body(prefix: &str) -> Vec<Block> {
        let block = |n: &str, kind: &str, text: &str| -> Block {
            let mut value = json!({"id": format!("{prefix}-{n}"), "type": kind});
            value[kind] = json!({"rich_text": [{"plain_text": text}]});
            serde_json::from_value(value).unwrap()
        };
        vec![
            block("h1", "heading_2", "Ingredienser"),
            block("i1", "bulleted_list_item", "4 cl gin"),
            block("h2", "heading_2", "Fremgangsmåte"),
            block("s1", "paragraph", "Rist"),
            block("h3", "heading_2", "Referanser"),
            block("r1", "bookmark", ""),
        ]
    }

    /// Gin, Rum and Vodka declared; two gin drinks and one rum drink.
    pub fn catalog(with_assets: bool) -> Catalog {
        let mut notion = StaticNotion {
            database: Some(
                serde_json::from_value(json!({
                    "id": "db",
                    "last_edited_time": "2023-05-02T10:00:00.000Z",
                    "properties": {"Alkohol": {"type": "select", "select": {"options": [
                        {"name": "Gin", "color": "blue"},
                        {"name": "Rum", "color": "brown"},
                        {"name": "Vodka", "color": "gray"}
                    ]}}}
                }))
                .unwrap(),
            ),
            ..Default::default()
        };
        notion.pages.insert(
            "db".into(),
            vec![drink("d1", "Negroni", "Gin"), drink("d2", "Mojito", "Rum"), drink("d3", "Gin Fizz", "Gin")],
        );
        for id in ["d1", "d2", "d3"] {
            notion.blocks.insert(id.into(), body(id));
        }
        notion.pages.insert(
            "assets".into(),
            vec![
                serde_json::from_value(json!({
                    "id": "a1",
                    "last_edited_time": "2023-05-01T10:00:00.000Z",
                    "properties": {
                        "Navn": {"type": "title", "title": [{"plain_text": "appelsiner"}]},
                        "Bilde": {"type": "files", "files": [{"type": "external", "external": {"url": "https://img.example/o.png"}}]},
                        "Alt": {"type": "rich_text", "rich_text": [{"plain_text": "Oranges"}]}
                    }
                }))
                .unwrap(),
            ],
        );

        let api: Arc<dyn NotionApi> = Arc::new(notion);
        let drinks = DrinksClientCached::new(DrinksClient::new(Arc::clone(&api), "db"), CacheOptions::default());
        Catalog {
            drinks: Arc::new(drinks),
            notion: NotionClientCached::new(api, CacheOptions::default()),
            image_assets: with_assets.then(|| ImageAssetOptions::new("assets")),
        }
    }
}
