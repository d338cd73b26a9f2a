//! In-memory Notion stand-in and object builders for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::notion::{Block, Database, NotionApi, NotionError, Page};

type Failure = Box<dyn Fn() -> NotionError + Send + Sync>;

/// Fake Notion API that records every call.
#[derive(Default)]
pub struct FakeNotion {
    databases: Mutex<HashMap<String, Database>>,
    pages: Mutex<HashMap<String, Vec<Page>>>,
    blocks: Mutex<HashMap<String, Vec<Block>>>,
    failure: Mutex<Option<Failure>>,
    delay: Mutex<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeNotion {
    pub fn add_database(&self, database: Database) {
        self.databases.lock().insert(database.id.clone(), database);
    }

    pub fn add_pages(&self, database_id: &str, pages: Vec<Page>) {
        self.pages.lock().insert(database_id.to_string(), pages);
    }

    pub fn add_blocks(&self, page_id: &str, blocks: Vec<Block>) {
        self.blocks.lock().insert(page_id.to_string(), blocks);
    }

    /// Make every subsequent call fail with the produced error.
    pub fn fail_with(&self, failure: impl Fn() -> NotionError + Send + Sync + 'static) {
        *self.failure.lock() = Some(Box::new(failure));
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Answer every call after `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of calls made to `operation`, e.g. `"get_page"`.
    pub fn calls(&self, operation: &str) -> usize {
        let prefix = format!("{operation}:");
        self.calls.lock().iter().filter(|c| c.starts_with(&prefix)).count()
    }

    /// Every call made, as `operation:id`.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn enter(&self, operation: &str, id: &str) -> Result<(), NotionError> {
        self.calls.lock().push(format!("{operation}:{id}"));
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock().as_ref() {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotionApi for FakeNotion {
    async fn get_database(&self, database_id: &str) -> Result<Database, NotionError> {
        self.enter("get_database", database_id).await?;
        self.databases
            .lock()
            .get(database_id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound(database_id.to_string()))
    }

    async fn get_database_pages(&self, database_id: &str) -> Result<Vec<Page>, NotionError> {
        self.enter("get_database_pages", database_id).await?;
        self.pages
            .lock()
            .get(database_id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound(database_id.to_string()))
    }

    async fn get_page(&self, page_id: &str) -> Result<Page, NotionError> {
        self.enter("get_page", page_id).await?;
        self.pages
            .lock()
            .values()
            .flatten()
            .find(|p| p.id == page_id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound(page_id.to_string()))
    }

    async fn get_blocks_with_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        self.enter("get_blocks_with_children", block_id).await?;
        self.blocks
            .lock()
            .get(block_id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound(block_id.to_string()))
    }
}

/// The drinks database with `Alkohol` select options.
pub fn drinks_database(id: &str, alcohols: &[(&str, &str)]) -> Database {
    let options: Vec<_> = alcohols.iter().map(|(name, color)| json!({"name": name, "color": color})).collect();
    serde_json::from_value(json!({
        "object": "database",
        "id": id,
        "last_edited_time": "2023-05-02T08:30:00.000Z",
        "title": [{"plain_text": "Dranks"}],
        "properties": {
            "Navn": {"id": "title", "name": "Navn", "type": "title", "title": {}},
            "Alkohol": {"id": "a", "name": "Alkohol", "type": "select", "select": {"options": options}},
            "Tags": {"id": "t", "name": "Tags", "type": "multi_select", "multi_select": {"options": []}}
        }
    }))
    .unwrap()
}

/// A drink row. `alcohol` is `(name, color)`; `None` leaves the select empty.
pub fn drink_page(id: &str, title: &str, alcohol: Option<(&str, &str)>, tags: &[&str]) -> Page {
    let select = alcohol.map(|(name, color)| json!({"name": name, "color": color}));
    let tags: Vec<_> = tags.iter().map(|t| json!({"name": t, "color": "default"})).collect();
    serde_json::from_value(json!({
        "object": "page",
        "id": id,
        "last_edited_time": "2023-05-01T10:00:00.000Z",
        "cover": {"type": "external", "external": {"url": format!("https://img.example/{id}.png")}},
        "properties": {
            "Navn": {"id": "title", "type": "title", "title": [{"plain_text": title}]},
            "Alkohol": {"id": "a", "type": "select", "select": select},
            "Tags": {"id": "t", "type": "multi_select", "multi_select": tags},
            "Gruppering": {"id": "g", "type": "multi_select", "multi_select": [{"name": "Klassikere"}]}
        }
    }))
    .unwrap()
}

/// An image asset row.
pub fn asset_page(id: &str, title: &str, src: Option<&str>, alt: &str) -> Page {
    let files: Vec<_> =
        src.into_iter().map(|url| json!({"name": "image", "type": "external", "external": {"url": url}})).collect();
    serde_json::from_value(json!({
        "object": "page",
        "id": id,
        "last_edited_time": "2023-05-01T10:00:00.000Z",
        "properties": {
            "Navn": {"id": "title", "type": "title", "title": [{"plain_text": title}]},
            "Bilde": {"id": "b", "type": "files", "files": files},
            "Alt": {"id": "c", "type": "rich_text", "rich_text": [{"plain_text": alt}]}
        }
    }))
    .unwrap()
}

/// A block of `kind` whose payload has `text` as its rich text.
pub fn block(id: &str, kind: &str, text: &str) -> Block {
    let mut value = json!({"object": "block", "id": id, "type": kind, "has_children": false});
    value[kind] = json!({"rich_text": [{"plain_text": text}], "color": "default"});
    serde_json::from_value(value).unwrap()
}

pub fn heading(id: &str, text: &str) -> Block {
    block(id, "heading_2", text)
}

pub fn with_children(mut parent: Block, children: Vec<Block>) -> Block {
    parent.has_children = !children.is_empty();
    parent.children = children;
    parent
}

/// A body with every section filled in.
pub fn drink_body_blocks(prefix: &str) -> Vec<Block> {
    vec![
        block(&format!("{prefix}-c1"), "callout", "Bruk god vermut"),
        heading(&format!("{prefix}-h1"), "Forbredelser"),
        block(&format!("{prefix}-p1"), "paragraph", "Kjøl ned glasset"),
        heading(&format!("{prefix}-h2"), "Ingredienser"),
        block(&format!("{prefix}-i1"), "bulleted_list_item", "3 cl gin"),
        block(&format!("{prefix}-i2"), "bulleted_list_item", "3 cl Campari"),
        heading(&format!("{prefix}-h3"), "Fremgangsmåte"),
        block(&format!("{prefix}-s1"), "numbered_list_item", "Rør med is"),
        heading(&format!("{prefix}-h4"), "Referanser"),
        block(&format!("{prefix}-r1"), "bookmark", ""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_records_calls_and_failures() {
        let notion = FakeNotion::default();
        notion.add_blocks("p1", vec![heading("h1", "Ingredienser")]);

        assert_eq!(notion.get_blocks_with_children("p1").await.unwrap().len(), 1);
        notion.fail_with(|| NotionError::RateLimited);
        assert!(matches!(notion.get_page("p1").await, Err(NotionError::RateLimited)));
        notion.recover();
        assert!(matches!(notion.get_page("p1").await, Err(NotionError::NotFound(_))));

        assert_eq!(notion.calls("get_page"), 2);
        assert_eq!(notion.call_log(), vec!["get_blocks_with_children:p1", "get_page:p1", "get_page:p1"]);
    }
}
