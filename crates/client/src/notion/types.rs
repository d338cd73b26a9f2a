//! Notion API object types.
//!
//! Only the parts of the Notion object model the catalog reads are typed.
//! Block payloads are kept as raw JSON so they can be handed on untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a paginated list endpoint.
#[derive(Debug, Deserialize)]
pub struct PaginatedList<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A span of rich text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Join rich text spans into plain text.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}

/// A select or multi-select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "default".into()
}

/// Location of an uploaded or external file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
}

/// A file reference: page covers and entries of a files property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External {
        external: FileUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    File {
        file: FileUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external, .. } => &external.url,
            FileObject::File { file, .. } => &file.url,
        }
    }
}

/// The value of a page property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Files { files: Vec<FileObject> },
    #[serde(other)]
    Other,
}

/// The schema of a database property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatabaseProperty {
    Select { select: SelectSchema },
    MultiSelect { multi_select: SelectSchema },
    #[serde(other)]
    Other,
}

/// Options declared for a select or multi-select property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectSchema {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

/// A Notion database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: BTreeMap<String, DatabaseProperty>,
}

impl Database {
    /// Options of the select property `name`, if it is one.
    pub fn select_options(&self, name: &str) -> Option<&[SelectOption]> {
        match self.properties.get(name)? {
            DatabaseProperty::Select { select } => Some(&select.options),
            _ => None,
        }
    }
}

/// A Notion page (a database row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Page {
    /// Plain text of the page's title property, whatever it is called.
    pub fn title(&self) -> Option<String> {
        self.properties.values().find_map(|p| match p {
            PropertyValue::Title { title } => Some(plain_text(title)),
            _ => None,
        })
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover.as_ref().map(FileObject::url)
    }

    /// Plain text of a title or rich text property.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            PropertyValue::Title { title } => Some(plain_text(title)),
            PropertyValue::RichText { rich_text } => Some(plain_text(rich_text)),
            _ => None,
        }
    }

    /// The chosen option of a select property.
    pub fn select(&self, name: &str) -> Option<&SelectOption> {
        match self.properties.get(name)? {
            PropertyValue::Select { select } => select.as_ref(),
            _ => None,
        }
    }

    /// Names of the chosen options of a multi-select property.
    pub fn multi_select(&self, name: &str) -> Option<Vec<String>> {
        match self.properties.get(name)? {
            PropertyValue::MultiSelect { multi_select } => Some(multi_select.iter().map(|o| o.name.clone()).collect()),
            _ => None,
        }
    }

    /// URL of the first file in a files property.
    pub fn file_url(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Files { files } => files.first().map(FileObject::url),
            _ => None,
        }
    }
}

/// A content block.
///
/// `children` is filled in by recursive fetches; Notion itself only reports
/// `has_children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

const HEADING_KINDS: [&str; 3] = ["heading_1", "heading_2", "heading_3"];

impl Block {
    /// The type-specific payload, e.g. `block["paragraph"]`.
    pub fn payload(&self) -> Option<&Value> {
        self.rest.get(&self.kind)
    }

    pub fn is_heading(&self) -> bool {
        HEADING_KINDS.contains(&self.kind.as_str())
    }

    /// Plain text of the payload's `rich_text`, empty if it has none.
    pub fn text(&self) -> String {
        let Some(spans) = self.payload().and_then(|p| p.get("rich_text")) else {
            return String::new();
        };
        serde_json::from_value::<Vec<RichText>>(spans.clone())
            .map(|spans| plain_text(&spans))
            .unwrap_or_default()
    }
}
