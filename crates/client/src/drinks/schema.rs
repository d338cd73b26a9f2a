//! Drink catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notion::Block;

/// A spirit a drink is based on, with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alcohol {
    pub title: String,
    pub color: String,
}

/// A drink's catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: String,
    pub title: String,
    /// URL-safe form of the title, used for lookups.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration_url: Option<String>,
    pub alcohol: Alcohol,
    pub tags: Vec<String>,
    pub groups: Vec<String>,
}

/// Catalog-wide information taken from the database itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinksMetainfo {
    pub alcohols: Vec<Alcohol>,
    pub last_edited_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinksAndMetainfo {
    pub drinks: Vec<Drink>,
    pub drinks_metainfo: DrinksMetainfo,
}

/// A recipe page split into sections, each a list of Notion blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparations: Option<Vec<Block>>,
    pub ingredients: Vec<Block>,
    pub steps: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Block>>,
    pub references: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkWithBody {
    #[serde(flatten)]
    pub drink: Drink,
    #[serde(flatten)]
    pub body: DrinkBody,
}
