//! Decorative image assets kept in a Notion database.
//!
//! Each row names an image (title property), carries the file (files
//! property) and its alt text (rich text property).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NotionApi, NotionError, Page};

/// A resolved image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub title: String,
    pub src: String,
    pub alt: String,
}

/// Where to find image assets and which properties describe them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAssetOptions {
    pub database_id: String,
    pub title_property: String,
    pub src_property: String,
    pub alt_property: String,
}

impl ImageAssetOptions {
    /// Options for `database_id` with the catalog's property names.
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            title_property: "Navn".into(),
            src_property: "Bilde".into(),
            alt_property: "Alt".into(),
        }
    }

    fn asset(&self, page: &Page) -> Option<ImageAsset> {
        let title = page.text(&self.title_property)?;
        let src = page.file_url(&self.src_property)?.to_string();
        let alt = page.text(&self.alt_property).unwrap_or_default();
        Some(ImageAsset { title, src, alt })
    }
}

/// Resolve the assets named in `titles`.
///
/// Titles without a matching row (or whose row has no file) are absent from
/// the result. When several rows share a title the first one wins.
pub async fn get_image_assets<A: NotionApi + ?Sized>(
    api: &A, titles: &[String], options: &ImageAssetOptions,
) -> Result<BTreeMap<String, ImageAsset>, NotionError> {
    let pages = api.get_database_pages(&options.database_id).await?;

    let mut assets = BTreeMap::new();
    for page in &pages {
        let Some(asset) = options.asset(page) else {
            tracing::debug!(page_id = %page.id, "skipping image asset row without title or file");
            continue;
        };
        if titles.contains(&asset.title) && !assets.contains_key(&asset.title) {
            assets.insert(asset.title.clone(), asset);
        }
    }

    let missing: Vec<&String> = titles.iter().filter(|t| !assets.contains_key(*t)).collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "image assets not found");
    }

    Ok(assets)
}
