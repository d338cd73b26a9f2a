//! drink_get tool implementation.
//!
//! Returns one drink with its recipe body, looked up by slug, together with
//! the decorative images shown next to a recipe.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use dranks_client::{DrinkWithBody, ImageAsset};
use dranks_core::Error;

use super::{Catalog, json_result};

/// Images shown on every recipe.
const RECIPE_IMAGE_TITLES: [&str; 1] = ["appelsiner"];

/// Input parameters for drink_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrinkGetParams {
    /// The drink's slug, e.g. "dark-n-stormy".
    pub slug: String,
}

/// Output structure for drink_get tool.
#[derive(Debug, Serialize)]
pub struct DrinkGetOutput<'a> {
    pub drink: &'a DrinkWithBody,
    /// Resolved images by title; empty when images are not configured or unavailable.
    pub images: &'a BTreeMap<String, ImageAsset>,
}

/// Implementation of the drink_get tool.
pub async fn drink_get_impl(catalog: &Catalog, params: DrinkGetParams) -> Result<CallToolResult, McpError> {
    let slug = params.slug.trim();
    if slug.is_empty() {
        return Err(Error::InvalidInput("slug cannot be empty".into()).into());
    }

    // Images are decoration; a failed lookup still returns the recipe.
    let images = async {
        let options = catalog.image_assets.as_ref()?;
        let titles: Vec<String> = RECIPE_IMAGE_TITLES.into_iter().map(String::from).collect();
        catalog
            .notion
            .get_image_assets(&titles, options)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "recipe images unavailable"))
            .ok()
    };
    let (drink, images) = futures::join!(catalog.drinks.find_drink_by_slug(slug), images);
    let drink = drink?;
    let empty = BTreeMap::new();

    let output = DrinkGetOutput { drink: &drink, images: images.as_deref().unwrap_or(&empty) };
    Ok(json_result(&output)?)
}
