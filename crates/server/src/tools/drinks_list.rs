//! drinks_list tool implementation.
//!
//! Lists the catalog, optionally narrowed by a title search and a set of
//! alcohols, and groups the result by alcohol in catalog order.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use dranks_client::{Alcohol, Drink, DrinksAndMetainfo};

use super::{Catalog, json_result};

/// Input parameters for drinks_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DrinksListParams {
    /// Case-insensitive search in drink titles (optional).
    #[serde(default)]
    pub q: Option<String>,

    /// Only include drinks based on one of these alcohols (optional).
    /// Empty or missing means all alcohols.
    #[serde(default)]
    pub alcohols: Option<Vec<String>>,
}

/// Drinks sharing one alcohol.
#[derive(Debug, Clone, Serialize)]
pub struct AlcoholGroup<'a> {
    pub alcohol: &'a Alcohol,
    pub drinks: Vec<&'a Drink>,
}

/// Output structure for drinks_list tool.
#[derive(Debug, Clone, Serialize)]
pub struct DrinksListOutput<'a> {
    /// Alcohols in use, in catalog order.
    pub alcohols: &'a [Alcohol],
    /// Drinks matching the filter.
    pub drinks: Vec<&'a Drink>,
    /// Matching drinks grouped by alcohol; groups may be empty.
    pub drinks_by_alcohol: Vec<AlcoholGroup<'a>>,
    /// The filter that was applied.
    pub filter: &'a DrinksListParams,
}

/// Lowercase with runs of whitespace collapsed to one space.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Apply `filter` to the catalog and group the matches.
pub fn list_drinks<'a>(catalog: &'a DrinksAndMetainfo, filter: &'a DrinksListParams) -> DrinksListOutput<'a> {
    let query = filter.q.as_deref().map(normalize).filter(|q| !q.is_empty());
    let alcohols = filter.alcohols.as_deref().filter(|a| !a.is_empty());

    let drinks: Vec<&Drink> = catalog
        .drinks
        .iter()
        .filter(|drink| query.as_ref().is_none_or(|q| normalize(&drink.title).contains(q.as_str())))
        .filter(|drink| alcohols.is_none_or(|a| a.contains(&drink.alcohol.title)))
        .collect();

    let drinks_by_alcohol = catalog
        .drinks_metainfo
        .alcohols
        .iter()
        .map(|alcohol| AlcoholGroup {
            alcohol,
            drinks: drinks.iter().copied().filter(|d| d.alcohol.title == alcohol.title).collect(),
        })
        .collect();

    DrinksListOutput { alcohols: &catalog.drinks_metainfo.alcohols, drinks, drinks_by_alcohol, filter }
}

/// Implementation of the drinks_list tool.
pub async fn drinks_list_impl(catalog: &Catalog, params: DrinksListParams) -> Result<CallToolResult, McpError> {
    let drinks = catalog.drinks.get_drinks_and_metainfo().await?;
    let output = list_drinks(&drinks, &params);

    tracing::debug!(matched = output.drinks.len(), total = drinks.drinks.len(), "listed drinks");

    Ok(json_result(&output)?)
}
