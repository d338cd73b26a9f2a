//! image_assets tool implementation.
//!
//! Resolves decorative images by title from the image asset database.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use dranks_core::Error;

use super::{Catalog, json_result};

/// Input parameters for image_assets tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageAssetsParams {
    /// Image titles to resolve. Order and duplicates do not matter.
    pub titles: Vec<String>,
}

/// Implementation of the image_assets tool.
pub async fn image_assets_impl(catalog: &Catalog, params: ImageAssetsParams) -> Result<CallToolResult, McpError> {
    let Some(options) = &catalog.image_assets else {
        return Err(Error::InvalidInput("image asset database is not configured".into()).into());
    };

    let titles: Vec<String> =
        params.titles.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
    if titles.is_empty() {
        return Err(Error::InvalidInput("titles cannot be empty".into()).into());
    }

    let assets = catalog.notion.get_image_assets(&titles, options).await?;
    Ok(json_result(&*assets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{result_text, testing};

    #[tokio::test]
    async fn test_image_assets() {
        let catalog = testing::catalog(true);
        let params = ImageAssetsParams { titles: vec!["appelsiner".into(), "sitron".into()] };

        let result = image_assets_impl(&catalog, params).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&result_text(&result)).unwrap();
        assert_eq!(json["appelsiner"]["alt"], "Oranges");
        assert!(json.get("sitron").is_none());
    }

    #[tokio::test]
    async fn test_reordered_titles_hit_same_entry() {
        let catalog = testing::catalog(true);
        let first = ImageAssetsParams { titles: vec!["sitron".into(), "appelsiner".into()] };
        let second = ImageAssetsParams { titles: vec!["appelsiner".into(), "sitron".into(), "sitron".into()] };

        image_assets_impl(&catalog, first).await.unwrap();
        image_assets_impl(&catalog, second).await.unwrap();
        assert_eq!(catalog.notion.image_assets_cache().len(), 1);
    }

    #[tokio::test]
    async fn test_image_assets_not_configured() {
        let catalog = testing::catalog(false);
        let params = ImageAssetsParams { titles: vec!["appelsiner".into()] };
        let err = image_assets_impl(&catalog, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_image_assets_empty_titles() {
        let catalog = testing::catalog(true);
        let err = image_assets_impl(&catalog, ImageAssetsParams { titles: vec![" ".into()] }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
