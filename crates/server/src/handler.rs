//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    Catalog, DrinkGetParams, DrinksListParams, ImageAssetsParams, drink_get::drink_get_impl,
    drinks_list::drinks_list_impl, image_assets::image_assets_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for dranks.
#[derive(Clone)]
pub struct DranksServer {
    catalog: Catalog,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl DranksServer {
    /// Create a new server handler over the cached catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, tool_router: Self::tool_router() }
    }

    /// List drinks, optionally filtered by title search and alcohols.
    #[tool(
        description = "List drinks in the catalog. Optional case-insensitive title search (q) and alcohol filter. \
                       Returns matching drinks, the alcohols in use, and drinks grouped by alcohol."
    )]
    async fn drinks_list(&self, params: Parameters<DrinksListParams>) -> Result<CallToolResult, McpError> {
        drinks_list_impl(&self.catalog, params.0).await
    }

    /// Get one drink with its recipe by slug.
    #[tool(
        description = "Get a drink by slug with its recipe: preparations, ingredients, steps, notes and references. \
                       Also returns the decorative recipe images when available."
    )]
    async fn drink_get(&self, params: Parameters<DrinkGetParams>) -> Result<CallToolResult, McpError> {
        drink_get_impl(&self.catalog, params.0).await
    }

    /// Resolve image assets by title.
    #[tool(description = "Resolve decorative images by title. Returns a map of title to image src and alt text.")]
    async fn image_assets(&self, params: Parameters<ImageAssetsParams>) -> Result<CallToolResult, McpError> {
        image_assets_impl(&self.catalog, params.0).await
    }
}

impl ServerHandler for DranksServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "dranks".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Drink recipes from the Notion catalog. Use drinks_list to browse and drink_get for a recipe.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[test]
    fn test_tools_are_registered() {
        let server = DranksServer::new(testing::catalog(false));
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["drink_get", "drinks_list", "image_assets"]);
    }

    #[test]
    fn test_server_info() {
        let server = DranksServer::new(testing::catalog(false));
        assert_eq!(server.get_info().server_info.name, "dranks");
    }
}
