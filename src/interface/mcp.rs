//! MCP Server for book-catalog
//!
//! MCP Protocol (stdio) <-> application::CatalogStore
//!
//! 8 tools: book_add, book_list, book_find, book_delete, book_edit, book_filter, book_sort, book_stats

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::report::{ReportService, BOOK_NOT_FOUND};
use crate::application::service::CatalogStore;
use crate::domain::model::catalog::{BookPatch, SortKey};
use crate::infra::json_store::JsonCatalogRepository;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。catalog_pathはカタログのJSONファイル。
pub async fn run(catalog_path: PathBuf) -> anyhow::Result<()> {
    let server = CatalogMcpServer::new(catalog_path);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

type Store = CatalogStore<JsonCatalogRepository>;

#[derive(Clone)]
struct CatalogMcpServer {
    store: Arc<Mutex<Store>>,
    tool_router: ToolRouter<Self>,
}

impl CatalogMcpServer {
    fn new(catalog_path: PathBuf) -> Self {
        let store = CatalogStore::load(JsonCatalogRepository::new(catalog_path));
        Self {
            store: Arc::new(Mutex::new(store)),
            tool_router: Self::tool_router(),
        }
    }

    /// ツール呼び出しは1つずつ直列に実行する。
    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, McpError>,
    ) -> Result<T, McpError> {
        let mut guard = self
            .store
            .lock()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))?;
        f(&mut *guard)
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Domain(_) => McpError::invalid_params(format!("{e}"), None),
            AppError::Storage(_) => McpError::internal_error(format!("{e}"), None),
        }
    }

    // --- Tool bodies (同期処理) ---

    fn add(&self, req: McpBookAddRequest) -> Result<String, McpError> {
        self.with_store(|store| {
            let book = store
                .add(&req.title, &req.author, req.price, req.year)
                .map_err(Self::to_mcp_error)?;
            Ok(format!("Added: \"{}\"", book.title()))
        })
    }

    fn list(&self) -> Result<String, McpError> {
        self.with_store(|store| Ok(ReportService::render_catalog(store.list())))
    }

    fn find(&self, req: McpTitleRequest) -> Result<String, McpError> {
        self.with_store(|store| {
            Ok(match store.find_by_title(&req.title) {
                Some(book) => ReportService::render_book(book),
                None => BOOK_NOT_FOUND.to_string(),
            })
        })
    }

    fn delete(&self, req: McpTitleRequest) -> Result<String, McpError> {
        self.with_store(|store| {
            let removed = store
                .delete_by_title(&req.title)
                .map_err(Self::to_mcp_error)?;
            Ok(match removed {
                Some(book) => format!("Deleted: \"{}\"", book.title()),
                None => BOOK_NOT_FOUND.to_string(),
            })
        })
    }

    fn edit(&self, req: McpBookEditRequest) -> Result<String, McpError> {
        let patch = BookPatch {
            title: req.new_title,
            author: req.new_author,
            price: req.new_price,
            year: req.new_year,
        };
        self.with_store(|store| {
            let outcome = store
                .edit_by_title(&req.title, patch)
                .map_err(Self::to_mcp_error)?;
            Ok(match outcome {
                Some(outcome) => ReportService::render_edit(&outcome),
                None => BOOK_NOT_FOUND.to_string(),
            })
        })
    }

    fn filter(&self, req: McpAuthorRequest) -> Result<String, McpError> {
        self.with_store(|store| {
            let books = store.filter_by_author(&req.author);
            Ok(ReportService::render_author_listing(&req.author, &books))
        })
    }

    fn sort(&self, req: McpSortRequest) -> Result<String, McpError> {
        let key: SortKey = req.mode.parse().map_err(|e| {
            McpError::invalid_params(format!("{e}. Use: price_asc, price_desc, year_asc"), None)
        })?;
        self.with_store(|store| {
            store.sort(key);
            Ok(format!(
                "Sorted by {}.\n\n{}",
                key.label(),
                ReportService::render_catalog(store.list())
            ))
        })
    }

    fn stats(&self) -> Result<String, McpError> {
        self.with_store(|store| {
            let stats = store.statistics();
            Ok(ReportService::render_statistics(stats.as_ref()))
        })
    }
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for CatalogMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "book-catalog".to_string(),
                title: Some("Book Catalog".to_string()),
                description: Some(
                    "Local book catalog: add, search, edit, delete, sort and summarize books."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a local book catalog stored as JSON.\n\
                 \n\
                 Title lookups for `book_delete` and `book_edit` are case-insensitive exact matches \
                 and act on the first match only. `book_find` and `book_filter` match substrings."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookAddRequest {
    #[schemars(description = "Book title (required, non-empty)")]
    pub title: String,
    #[schemars(description = "Author name (required, non-empty)")]
    pub author: String,
    #[schemars(description = "Price, must be greater than 0")]
    pub price: f64,
    #[schemars(description = "Publication year, must be greater than 0")]
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpTitleRequest {
    #[schemars(description = "Book title (case-insensitive)")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpAuthorRequest {
    #[schemars(description = "Author name or part of it (case-insensitive)")]
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookEditRequest {
    #[schemars(description = "Exact title of the book to edit (case-insensitive)")]
    pub title: String,
    #[schemars(description = "New title (omit or empty to keep current)")]
    pub new_title: Option<String>,
    #[schemars(description = "New author (omit or empty to keep current)")]
    pub new_author: Option<String>,
    #[schemars(
        description = "New price as text (omit or empty to keep current; invalid values are skipped)"
    )]
    pub new_price: Option<String>,
    #[schemars(
        description = "New year as text (omit or empty to keep current; invalid values are skipped)"
    )]
    pub new_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSortRequest {
    #[schemars(description = "Sort mode: price_asc, price_desc, or year_asc")]
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpEmptyRequest {}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl CatalogMcpServer {
    #[tool(
        name = "book_add",
        description = "Append a new book to the catalog.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_add(
        &self,
        Parameters(req): Parameters<McpBookAddRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.add(req).map(text_result)
    }

    #[tool(
        name = "book_list",
        description = "Show every book in catalog order.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_list(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.list().map(text_result)
    }

    #[tool(
        name = "book_find",
        description = "Find the first book whose title contains the given text.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_find(
        &self,
        Parameters(req): Parameters<McpTitleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.find(req).map(text_result)
    }

    #[tool(
        name = "book_delete",
        description = "Delete the first book whose title matches exactly (case-insensitive).",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_delete(
        &self,
        Parameters(req): Parameters<McpTitleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.delete(req).map(text_result)
    }

    #[tool(
        name = "book_edit",
        description = "Edit the first book whose title matches exactly. Only provided, non-empty fields change.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_edit(
        &self,
        Parameters(req): Parameters<McpBookEditRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.edit(req).map(text_result)
    }

    #[tool(
        name = "book_filter",
        description = "List all books whose author contains the given text.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_filter(
        &self,
        Parameters(req): Parameters<McpAuthorRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.filter(req).map(text_result)
    }

    #[tool(
        name = "book_sort",
        description = "Reorder the catalog: price_asc, price_desc, or year_asc. The new order is saved with the next change.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_sort(
        &self,
        Parameters(req): Parameters<McpSortRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.sort(req).map(text_result)
    }

    #[tool(
        name = "book_stats",
        description = "Show count, average price, oldest and most expensive book.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_stats(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.stats().map(text_result)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> (tempfile::TempDir, CatalogMcpServer) {
        let dir = tempfile::tempdir().unwrap();
        let server = CatalogMcpServer::new(dir.path().join("catalog.json"));
        (dir, server)
    }

    fn add(server: &CatalogMcpServer, title: &str, author: &str, price: f64, year: i32) {
        server
            .add(McpBookAddRequest {
                title: title.into(),
                author: author.into(),
                price,
                year,
            })
            .unwrap();
    }

    #[test]
    fn server_info() {
        let (_dir, server) = server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "book-catalog");
        assert!(!info.server_info.version.is_empty());
    }

    #[test]
    fn add_then_find() {
        let (_dir, server) = server();
        add(&server, "Emma", "Jane Austen", 12.0, 1815);

        let found = server
            .find(McpTitleRequest {
                title: "emm".into(),
            })
            .unwrap();
        assert!(found.contains("Title: Emma"));
        assert!(found.contains("Price: $12.00"));
    }

    #[test]
    fn add_rejects_invalid_price_as_invalid_params() {
        let (_dir, server) = server();
        let err = server
            .add(McpBookAddRequest {
                title: "Emma".into(),
                author: "Jane Austen".into(),
                price: 0.0,
                year: 1815,
            })
            .unwrap_err();
        assert!(err.message.contains("price"));
        assert_eq!(server.list().unwrap(), "No books in the catalog.");
    }

    #[test]
    fn delete_missing_is_not_an_error() {
        let (_dir, server) = server();
        let out = server
            .delete(McpTitleRequest {
                title: "Nothing".into(),
            })
            .unwrap();
        assert_eq!(out, BOOK_NOT_FOUND);
    }

    #[test]
    fn edit_reports_rejected_fields() {
        let (_dir, server) = server();
        add(&server, "Dune", "Frank Herbert", 25.0, 1965);

        let out = server
            .edit(McpBookEditRequest {
                title: "DUNE".into(),
                new_title: None,
                new_author: None,
                new_price: Some("free".into()),
                new_year: Some("1966".into()),
            })
            .unwrap();
        assert!(out.contains("Invalid price"));
        assert!(out.contains("Year: 1966"));
        assert!(out.contains("Price: $25.00"));
    }

    #[test]
    fn sort_rejects_unknown_mode() {
        let (_dir, server) = server();
        assert!(server
            .sort(McpSortRequest {
                mode: "by_title".into()
            })
            .is_err());
    }

    #[test]
    fn sort_and_stats() {
        let (_dir, server) = server();
        add(&server, "Old", "a", 10.0, 1950);
        add(&server, "New", "b", 50.0, 1980);

        let sorted = server
            .sort(McpSortRequest {
                mode: "price_desc".into(),
            })
            .unwrap();
        let new_pos = sorted.find("Title: New").unwrap();
        let old_pos = sorted.find("Title: Old").unwrap();
        assert!(new_pos < old_pos);

        let stats = server.stats().unwrap();
        assert!(stats.contains("Average price: $30.00"));
    }

    #[test]
    fn edit_request_optional_fields() {
        let req: McpBookEditRequest = serde_json::from_str(r#"{"title": "Emma"}"#).unwrap();
        assert_eq!(req.title, "Emma");
        assert!(req.new_title.is_none());
        assert!(req.new_price.is_none());
    }

    #[test]
    fn sort_request_parse() {
        let req: McpSortRequest = serde_json::from_str(r#"{"mode": "year_asc"}"#).unwrap();
        assert_eq!(req.mode.parse::<SortKey>().unwrap(), SortKey::YearAscending);
    }
}
