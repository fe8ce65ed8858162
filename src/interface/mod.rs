pub mod mcp;
pub mod shell;
