// ABOUTME: Maps catalog errors onto MCP JSON-RPC error codes
// ABOUTME: Unknown operations and bad arguments keep their own classes

use apicatalog_core::CatalogError;
use rmcp::{model::ErrorCode, ErrorData as McpError};

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

pub fn to_mcp_error(err: CatalogError) -> McpError {
    let code = match &err {
        CatalogError::UnknownOperation(_) => METHOD_NOT_FOUND,
        CatalogError::InvalidInput(_) | CatalogError::UnsupportedLanguage { .. } => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    };
    McpError {
        code: ErrorCode(code),
        message: err.to_string().into(),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            to_mcp_error(CatalogError::unknown_operation("nope")).code,
            ErrorCode(METHOD_NOT_FOUND)
        );
        assert_eq!(
            to_mcp_error(CatalogError::invalid_input("limit must be a positive integer")).code,
            ErrorCode(INVALID_PARAMS)
        );

        let internal = to_mcp_error(CatalogError::EmptyCatalog);
        assert_eq!(internal.code, ErrorCode(INTERNAL_ERROR));
        assert_eq!(internal.message, "The API catalog has not been loaded yet");
    }
}
