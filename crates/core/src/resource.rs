//! The `perfex://customers/search/{keysearch}` resource template.

use crate::errors::ToolError;
use crate::schema::decode_path_segment;

pub const CUSTOMER_SEARCH_TEMPLATE: &str = "perfex://customers/search/{keysearch}";
pub const CUSTOMER_SEARCH_NAME: &str = "Search customers by keyword";
pub const CUSTOMER_SEARCH_DESCRIPTION: &str = "Search for customers by keyword";
pub const JSON_MIME_TYPE: &str = "application/json";

/// Tool whose route serves template reads.
pub const CUSTOMER_SEARCH_TOOL: &str = "search_customers";

const CUSTOMER_SEARCH_PREFIX: &str = "perfex://customers/search/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceOutput {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}

impl ResourceOutput {
    pub fn json(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self { uri: uri.into(), mime_type: JSON_MIME_TYPE, text: text.into() }
    }
}

/// Extracts and percent-decodes the keyword from a template URI.
///
/// The keyword is a single non-empty segment: no further `/`.
pub fn parse_customer_search_uri(uri: &str) -> Result<String, ToolError> {
    let invalid = || ToolError::InvalidRequest(format!("Invalid URI format: {uri}"));

    let raw = uri.strip_prefix(CUSTOMER_SEARCH_PREFIX).ok_or_else(invalid)?;
    if raw.is_empty() || raw.contains('/') {
        return Err(invalid());
    }
    decode_path_segment(raw).ok_or_else(invalid)
}
