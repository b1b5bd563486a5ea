//! User-Agent classification for click enrichment.

use woothee::parser::Parser;

/// Browser, OS and device category parsed from a User-Agent string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_category: Option<String>,
    pub is_bot: bool,
}

/// Parses a User-Agent string using woothee.
///
/// Unrecognised values come back as `None` rather than woothee's
/// `"UNKNOWN"` placeholder.
pub fn parse_user_agent(ua: &str) -> ParsedUserAgent {
    let parser = Parser::new();
    let result = parser.parse(ua).unwrap_or_default();

    ParsedUserAgent {
        browser: known(result.name),
        os: known(result.os),
        device_category: known(result.category),
        is_bot: result.category == "crawler",
    }
}

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.to_string())
    }
}
