//! Widget request parameters
//!
//! Parameters arrive as loose strings. Anything missing or malformed reads as
//! 0, which the widgets treat as "nothing selected".

use std::collections::HashMap;

/// Query key of the selected category
pub const CATEGORY_PARAM: &str = "blog_category[category]";
/// Query key of the selected tag
pub const TAG_PARAM: &str = "blog_tag[tag]";

/// Typed parameters of one widget request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetRequest {
    /// Category being viewed, 0 when none
    pub current_category: i64,
    /// Tag being viewed, 0 when none
    pub current_tag: i64,
}

impl WidgetRequest {
    /// Read parameters from a decoded query string
    ///
    /// Namespaced keys win over the bare `category` and `tag` keys.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let lookup = |namespaced: &str, bare: &str| {
            query
                .get(namespaced)
                .or_else(|| query.get(bare))
                .map(|value| parse_int_like(value))
                .unwrap_or(0)
        };

        Self {
            current_category: lookup(CATEGORY_PARAM, "category"),
            current_tag: lookup(TAG_PARAM, "tag"),
        }
    }
}

/// Lenient integer parsing
///
/// Skips leading whitespace, accepts one optional sign and then as many
/// digits as follow. No digits yields 0; values past the i64 range saturate.
pub fn parse_int_like(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut result: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(digit - b'0');
        result = if negative {
            result.saturating_mul(10).saturating_sub(d)
        } else {
            result.saturating_mul(10).saturating_add(d)
        };
    }
    result
}
