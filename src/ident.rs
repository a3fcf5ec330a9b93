//! Identifier quoting for the backtick dialect.
//!
//! Identifiers are wrapped in backticks and any embedded backtick is doubled, so
//! a name is always read back as a single literal identifier:
//!
//! ```rust
//! use sql_fluent::quote_identifier;
//!
//! assert_eq!(quote_identifier("orders"), "`orders`");
//! assert_eq!(quote_identifier("we`ird"), "`we``ird`");
//! ```

/// Quote character used by the dialect.
pub const QUOTE: char = '`';

/// Wrap `raw` in backticks, doubling embedded backticks.
///
/// No emptiness check happens here; clause methods decide whether an empty
/// alias is simply left out.
#[must_use]
pub fn quote_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    push_quoted(&mut out, raw);
    out
}

pub(crate) fn push_quoted(out: &mut String, raw: &str) {
    out.push(QUOTE);
    for ch in raw.chars() {
        if ch == QUOTE {
            out.push(QUOTE);
        }
        out.push(ch);
    }
    out.push(QUOTE);
}
