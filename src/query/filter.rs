//! Filter expression parsing
//!
//! Turns a textual filter like `status = 'active' AND toolCount >= 3` into an
//! ordered list of clauses. Clauses are implicitly ANDed; there is no OR and
//! no grouping. The splitter and the operator scan are quote-aware, so values
//! containing `and`, commas, or operator characters survive intact.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// How to treat clauses that cannot be parsed.
///
/// `Strict` rejects the whole filter; `Lenient` silently drops the offending
/// clause and keeps the rest. Structural errors (unterminated quotes) are
/// rejected in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Strict,
    Lenient,
}

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    Like,
    In,
}

impl FilterOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Ge => ">=",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Like => "LIKE",
            FilterOp::In => "IN",
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, FilterOp::Ge | FilterOp::Le | FilterOp::Gt | FilterOp::Lt)
    }
}

/// Right-hand side of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

/// One parsed `field operator value` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("clause '{0}' has no comparison operator")]
    #[diagnostic(code(mosaic::filter::missing_operator))]
    MissingOperator(String),

    #[error("unterminated quote in filter '{0}'")]
    #[diagnostic(code(mosaic::filter::unterminated_quote))]
    UnterminatedQuote(String),

    #[error("clause '{0}' is missing a field or value")]
    #[diagnostic(code(mosaic::filter::incomplete_clause))]
    IncompleteClause(String),

    #[error("IN list in clause '{0}' is empty")]
    #[diagnostic(code(mosaic::filter::empty_in_list))]
    EmptyInList(String),
}

/// Parse a filter expression into its clauses.
///
/// Empty segments between `AND` tokens are skipped silently in both modes.
pub fn parse(input: &str, mode: ParseMode) -> Result<Vec<FilterClause>, ParseError> {
    let mut clauses = Vec::new();
    for raw in split_on_and(input)? {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match parse_clause(raw) {
            Ok(clause) => clauses.push(clause),
            Err(err @ ParseError::UnterminatedQuote(_)) => return Err(err),
            Err(err) => match mode {
                ParseMode::Strict => return Err(err),
                ParseMode::Lenient => {
                    debug!(clause = raw, %err, "dropping unparseable filter clause");
                }
            },
        }
    }
    Ok(clauses)
}

/// Split on standalone, unquoted, unparenthesized `AND` (case-insensitive).
fn split_on_and(input: &str) -> Result<Vec<&str>, ParseError> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'a' | b'A' if depth == 0 => {
                    let preceded = i == 0 || bytes[i - 1].is_ascii_whitespace();
                    let fits = i + 3 <= bytes.len();
                    if preceded && fits && bytes[i..i + 3].eq_ignore_ascii_case(b"and") {
                        let after = i + 3;
                        let followed = after == bytes.len() || bytes[after].is_ascii_whitespace();
                        if followed {
                            parts.push(&input[start..i]);
                            start = after;
                            i = after;
                            continue;
                        }
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote(input.to_string()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_clause(raw: &str) -> Result<FilterClause, ParseError> {
    let (pos, op, len) =
        find_operator(raw).ok_or_else(|| ParseError::MissingOperator(raw.to_string()))?;
    let field = raw[..pos].trim();
    let rest = raw[pos + len..].trim();
    if field.is_empty() || rest.is_empty() {
        return Err(ParseError::IncompleteClause(raw.to_string()));
    }
    let value = if op == FilterOp::In {
        FilterValue::List(parse_in_list(raw, rest)?)
    } else {
        FilterValue::Scalar(strip_quotes(rest).to_string())
    };
    Ok(FilterClause {
        field: field.to_string(),
        op,
        value,
    })
}

/// Locate the first operator occurrence outside quotes. Two-character
/// operators are tried before their one-character prefixes so `!=` and `>=`
/// never split as `=` or `>`.
fn find_operator(raw: &str) -> Option<(usize, FilterOp, usize)> {
    let bytes = raw.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'!' | b'>' | b'<' if i + 1 < bytes.len() && bytes[i + 1] == b'=' => {
                let op = match b {
                    b'!' => FilterOp::Ne,
                    b'>' => FilterOp::Ge,
                    _ => FilterOp::Le,
                };
                return Some((i, op, 2));
            }
            b'=' => return Some((i, FilterOp::Eq, 1)),
            b'>' => return Some((i, FilterOp::Gt, 1)),
            b'<' => return Some((i, FilterOp::Lt, 1)),
            _ => {
                if let Some(hit) = match_word_op(bytes, i) {
                    return Some(hit);
                }
            }
        }
        i += 1;
    }
    None
}

/// Match `LIKE` / `IN` as standalone case-insensitive words.
fn match_word_op(bytes: &[u8], i: usize) -> Option<(usize, FilterOp, usize)> {
    if i > 0 && !bytes[i - 1].is_ascii_whitespace() {
        return None;
    }
    for (word, op) in [(&b"LIKE"[..], FilterOp::Like), (&b"IN"[..], FilterOp::In)] {
        if bytes.len() >= i + word.len() && bytes[i..i + word.len()].eq_ignore_ascii_case(word) {
            let after = i + word.len();
            let followed =
                after == bytes.len() || bytes[after].is_ascii_whitespace() || bytes[after] == b'(';
            if followed {
                return Some((i, op, word.len()));
            }
        }
    }
    None
}

/// Trim one matching pair of surrounding quotes.
fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Split a parenthesized `IN` list on unquoted commas. A bare value is
/// treated as a one-element list.
fn parse_in_list(raw: &str, rest: &str) -> Result<Vec<String>, ParseError> {
    let inner = match rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => inner,
        None => return Ok(vec![strip_quotes(rest).to_string()]),
    };

    let bytes = inner.as_bytes();
    let mut items = Vec::new();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b',' => {
                    push_item(&inner[start..i], &mut items);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote(raw.to_string()));
    }
    push_item(&inner[start..], &mut items);

    if items.is_empty() {
        return Err(ParseError::EmptyInList(raw.to_string()));
    }
    Ok(items)
}

fn push_item(piece: &str, items: &mut Vec<String>) {
    let piece = piece.trim();
    if !piece.is_empty() {
        items.push(strip_quotes(piece).to_string());
    }
}
