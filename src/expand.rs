//! Range-expression expansion for compact name lists
//!
//! Cluster documents compress host, port and name lists into range
//! expressions such as `node[1-4]`, `n[01-03]-ib` or `rack[1-2]slot[1-2]`.
//! Expansion is deterministic and order-preserving: ranges expand in the
//! written order, multiple bracket groups in one part combine left-to-right
//! with the leftmost group varying slowest, and top-level commas separate
//! independent parts.

use serde_yaml::Value;
use thiserror::Error;

/// Errors raised while expanding a range expression
#[derive(Error, Debug, PartialEq)]
pub enum ExpandError {
    #[error("Unbalanced '[' in range expression '{0}'")]
    UnbalancedBracket(String),

    #[error("Nested '[' in range expression '{0}'")]
    NestedBracket(String),

    #[error("Empty range expression")]
    Empty,

    #[error("Invalid range item '{0}': {1}")]
    BadRange(String, String),

    #[error("A name spec must be a string or a sequence of strings, got {0}")]
    BadSpec(String),
}

/// Expand a single range expression into an ordered list of literal names.
pub fn expand(spec: &str) -> Result<Vec<String>, ExpandError> {
    if spec.trim().is_empty() {
        return Err(ExpandError::Empty);
    }

    let mut names = Vec::new();
    for part in split_top_level(spec)? {
        if part.is_empty() {
            return Err(ExpandError::Empty);
        }
        names.extend(expand_part(&part)?);
    }
    Ok(names)
}

/// Expand a YAML name spec: either a single range expression or a sequence
/// of them, expanded in order and concatenated.
pub fn expand_spec(spec: &Value) -> Result<Vec<String>, ExpandError> {
    match spec {
        Value::String(s) => expand(s),
        Value::Number(n) => Ok(vec![n.to_string()]),
        Value::Sequence(items) => {
            let mut names = Vec::new();
            for item in items {
                match item {
                    Value::String(s) => names.extend(expand(s)?),
                    Value::Number(n) => names.push(n.to_string()),
                    other => return Err(ExpandError::BadSpec(kind_name(other).to_string())),
                }
            }
            Ok(names)
        }
        other => Err(ExpandError::BadSpec(kind_name(other).to_string())),
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Split on commas that are not enclosed in brackets.
fn split_top_level(spec: &str) -> Result<Vec<String>, ExpandError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;

    for c in spec.chars() {
        match c {
            '[' => {
                if depth > 0 {
                    return Err(ExpandError::NestedBracket(spec.to_string()));
                }
                depth += 1;
                current.push(c);
            }
            ']' => {
                if depth == 0 {
                    return Err(ExpandError::UnbalancedBracket(spec.to_string()));
                }
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(ExpandError::UnbalancedBracket(spec.to_string()));
    }
    parts.push(current);
    Ok(parts)
}

/// Expand one comma-free part, resolving bracket groups left to right.
fn expand_part(part: &str) -> Result<Vec<String>, ExpandError> {
    let Some(open) = part.find('[') else {
        return Ok(vec![part.to_string()]);
    };
    let close = part[open..]
        .find(']')
        .map(|i| open + i)
        .ok_or_else(|| ExpandError::UnbalancedBracket(part.to_string()))?;

    let prefix = &part[..open];
    let body = &part[open + 1..close];
    let rest = &part[close + 1..];

    let mut names = Vec::new();
    for item in expand_items(body, part)? {
        for tail in expand_part(rest)? {
            names.push(format!("{prefix}{item}{tail}"));
        }
    }
    Ok(names)
}

/// Expand the comma-separated items of one bracket group.
fn expand_items(body: &str, context: &str) -> Result<Vec<String>, ExpandError> {
    if body.is_empty() {
        return Err(ExpandError::BadRange(
            context.to_string(),
            "empty bracket group".to_string(),
        ));
    }

    let mut items = Vec::new();
    for item in body.split(',') {
        match item.split_once('-') {
            None => {
                parse_bound(item, context)?;
                items.push(item.to_string());
            }
            Some((lo, hi)) => {
                let lo_n = parse_bound(lo, context)?;
                let hi_n = parse_bound(hi, context)?;
                if hi_n < lo_n {
                    return Err(ExpandError::BadRange(
                        item.to_string(),
                        "range end precedes range start".to_string(),
                    ));
                }
                // Leading zeros on the lower bound fix the pad width.
                let width = if lo.starts_with('0') { lo.len() } else { 0 };
                for n in lo_n..=hi_n {
                    items.push(format!("{n:0width$}"));
                }
            }
        }
    }
    Ok(items)
}

fn parse_bound(text: &str, context: &str) -> Result<u64, ExpandError> {
    text.parse::<u64>().map_err(|_| {
        ExpandError::BadRange(
            context.to_string(),
            format!("'{text}' is not an unsigned integer"),
        )
    })
}
