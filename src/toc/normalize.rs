// src/toc/normalize.rs

/// Canonicalizes a free-text heading for comparison: lower-cased, `&` expanded
/// to `and`, punctuation replaced by spaces and whitespace collapsed.
pub fn normalize_heading(raw: &str) -> String {
    let expanded = raw.replace('&', " and ");
    let mut out = String::with_capacity(expanded.len());
    for ch in expanded.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenizes a heading after normalization, naively singularizing longer tokens
/// ("medications" -> "medication", but "ms" and "this" are left alone).
pub fn heading_tokens(raw: &str) -> Vec<String> {
    normalize_heading(raw)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(singularize)
        .collect()
}

fn singularize(token: &str) -> String {
    if token.chars().count() > 4 && token.ends_with('s') {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}
