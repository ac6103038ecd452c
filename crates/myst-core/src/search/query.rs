//! Translation of free-text queries into FTS5 match expressions.
//!
//! User input is never handed to FTS5 verbatim: characters such as `"`,
//! `*`, `-` or `:` are query syntax there. Instead the text is split into
//! alphanumeric tokens, each token is quoted and given a prefix wildcard,
//! and the tokens are OR-combined so a document matching more of them ranks
//! higher under bm25.

/// Split `text` into lower-cased alphanumeric tokens, without duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let token = token.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Build the MATCH expression for `query`.
///
/// Returns `None` when the query has no searchable tokens.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = tokenize(query)
        .into_iter()
        .map(|token| format!("\"{}\"*", token))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}
