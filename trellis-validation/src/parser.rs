// Rule-string parsing
//
// ruleset := rule ('|' rule)*
// rule    := identifier (':' param (',' param)*)?

use crate::RuleError;
use std::fmt;

/// One rule invocation: identifier plus ordered parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub name: String,
    pub params: Vec<String>,
}

impl ParsedRule {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.params.join(","))
        }
    }
}

/// Split a pipe-delimited rule string into raw tokens. A blank string has
/// no tokens.
pub fn split_rules(rules: &str) -> impl Iterator<Item = &str> {
    let blank = rules.trim().is_empty();
    rules.split('|').filter(move |_| !blank)
}

/// Parse a single rule token such as `between:1,10`
pub fn parse_token(token: &str) -> Result<ParsedRule, RuleError> {
    let (name, blob) = match token.split_once(':') {
        Some((name, blob)) => (name.trim(), Some(blob)),
        None => (token.trim(), None),
    };

    if name.is_empty() {
        return Err(RuleError::Malformed {
            token: token.to_string(),
            reason: "missing rule identifier".to_string(),
        });
    }

    let params = blob
        .map(|blob| blob.split(',').map(|p| p.trim().to_string()).collect())
        .unwrap_or_default();

    Ok(ParsedRule::new(name, params))
}

/// Parse a full pipe-delimited rule string
pub fn parse(rules: &str) -> Result<Vec<ParsedRule>, RuleError> {
    split_rules(rules).map(parse_token).collect()
}
