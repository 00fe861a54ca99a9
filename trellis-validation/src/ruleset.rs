// Declarative rule specifications

use crate::parser::{self, ParsedRule};
use crate::{Rule, RuleError};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// One entry of an attribute's rule list
#[derive(Debug, Clone)]
pub enum RuleEntry {
    /// A single rule token such as `min:3`, resolved through the registry
    Token(String),
    /// A ready-made rule instance
    Instance(Arc<dyn Rule>),
}

impl From<&str> for RuleEntry {
    fn from(token: &str) -> Self {
        RuleEntry::Token(token.to_string())
    }
}

impl From<String> for RuleEntry {
    fn from(token: String) -> Self {
        RuleEntry::Token(token)
    }
}

impl From<Arc<dyn Rule>> for RuleEntry {
    fn from(rule: Arc<dyn Rule>) -> Self {
        RuleEntry::Instance(rule)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpec {
    Piped(String),
    List(Vec<String>),
}

/// Ordered rules for one attribute.
///
/// `"required|min:3"` and `["required", "min:3"]` produce the same spec.
/// The list form is needed when a parameter contains `|`, as in
/// `regex:^(draft|publish)$`.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    entries: Vec<RuleEntry>,
}

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule token or instance
    pub fn with(mut self, entry: impl Into<RuleEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parse every token entry. Instances are reported under their own
    /// name with no parameters.
    pub fn parsed(&self) -> Result<Vec<ParsedRule>, RuleError> {
        self.entries
            .iter()
            .map(|entry| match entry {
                RuleEntry::Token(token) => parser::parse_token(token),
                RuleEntry::Instance(rule) => Ok(ParsedRule::new(rule.name(), Vec::new())),
            })
            .collect()
    }
}

impl From<&str> for RuleSpec {
    fn from(rules: &str) -> Self {
        Self {
            entries: parser::split_rules(rules).map(RuleEntry::from).collect(),
        }
    }
}

impl From<String> for RuleSpec {
    fn from(rules: String) -> Self {
        Self::from(rules.as_str())
    }
}

impl<E: Into<RuleEntry>> From<Vec<E>> for RuleSpec {
    fn from(entries: Vec<E>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Arc<dyn Rule>> for RuleSpec {
    fn from(rule: Arc<dyn Rule>) -> Self {
        Self::new().with(rule)
    }
}

impl<'de> Deserialize<'de> for RuleSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSpec::deserialize(deserializer)? {
            RawSpec::Piped(rules) => Self::from(rules),
            RawSpec::List(tokens) => Self::from(tokens),
        })
    }
}

/// Attribute name to rules, in declaration order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: IndexMap<String, RuleSpec>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for an attribute. Redeclaring an attribute replaces its
    /// rules but keeps its original position.
    pub fn rule(mut self, attribute: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.insert(attribute, spec);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, spec: impl Into<RuleSpec>) {
        self.rules.insert(attribute.into(), spec.into());
    }

    pub fn get(&self, attribute: &str) -> Option<&RuleSpec> {
        self.rules.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.rules.contains_key(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RuleSet
where
    K: Into<String>,
    V: Into<RuleSpec>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for (attribute, spec) in iter {
            set.insert(attribute, spec);
        }
        set
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, RuleSpec);
    type IntoIter = indexmap::map::IntoIter<String, RuleSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

/// Build a [`RuleSet`] inline
///
/// ```
/// use trellis_validation::rules;
///
/// let rules = rules! {
///     "name" => "required|min:3",
///     "email" => "required|email",
/// };
/// assert_eq!(rules.len(), 2);
/// ```
#[macro_export]
macro_rules! rules {
    ($($attribute:expr => $spec:expr),* $(,)?) => {{
        let mut set = $crate::RuleSet::new();
        $( set.insert($attribute, $spec); )*
        set
    }};
}
