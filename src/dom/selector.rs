//! Selector chains
//!
//! A selector chain is an ordered list of alternative lookup strategies,
//! tried left-to-right until one yields a non-empty result. Chains are plain
//! data: per-site markup knowledge is configuration, not code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One element-lookup strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectorQuery {
    /// CSS selector query
    Css { query: String },
    /// Tag-name query
    Tag { name: String },
    /// Elements whose attribute contains a substring
    AttrContains { attr: String, value: String },
    /// XPath query
    #[serde(rename = "xpath")]
    XPath { path: String },
}

impl SelectorQuery {
    /// CSS selector query
    pub fn css<S: Into<String>>(query: S) -> Self {
        SelectorQuery::Css { query: query.into() }
    }

    /// Tag-name query
    pub fn tag<S: Into<String>>(name: S) -> Self {
        SelectorQuery::Tag { name: name.into() }
    }

    /// Attribute-contains query
    pub fn attr_contains<S: Into<String>, V: Into<String>>(attr: S, value: V) -> Self {
        SelectorQuery::AttrContains {
            attr: attr.into(),
            value: value.into(),
        }
    }

    /// XPath query
    pub fn xpath<S: Into<String>>(path: S) -> Self {
        SelectorQuery::XPath { path: path.into() }
    }
}

impl fmt::Display for SelectorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorQuery::Css { query } => write!(f, "css:{}", query),
            SelectorQuery::Tag { name } => write!(f, "tag:{}", name),
            SelectorQuery::AttrContains { attr, value } => {
                write!(f, "attr:{}~{}", attr, value)
            }
            SelectorQuery::XPath { path } => write!(f, "xpath:{}", path),
        }
    }
}

/// Ordered sequence of lookup strategies, consumed left-to-right
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorChain(pub Vec<SelectorQuery>);

impl SelectorChain {
    /// Create a chain from queries
    pub fn new(queries: Vec<SelectorQuery>) -> Self {
        SelectorChain(queries)
    }

    /// Single-query convenience constructor
    pub fn single(query: SelectorQuery) -> Self {
        SelectorChain(vec![query])
    }

    /// Whether the chain has no queries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The queries in fallback order
    pub fn queries(&self) -> &[SelectorQuery] {
        &self.0
    }

    /// JSON representation handed to the in-page scripts
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Array(vec![]))
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, query) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", query)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<SelectorQuery>> for SelectorChain {
    fn from(queries: Vec<SelectorQuery>) -> Self {
        SelectorChain(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_display() {
        let chain = SelectorChain::new(vec![
            SelectorQuery::css("article .headline"),
            SelectorQuery::tag("h1"),
        ]);
        assert_eq!(chain.to_string(), "[css:article .headline | tag:h1]");
    }

    #[test]
    fn test_query_json_shape() {
        let query = SelectorQuery::css("article");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["kind"], "css");
        assert_eq!(json["query"], "article");

        let query = SelectorQuery::attr_contains("class", "post");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["kind"], "attr_contains");
        assert_eq!(json["attr"], "class");
        assert_eq!(json["value"], "post");

        let query = SelectorQuery::xpath("//article//a");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["kind"], "xpath");
        assert_eq!(json["path"], "//article//a");
    }

    #[test]
    fn test_chain_roundtrip() {
        let chain = SelectorChain::new(vec![
            SelectorQuery::css(".fecha"),
            SelectorQuery::tag("time"),
            SelectorQuery::attr_contains("class", "date"),
        ]);

        let json = serde_json::to_string(&chain).unwrap();
        let back: SelectorChain = serde_json::from_str(&json).unwrap();
        assert_eq!(chain, back);
    }

    #[test]
    fn test_chain_from_toml() {
        let toml_str = r#"
            chain = [
                { kind = "css", query = "article" },
                { kind = "tag", name = "section" },
            ]
        "#;

        #[derive(Deserialize)]
        struct Wrapper {
            chain: SelectorChain,
        }

        let wrapper: Wrapper = toml::from_str(toml_str).unwrap();
        assert_eq!(wrapper.chain.queries().len(), 2);
        assert_eq!(wrapper.chain.queries()[0], SelectorQuery::css("article"));
    }

    #[test]
    fn test_empty_chain() {
        let chain = SelectorChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.to_string(), "[]");
    }
}
