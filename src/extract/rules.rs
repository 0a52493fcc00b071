//! Per-site extraction rules
//!
//! Everything the pipeline knows about one site's markup is data: selector
//! chains for listing entries and their fields, text fallback chains for the
//! detail page, and the month table its dates use. Adding a site is a rules
//! file, not a new code path.

use crate::dom::selector::{SelectorChain, SelectorQuery};
use crate::extract::dates::MonthTable;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Extraction rules for one site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteRules {
    /// Matches candidate entry elements on the listing page
    pub entry_chain: SelectorChain,

    /// Matches the date element inside an entry
    pub date_chain: SelectorChain,

    /// Matches the detail-link element inside an entry
    pub link_chain: SelectorChain,

    /// Attribute the detail URL is read from
    pub link_attr: String,

    /// Matches the thumbnail element inside an entry
    pub thumb_chain: SelectorChain,

    /// Text chains for the detail page, most specific first
    pub text_chains: Vec<SelectorChain>,

    /// Month-name table for date parsing
    pub months: MonthTable,
}

impl Default for SiteRules {
    fn default() -> Self {
        Self {
            entry_chain: SelectorChain::new(vec![
                SelectorQuery::css("article"),
                SelectorQuery::css(".post, .entry, .noticia"),
                SelectorQuery::attr_contains("class", "article"),
            ]),
            date_chain: SelectorChain::new(vec![
                SelectorQuery::tag("time"),
                SelectorQuery::css(".date, .fecha"),
                SelectorQuery::attr_contains("class", "date"),
            ]),
            link_chain: SelectorChain::new(vec![
                SelectorQuery::css("h2 a[href], h3 a[href]"),
                SelectorQuery::css("a[href]"),
            ]),
            link_attr: "href".to_string(),
            thumb_chain: SelectorChain::new(vec![
                SelectorQuery::css("img"),
                SelectorQuery::attr_contains("class", "thumb"),
            ]),
            text_chains: vec![
                SelectorChain::single(SelectorQuery::css(".article-body p, .entry-content p")),
                SelectorChain::single(SelectorQuery::css("article p")),
                SelectorChain::new(vec![
                    SelectorQuery::css("main p"),
                    SelectorQuery::tag("p"),
                ]),
            ],
            months: MonthTable::default(),
        }
    }
}

impl SiteRules {
    /// Load rules from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read rules file: {}", e)))?;

        let rules: SiteRules = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse rules: {}", e)))?;

        Ok(rules)
    }
}
