//! Listing scanner
//!
//! Enumerates candidate entries on a listing page and extracts
//! (date, detail link, thumbnail) per entry, each entry independently: one
//! entry's broken markup never affects the others. Entries without a valid
//! date or detail link are dropped; a missing thumbnail is kept as `None`.

use crate::cdp::CdpClient;
use crate::dom::element::ElementHandle;
use crate::dom::resolver::{resolve_all, resolve_one, Scope};
use crate::dom::wait::{ReadyCondition, Waiter};
use crate::extract::dates;
use crate::extract::rules::SiteRules;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// One valid listing entry
#[derive(Debug, Clone)]
pub struct Entry {
    /// Parsed entry date, the sort key for "most recent"
    pub date: NaiveDate,
    /// Absolute URL of the entry's detail page
    pub detail_url: String,
    /// Thumbnail element, when the entry has one
    pub thumbnail: Option<ElementHandle>,
}

/// Scan a listing page for valid entries
///
/// Navigation failures and readiness timeouts on the listing page fold into
/// `Error::NoValidEntries`: either way the call has nothing to rank.
pub async fn scan(
    client: &Arc<dyn CdpClient>,
    listing_url: &str,
    rules: &SiteRules,
    waiter: &Waiter,
) -> Result<Vec<Entry>> {
    if let Err(e) = client.navigate(listing_url).await {
        return Err(Error::NoValidEntries(format!("{} ({})", listing_url, e)));
    }

    match waiter
        .wait_until(client, ReadyCondition::ChainMatches(&rules.entry_chain))
        .await
    {
        Ok(()) => {}
        Err(Error::ReadinessTimeout { .. }) => {
            return Err(Error::NoValidEntries(format!(
                "{} (no entries became visible)",
                listing_url
            )));
        }
        Err(e) => return Err(e),
    }

    let handles = resolve_all(client, Scope::Document, &rules.entry_chain).await?;
    debug!("Listing {} matched {} candidate entries", listing_url, handles.len());

    let mut entries = Vec::new();
    for (index, handle) in handles.iter().enumerate() {
        match scan_entry(client, handle, rules, listing_url).await {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => debug!("Entry {} dropped: no valid date or link", index),
            Err(e) => debug!("Entry {} dropped: {}", index, e),
        }
    }

    if entries.is_empty() {
        return Err(Error::NoValidEntries(listing_url.to_string()));
    }

    info!("Listing {}: {} valid of {} candidates", listing_url, entries.len(), handles.len());

    Ok(entries)
}

/// Extract one entry's fields; `None` when date or link is missing/invalid
async fn scan_entry(
    client: &Arc<dyn CdpClient>,
    handle: &ElementHandle,
    rules: &SiteRules,
    listing_url: &str,
) -> Result<Option<Entry>> {
    let scope = Scope::Element(handle);

    let date_el = match resolve_one(client, scope, &rules.date_chain).await? {
        Some(el) => el,
        None => return Ok(None),
    };
    let date = match dates::parse(&date_el.text().await?, &rules.months) {
        Some(date) => date,
        None => return Ok(None),
    };

    let link_el = match resolve_one(client, scope, &rules.link_chain).await? {
        Some(el) => el,
        None => return Ok(None),
    };
    let href = match link_el.attr(&rules.link_attr).await? {
        Some(href) if !href.trim().is_empty() => href,
        _ => return Ok(None),
    };
    let detail_url = match absolutize(&href, listing_url) {
        Some(url) => url,
        None => return Ok(None),
    };

    // Thumbnail is best-effort: resolver failure or absence both keep the entry
    let thumbnail = resolve_one(client, scope, &rules.thumb_chain)
        .await
        .unwrap_or(None);

    Ok(Some(Entry {
        date,
        detail_url,
        thumbnail,
    }))
}

/// Entry with the strictly greatest date; ties resolve to any one of them
pub fn most_recent(entries: &[Entry]) -> Option<&Entry> {
    entries.iter().max_by_key(|entry| entry.date)
}

fn absolutize(href: &str, base_url: &str) -> Option<String> {
    if Url::parse(href).is_ok() {
        return Some(href.trim().to_string());
    }

    Url::parse(base_url)
        .ok()?
        .join(href.trim())
        .ok()
        .map(|url| url.to_string())
}
