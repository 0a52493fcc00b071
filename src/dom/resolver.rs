//! Selector fallback resolver
//!
//! Evaluates each query of a chain in order against a scope and returns the
//! first non-empty match set. Absence is a normal outcome: an exhausted chain
//! yields an empty list or `None`, never an error. Only an invalidated scope
//! element raises, as `Error::StaleElement`.

use crate::cdp::CdpClient;
use crate::dom::element::ElementHandle;
use crate::dom::scripts;
use crate::dom::selector::SelectorChain;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Scope a chain is resolved against
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// The whole document
    Document,
    /// The subtree under a held element
    Element(&'a ElementHandle),
}

/// Resolve a chain to all elements of its first matching query
pub async fn resolve_all(
    client: &Arc<dyn CdpClient>,
    scope: Scope<'_>,
    chain: &SelectorChain,
) -> Result<Vec<ElementHandle>> {
    if chain.is_empty() {
        return Ok(Vec::new());
    }

    let root_slot = match scope {
        Scope::Document => "null".to_string(),
        Scope::Element(handle) => handle.slot().to_string(),
    };

    let script = format!(
        "({})({}, {})",
        scripts::RESOLVE_CHAIN_SCRIPT,
        chain.to_json(),
        root_slot
    );

    let result = client.evaluate(&script, false).await?;

    let json = result
        .as_str()
        .ok_or_else(|| Error::cdp("Resolver script did not return a JSON string"))?;

    let obj: serde_json::Value = serde_json::from_str(json)?;

    if obj.get("stale").and_then(|v| v.as_bool()).unwrap_or(false) {
        return Err(Error::stale_element("resolver scope element"));
    }

    let slots: Vec<u64> = obj
        .get("slots")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default();

    debug!("Chain {} resolved to {} element(s)", chain, slots.len());

    Ok(slots
        .into_iter()
        .map(|slot| ElementHandle::new(Arc::clone(client), slot))
        .collect())
}

/// Resolve a chain to its first matching element, if any
pub async fn resolve_one(
    client: &Arc<dyn CdpClient>,
    scope: Scope<'_>,
    chain: &SelectorChain,
) -> Result<Option<ElementHandle>> {
    let mut handles = resolve_all(client, scope, chain).await?;

    if handles.is_empty() {
        Ok(None)
    } else {
        Ok(Some(handles.remove(0)))
    }
}
