//! Image URL resolution
//!
//! Lead images hide behind several markup conventions: a plain `src`, a
//! lazy-loading attribute holding the real URL while `src` carries a
//! placeholder, or a responsive source set listing candidates by width.
//! Resolution tries those in fixed priority order and never raises; a page
//! with no usable image is a normal outcome.

use crate::dom::element::ElementHandle;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Lazy-loading attributes, in priority order
const LAZY_SOURCE_ATTRS: &[&str] = &["data-src", "data-lazy-src", "data-original", "data-echo"];

/// Responsive source-set attributes, in priority order
const SOURCE_SET_ATTRS: &[&str] = &["srcset", "data-srcset"];

/// Resolve an absolute image URL from an element's attribute set
pub fn resolve_image_url(attrs: &HashMap<String, String>, base_url: &str) -> Option<String> {
    let candidate = direct_source(attrs)
        .or_else(|| lazy_source(attrs))
        .or_else(|| source_set(attrs))?;

    absolutize(&candidate, base_url)
}

/// Resolve an image URL by reading a live element's attributes
///
/// A stale or unreadable element yields `None`; a missing image is never
/// fatal to the pipeline.
pub async fn resolve_from_element(handle: &ElementHandle, base_url: &str) -> Option<String> {
    match handle.attributes().await {
        Ok(attrs) => resolve_image_url(&attrs, base_url),
        Err(e) => {
            debug!("Thumbnail attributes unreadable: {}", e);
            None
        }
    }
}

/// A value usable as an image URL: non-empty and not an inline placeholder
fn usable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.starts_with("data:")
}

fn direct_source(attrs: &HashMap<String, String>) -> Option<String> {
    attrs
        .get("src")
        .filter(|v| usable(v))
        .map(|v| v.trim().to_string())
}

fn lazy_source(attrs: &HashMap<String, String>) -> Option<String> {
    LAZY_SOURCE_ATTRS
        .iter()
        .find_map(|name| attrs.get(*name).filter(|v| usable(v)))
        .map(|v| v.trim().to_string())
}

fn source_set(attrs: &HashMap<String, String>) -> Option<String> {
    SOURCE_SET_ATTRS
        .iter()
        .find_map(|name| attrs.get(*name))
        .and_then(|value| last_srcset_candidate(value))
}

/// Last listed candidate of a source set
///
/// `srcset` entries are `url descriptor` pairs; the last is conventionally
/// the highest-resolution one.
pub(crate) fn last_srcset_candidate(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_whitespace().next())
        .filter(|candidate| usable(candidate))
        .last()
        .map(|candidate| candidate.to_string())
}

/// Join a possibly-relative candidate against the page URL
fn absolutize(candidate: &str, base_url: &str) -> Option<String> {
    // A candidate that already parses carries its own scheme
    if Url::parse(candidate).is_ok() {
        return Some(candidate.to_string());
    }

    Url::parse(base_url)
        .ok()?
        .join(candidate)
        .ok()
        .map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://diario.example/portada";

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_direct_source_wins() {
        let attrs = attrs(&[("src", "/img/a.jpg"), ("data-src", "/img/lazy.jpg")]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://diario.example/img/a.jpg".to_string())
        );
    }

    #[test]
    fn test_placeholder_src_falls_through_to_lazy() {
        let attrs = attrs(&[
            ("src", "data:image/gif;base64,R0lGODlhAQABAA=="),
            ("data-src", "/img/real.jpg"),
        ]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://diario.example/img/real.jpg".to_string())
        );
    }

    #[test]
    fn test_srcset_takes_last_candidate() {
        let attrs = attrs(&[("srcset", "img-300.jpg 300w, img-1200.jpg 1200w")]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://diario.example/img-1200.jpg".to_string())
        );
    }

    #[test]
    fn test_absolute_url_passes_through() {
        let attrs = attrs(&[("src", "https://cdn.example/foto.png")]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://cdn.example/foto.png".to_string())
        );
    }

    #[test]
    fn test_protocol_relative_url_joins_base_scheme() {
        let attrs = attrs(&[("src", "//cdn.example/foto.png")]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://cdn.example/foto.png".to_string())
        );
    }

    #[test]
    fn test_no_usable_attribute_is_none() {
        assert_eq!(resolve_image_url(&attrs(&[]), BASE), None);
        assert_eq!(resolve_image_url(&attrs(&[("src", "  ")]), BASE), None);
        assert_eq!(resolve_image_url(&attrs(&[("alt", "una foto")]), BASE), None);
    }

    #[test]
    fn test_lazy_attr_priority_order() {
        let attrs = attrs(&[
            ("data-lazy-src", "/img/second.jpg"),
            ("data-src", "/img/first.jpg"),
        ]);
        assert_eq!(
            resolve_image_url(&attrs, BASE),
            Some("https://diario.example/img/first.jpg".to_string())
        );
    }

    #[test]
    fn test_last_srcset_candidate_edge_cases() {
        assert_eq!(
            last_srcset_candidate("a.jpg 1x , b.jpg 2x,"),
            Some("b.jpg".to_string())
        );
        assert_eq!(last_srcset_candidate("solo.jpg"), Some("solo.jpg".to_string()));
        assert_eq!(last_srcset_candidate("   "), None);
    }
}
