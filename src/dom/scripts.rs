//! In-page JavaScript constants
//!
//! All JavaScript executed in the page lives here as named arrow-function
//! literals; call sites append JSON-encoded arguments. Matched elements are
//! parked in a window-level registry (`window.__prensaHandles`) so later
//! reads can detect nodes that the document dropped in a re-render.

/// Resolve a selector chain against the document or a registered element.
///
/// Tries each query in order and registers the first non-empty match set,
/// returning its registry slots. An invalidated root reports `stale`.
///
/// # Arguments
/// - `queries`: array of `{kind, ...}` query descriptors
/// - `rootSlot`: registry slot of the scope element, or `null` for the document
pub const RESOLVE_CHAIN_SCRIPT: &str = r#"
((queries, rootSlot) => {
    const reg = (window.__prensaHandles = window.__prensaHandles || []);
    let root = document;
    if (rootSlot !== null) {
        root = reg[rootSlot];
        if (!root || !root.isConnected) return JSON.stringify({ stale: true });
    }
    const runQuery = (q) => {
        switch (q.kind) {
            case 'css':
                return Array.from(root.querySelectorAll(q.query));
            case 'tag':
                return Array.from(root.getElementsByTagName(q.name));
            case 'attr_contains':
                return Array.from(root.querySelectorAll('*')).filter(
                    (el) => (el.getAttribute(q.attr) || '').includes(q.value));
            case 'xpath': {
                const res = document.evaluate(q.path, root, null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < res.snapshotLength; i++) out.push(res.snapshotItem(i));
                return out;
            }
            default:
                return [];
        }
    };
    for (const q of queries) {
        let nodes = [];
        try { nodes = runQuery(q); } catch (e) { nodes = []; }
        if (nodes.length > 0) {
            const slots = [];
            for (const n of nodes) { reg.push(n); slots.push(reg.length - 1); }
            return JSON.stringify({ slots: slots });
        }
    }
    return JSON.stringify({ slots: [] });
})
"#;

/// Count matches for a selector chain against the document.
///
/// Same fallback order as the resolver but registers nothing; used by the
/// readiness waiter, which only needs "does anything match yet".
///
/// # Arguments
/// - `queries`: array of `{kind, ...}` query descriptors
pub const COUNT_CHAIN_SCRIPT: &str = r#"
((queries) => {
    const runQuery = (q) => {
        switch (q.kind) {
            case 'css':
                return document.querySelectorAll(q.query).length;
            case 'tag':
                return document.getElementsByTagName(q.name).length;
            case 'attr_contains':
                return Array.from(document.querySelectorAll('*')).filter(
                    (el) => (el.getAttribute(q.attr) || '').includes(q.value)).length;
            case 'xpath': {
                const res = document.evaluate(q.path, document, null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                return res.snapshotLength;
            }
            default:
                return 0;
        }
    };
    for (const q of queries) {
        let n = 0;
        try { n = runQuery(q); } catch (e) { n = 0; }
        if (n > 0) return n;
    }
    return 0;
})
"#;

/// Read an element's text content.
///
/// # Arguments
/// - `slot`: registry slot of the element
pub const ELEMENT_TEXT_SCRIPT: &str = r#"
((slot) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    return JSON.stringify({ text: el.textContent || '' });
})
"#;

/// Read a single attribute.
///
/// # Arguments
/// - `slot`: registry slot of the element
/// - `name`: attribute name
pub const ELEMENT_ATTR_SCRIPT: &str = r#"
((slot, name) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    return JSON.stringify({ value: el.getAttribute(name) });
})
"#;

/// Read the full attribute map.
///
/// # Arguments
/// - `slot`: registry slot of the element
pub const ELEMENT_ATTRS_SCRIPT: &str = r#"
((slot) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    const attrs = {};
    for (const a of el.attributes) attrs[a.name] = a.value;
    return JSON.stringify({ attrs: attrs });
})
"#;

/// Read a form control's current value.
///
/// # Arguments
/// - `slot`: registry slot of the element
pub const ELEMENT_VALUE_SCRIPT: &str = r#"
((slot) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    return JSON.stringify({ value: el.value || '' });
})
"#;

/// Set a form control's value, firing the events frameworks listen for.
///
/// # Arguments
/// - `slot`: registry slot of the element
/// - `value`: text to enter
pub const ELEMENT_SET_VALUE_SCRIPT: &str = r#"
((slot, value) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    el.focus();
    el.value = value;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return JSON.stringify({ ok: true });
})
"#;

/// Click an element.
///
/// # Arguments
/// - `slot`: registry slot of the element
pub const ELEMENT_CLICK_SCRIPT: &str = r#"
((slot) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return JSON.stringify({ stale: true });
    el.click();
    return JSON.stringify({ ok: true });
})
"#;

/// Check whether an element is clickable: visible, enabled, not occluded.
///
/// # Arguments
/// - `slot`: registry slot of the element
pub const ELEMENT_CLICKABLE_SCRIPT: &str = r#"
((slot) => {
    const reg = window.__prensaHandles || [];
    const el = reg[slot];
    if (!el || !el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const rect = el.getBoundingClientRect();
    if (rect.width === 0 || rect.height === 0) return false;
    if (el.disabled) return false;
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
    return hit === el || el.contains(hit);
})
"#;
