//! Element handles
//!
//! A handle names an element parked in the in-page registry. Every read goes
//! back through the live document, so a node dropped by a re-render surfaces
//! as `Error::StaleElement` instead of silently reading nothing.

use crate::cdp::{CdpClient, EvaluationResult};
use crate::dom::scripts;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Reference to a DOM element held in the in-page registry
#[derive(Debug, Clone)]
pub struct ElementHandle {
    client: Arc<dyn CdpClient>,
    slot: u64,
}

impl ElementHandle {
    /// Create a handle for a registry slot
    pub fn new(client: Arc<dyn CdpClient>, slot: u64) -> Self {
        Self { client, slot }
    }

    /// Registry slot of this element
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// CDP client this handle reads through
    pub fn client(&self) -> &Arc<dyn CdpClient> {
        &self.client
    }

    /// Trimmed text content
    pub async fn text(&self) -> Result<String> {
        let script = format!("({})({})", scripts::ELEMENT_TEXT_SCRIPT, self.slot);
        let obj = self.eval_object(&script).await?;

        Ok(obj
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string())
    }

    /// Read one attribute; `None` when the attribute is absent
    pub async fn attr(&self, name: &str) -> Result<Option<String>> {
        let script = format!(
            "({})({}, {})",
            scripts::ELEMENT_ATTR_SCRIPT,
            self.slot,
            serde_json::to_string(name)?
        );
        let obj = self.eval_object(&script).await?;

        Ok(obj.get("value").and_then(|v| v.as_str()).map(|s| s.to_string()))
    }

    /// Read the full attribute map
    pub async fn attributes(&self) -> Result<HashMap<String, String>> {
        let script = format!("({})({})", scripts::ELEMENT_ATTRS_SCRIPT, self.slot);
        let obj = self.eval_object(&script).await?;

        let mut attrs = HashMap::new();
        if let Some(map) = obj.get("attrs").and_then(|v| v.as_object()) {
            for (name, value) in map {
                if let Some(value) = value.as_str() {
                    attrs.insert(name.clone(), value.to_string());
                }
            }
        }

        Ok(attrs)
    }

    /// Current value of a form control
    pub async fn value(&self) -> Result<String> {
        let script = format!("({})({})", scripts::ELEMENT_VALUE_SCRIPT, self.slot);
        let obj = self.eval_object(&script).await?;

        Ok(obj
            .get("value")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string())
    }

    /// Enter text into a form control, firing input/change events
    pub async fn set_value(&self, value: &str) -> Result<()> {
        let script = format!(
            "({})({}, {})",
            scripts::ELEMENT_SET_VALUE_SCRIPT,
            self.slot,
            serde_json::to_string(value)?
        );
        self.eval_object(&script).await?;
        Ok(())
    }

    /// Click the element
    pub async fn click(&self) -> Result<()> {
        let script = format!("({})({})", scripts::ELEMENT_CLICK_SCRIPT, self.slot);
        self.eval_object(&script).await?;
        Ok(())
    }

    /// Whether the element is visible, enabled and not occluded
    pub async fn is_clickable(&self) -> Result<bool> {
        let script = format!("({})({})", scripts::ELEMENT_CLICKABLE_SCRIPT, self.slot);

        match self.client.evaluate(&script, false).await? {
            EvaluationResult::Bool(clickable) => Ok(clickable),
            _ => Ok(false),
        }
    }

    /// Run an element script and parse its JSON envelope, mapping the
    /// `stale` marker to `Error::StaleElement`
    async fn eval_object(&self, script: &str) -> Result<serde_json::Value> {
        let result = self.client.evaluate(script, false).await?;

        let json = result
            .as_str()
            .ok_or_else(|| Error::cdp("Element script did not return a JSON string"))?;

        let obj: serde_json::Value = serde_json::from_str(json)?;

        if obj.get("stale").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(Error::stale_element(format!("slot {}", self.slot)));
        }

        Ok(obj)
    }
}
