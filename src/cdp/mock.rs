//! Mock CDP implementation for testing
//!
//! A scripted stand-in for the WebSocket transport. Tests register
//! expression patterns with canned results; `evaluate` answers with the
//! first registered pattern contained in the script. Navigation updates the
//! mock's notion of `window.location.href` so URL-based readiness conditions
//! behave like the real thing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::cdp::traits::*;
use crate::Error;

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: AtomicBool,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: AtomicBool::new(true),
        }
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, _method: &str, _params: Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::cdp("Connection is closed"));
        }

        Ok(CdpResponse {
            id: 0,
            result: Some(serde_json::json!({})),
            error: None,
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// One scripted evaluation rule
#[derive(Debug)]
struct EvalRule {
    /// Substring matched against the evaluated expression
    pattern: String,
    /// Responses returned in order; the last one repeats
    responses: VecDeque<Value>,
}

/// Mock CDP client
///
/// Rules are matched first-registered-first; a script that matches no rule
/// falls back to built-in answers for `window.location.href` and
/// `document.readyState`, then to `Null`.
#[derive(Debug)]
pub struct MockCdpClient {
    connection: Arc<MockCdpConnection>,
    rules: Mutex<Vec<EvalRule>>,
    current_url: Mutex<String>,
    content: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    evaluated: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    hold_url: AtomicBool,
    fail_navigation: AtomicBool,
}

impl MockCdpClient {
    /// Create a new mock CDP client
    pub fn new() -> Self {
        Self {
            connection: Arc::new(MockCdpConnection::new()),
            rules: Mutex::new(Vec::new()),
            current_url: Mutex::new("about:blank".to_string()),
            content: Mutex::new(String::new()),
            navigations: Mutex::new(Vec::new()),
            evaluated: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            hold_url: AtomicBool::new(false),
            fail_navigation: AtomicBool::new(false),
        }
    }

    /// Register a canned evaluation result for scripts containing `pattern`
    pub fn on_eval(&self, pattern: &str, result: Value) {
        let mut rules = self.rules.lock().unwrap();
        if let Some(rule) = rules.iter_mut().find(|r| r.pattern == pattern) {
            rule.responses.push_back(result);
        } else {
            rules.push(EvalRule {
                pattern: pattern.to_string(),
                responses: VecDeque::from([result]),
            });
        }
    }

    /// Set the markup returned by `get_content`
    pub fn set_content(&self, html: &str) {
        *self.content.lock().unwrap() = html.to_string();
    }

    /// Freeze `window.location.href` so navigations do not change it
    pub fn hold_url(&self, hold: bool) {
        self.hold_url.store(hold, Ordering::Relaxed);
    }

    /// Make subsequent navigations fail
    pub fn fail_navigation(&self, fail: bool) {
        self.fail_navigation.store(fail, Ordering::Relaxed);
    }

    /// URLs navigated to, in order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    /// Scripts evaluated, in order
    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }

    /// Raw CDP methods called, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn value_to_result(value: Value) -> EvaluationResult {
        match value {
            Value::String(s) => EvaluationResult::String(s),
            Value::Number(n) => EvaluationResult::Number(n.as_f64().unwrap_or(0.0)),
            Value::Bool(b) => EvaluationResult::Bool(b),
            Value::Null => EvaluationResult::Null,
            other => EvaluationResult::Object(other),
        }
    }
}

impl Default for MockCdpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpClient for MockCdpClient {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection) as Arc<dyn CdpConnection>
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        if self.fail_navigation.load(Ordering::Relaxed) {
            return Err(Error::navigation_failed(url.to_string()));
        }

        self.navigations.lock().unwrap().push(url.to_string());

        if !self.hold_url.load(Ordering::Relaxed) {
            *self.current_url.lock().unwrap() = url.to_string();
        }

        Ok(NavigationResult {
            url: url.to_string(),
            is_loaded: true,
        })
    }

    async fn evaluate(&self, script: &str, _await_promise: bool) -> Result<EvaluationResult, Error> {
        self.evaluated.lock().unwrap().push(script.to_string());

        {
            let mut rules = self.rules.lock().unwrap();
            if let Some(rule) = rules.iter_mut().find(|r| script.contains(&r.pattern)) {
                let value = if rule.responses.len() > 1 {
                    rule.responses.pop_front().unwrap_or(Value::Null)
                } else {
                    rule.responses.front().cloned().unwrap_or(Value::Null)
                };
                return Ok(Self::value_to_result(value));
            }
        }

        if script.contains("window.location.href") {
            return Ok(EvaluationResult::String(self.current_url.lock().unwrap().clone()));
        }

        if script.contains("document.readyState") {
            return Ok(EvaluationResult::String("complete".to_string()));
        }

        Ok(EvaluationResult::Null)
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.current_url.lock().unwrap().clone())
    }

    async fn get_content(&self) -> Result<String, Error> {
        Ok(self.content.lock().unwrap().clone())
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(format!("{}.enable", domain));
        Ok(())
    }

    async fn call_method(&self, method: &str, _params: Value) -> Result<Value, Error> {
        self.calls.lock().unwrap().push(method.to_string());
        Ok(serde_json::json!({}))
    }
}
