//! DOM layer
//!
//! Selector chains with ordered fallback, live element handles backed by an
//! in-page registry, and condition-polled readiness waiting.

pub mod scripts;
pub mod selector;
pub mod element;
pub mod resolver;
pub mod wait;

pub use element::ElementHandle;
pub use resolver::{resolve_all, resolve_one, Scope};
pub use selector::{SelectorChain, SelectorQuery};
pub use wait::{ReadyCondition, Waiter};
