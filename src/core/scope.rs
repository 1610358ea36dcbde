//! Nested logical scopes, tracked per execution context
//!
//! Each thread owns its own stack of open scopes, held as a singly-linked
//! chain of `Arc` nodes from innermost to outermost. Snapshots taken at
//! event-build time are plain `Arc` walks into immutable nodes, so a scope
//! released concurrently with a dispatch using an older chain cannot
//! invalidate that dispatch's view.

use super::field_value::FieldValue;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// State attached to a scope: the rendered text plus the named argument
/// values the scope was begun with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopePayload {
    pub text: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl ScopePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: Vec::new(),
        }
    }
}

impl fmt::Display for ScopePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Debug)]
struct ScopeNode {
    payload: ScopePayload,
    parent: Option<Arc<ScopeNode>>,
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<ScopeNode>>> = const { RefCell::new(None) };
}

/// Open a scope on the calling thread's stack.
///
/// The returned guard releases the scope when dropped; most callers go
/// through `Logger::begin_scope`, which also notifies provider sinks.
pub fn begin(payload: ScopePayload) -> ScopeGuard {
    let node = CURRENT.with(|current| {
        let mut current = current.borrow_mut();
        let node = Arc::new(ScopeNode {
            payload,
            parent: current.take(),
        });
        *current = Some(Arc::clone(&node));
        node
    });
    ScopeGuard { node: Some(node) }
}

/// Snapshot the calling thread's open scopes, innermost first.
pub fn current_chain() -> Vec<ScopePayload> {
    CURRENT.with(|current| {
        let mut chain = Vec::new();
        let mut walker = current.borrow().clone();
        while let Some(node) = walker {
            chain.push(node.payload.clone());
            walker = node.parent.clone();
        }
        chain
    })
}

/// RAII handle for an open scope.
///
/// Release happens on drop or via [`release`](ScopeGuard::release), exactly
/// once. Releasing a scope that still has children open truncates the stack
/// back past those children, keeping the chain well-nested rather than
/// corrupting it.
#[derive(Debug)]
pub struct ScopeGuard {
    node: Option<Arc<ScopeNode>>,
}

impl ScopeGuard {
    /// Release this scope. Idempotent.
    pub fn release(&mut self) {
        if let Some(node) = self.node.take() {
            release_node(&node);
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.release();
    }
}

fn release_node(target: &Arc<ScopeNode>) {
    CURRENT.with(|current| {
        let mut current = current.borrow_mut();
        let mut walker = current.clone();
        while let Some(node) = walker {
            if Arc::ptr_eq(&node, target) {
                *current = node.parent.clone();
                return;
            }
            walker = node.parent.clone();
        }
        // Not on this thread's stack: already removed by an out-of-order
        // release further out, or released from a different thread.
    });
}
