//! A recording [`HostAdapter`] used across the integration tests: instead
//! of touching a real DOM it pushes each call onto a shared log as an
//! [`Op`], so a test can assert the exact mutation sequence a patch
//! produced, in the style of the teacher's `edits` assertions.

use std::cell::{Cell, RefCell};
use std::sync::Once;
use vtree_core::{HostAdapter, PropValue};

static LOG_INIT: Once = Once::new();

/// Initializes `env_logger` once per test binary, so a failing test's
/// `log::warn!`/`log::debug!` diagnostics (e.g. a refused render-context
/// write) show up under `--nocapture` instead of going nowhere.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropSnapshot {
    Str(String),
    Bool(bool),
    Number(String),
    Handler,
    Any,
}

pub fn snapshot(value: &PropValue) -> PropSnapshot {
    match value {
        PropValue::Str(s) => PropSnapshot::Str(s.clone()),
        PropValue::Bool(b) => PropSnapshot::Bool(*b),
        PropValue::Number(n) => PropSnapshot::Number(n.to_string()),
        PropValue::Handler(_) => PropSnapshot::Handler,
        PropValue::Any(_) => PropSnapshot::Any,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    CreateElement { id: u32, tag: String },
    CreateText { id: u32, text: String },
    CreateComment { id: u32, text: String },
    Insert { node: u32, parent: u32, anchor: Option<u32> },
    Remove { node: u32, parent: u32 },
    SetElementText { el: u32, text: String },
    SetText { node: u32, text: String },
    PatchProp { el: u32, name: String, prev: Option<PropSnapshot>, next: Option<PropSnapshot> },
}

/// A host node handle: just an opaque, cheaply-`Copy` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Default)]
pub struct RecordingHost {
    next_id: Cell<u32>,
    pub ops: RefCell<Vec<Op>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        RecordingHost { next_id: Cell::new(1), ops: RefCell::new(Vec::new()) }
    }

    fn alloc(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    pub fn take_ops(&self) -> Vec<Op> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }
}

impl HostAdapter<NodeId> for RecordingHost {
    fn create_element(&self, tag: &str) -> NodeId {
        let id = self.alloc();
        self.ops.borrow_mut().push(Op::CreateElement { id: id.0, tag: tag.to_string() });
        id
    }

    fn create_text_node(&self, text: &str) -> NodeId {
        let id = self.alloc();
        self.ops.borrow_mut().push(Op::CreateText { id: id.0, text: text.to_string() });
        id
    }

    fn create_comment(&self, text: &str) -> NodeId {
        let id = self.alloc();
        self.ops.borrow_mut().push(Op::CreateComment { id: id.0, text: text.to_string() });
        id
    }

    fn insert(&self, node: &NodeId, parent: &NodeId, anchor: Option<&NodeId>) {
        self.ops.borrow_mut().push(Op::Insert {
            node: node.0,
            parent: parent.0,
            anchor: anchor.map(|a| a.0),
        });
    }

    fn remove(&self, node: &NodeId, parent: &NodeId) {
        self.ops.borrow_mut().push(Op::Remove { node: node.0, parent: parent.0 });
    }

    fn set_element_text(&self, el: &NodeId, text: &str) {
        self.ops.borrow_mut().push(Op::SetElementText { el: el.0, text: text.to_string() });
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.ops.borrow_mut().push(Op::SetText { node: node.0, text: text.to_string() });
    }

    fn patch_prop(&self, el: &NodeId, name: &str, prev: Option<&PropValue>, next: Option<&PropValue>) {
        self.ops.borrow_mut().push(Op::PatchProp {
            el: el.0,
            name: name.to_string(),
            prev: prev.map(snapshot),
            next: next.map(snapshot),
        });
    }
}
