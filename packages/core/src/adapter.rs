//! The host-node adapter the reconciler is built against (spec §6).
//!
//! This is the renderer-agnostic seam: a DOM renderer, a terminal renderer,
//! or a test harness all implement [`HostAdapter`] and the reconciler never
//! needs to know which one it is talking to. The core holds host node
//! handles directly (`N`) rather than going through an indirect element-id
//! registry, matching the spec's literal data model ("`el`: mutable
//! back-reference to the host node").

use crate::props::PropValue;

/// A host node handle. Implementations are typically a cheap `Clone`
/// wrapper around a pointer or index into the real renderer's node tree
/// (a DOM `Node`, a terminal cell-buffer handle, ...).
pub trait HostAdapter<N: Clone> {
    /// Creates a new host element for the given tag name.
    fn create_element(&self, tag: &str) -> N;

    /// Creates a new host text node with the given initial content.
    fn create_text_node(&self, text: &str) -> N;

    /// Creates a new host comment node with the given initial content.
    fn create_comment(&self, text: &str) -> N;

    /// Inserts `node` into `parent`, before `anchor` (or appended, when
    /// `anchor` is `None`).
    fn insert(&self, node: &N, parent: &N, anchor: Option<&N>);

    /// Removes `node` from `parent`. Not named in the spec's interface
    /// table, but required by its own unmount walker (§4.6: "remove `el`
    /// from its parent host node") - every renderer needs it.
    fn remove(&self, node: &N, parent: &N);

    /// Replaces all of `el`'s children with a single text node.
    fn set_element_text(&self, el: &N, text: &str);

    /// Overwrites the content of an existing text or comment host node in
    /// place (spec §4.1: "if reused and textual content differs, update
    /// it"), mirroring the teacher's dedicated `set_node_text` mutation
    /// rather than reusing `set_element_text` for a node that isn't itself
    /// a container.
    fn set_text(&self, node: &N, text: &str);

    /// Adds, updates, or removes (when `next` is `None`) a single
    /// attribute/event-handler/property on `el`.
    fn patch_prop(&self, el: &N, name: &str, prev: Option<&PropValue>, next: Option<&PropValue>);

    /// Schedules `cb` to run on the next animation/host frame. Used by
    /// transition support; outside that, the default (run inline) is fine.
    fn next_frame(&self, cb: Box<dyn FnOnce()>) {
        cb();
    }
}
