//! Core reconciler for a renderer-agnostic reactive virtual DOM.
//!
//! This crate is the host-independent half of a UI framework: given an
//! implementation of [`HostAdapter`] for some concrete host node type `N`,
//! it diffs [`VNode`] trees, drives component setup/render/lifecycle, and
//! issues the minimal set of host mutations. It does not itself talk to a
//! real DOM, a terminal, or any other surface - that is the adapter's job.
//!
//! The public entry point is [`create_renderer`]; [`on_mounted`] is the
//! only other free function most users need.

mod adapter;
mod children;
mod component;
mod lis;
mod patch;
mod props;
mod reactive;
mod unmount;
mod vnode;

pub use adapter::HostAdapter;
pub use component::{
    on_mounted, ComponentDef, ComponentInstance, PropSpec, RenderContext, SetupContext, SetupOutcome,
};
pub use props::{has_props_changed, is_event_name, PropValue, Props};
pub use reactive::{effect, EffectHandle, Scheduler, Signal};
pub use vnode::{Children, Key, NodeKind, SlotFn, VNode};

use patch::patch;
use std::cell::RefCell;
use std::rc::Rc;
use unmount::unmount;

/// The renderer-agnostic root returned by [`create_renderer`]. Holds the
/// currently-mounted root vnode (if any) together with the container it
/// was mounted into (spec §6: `container._vnode`).
pub struct Renderer<N, A> {
    adapter: Rc<A>,
    root: RefCell<Option<(VNode<N>, N)>>,
}

impl<N, A> Renderer<N, A>
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    pub fn new(adapter: A) -> Self {
        Renderer { adapter: Rc::new(adapter), root: RefCell::new(None) }
    }

    /// The adapter this renderer was built with, e.g. for a test harness to
    /// inspect what it recorded.
    pub fn adapter(&self) -> &Rc<A> {
        &self.adapter
    }

    /// `render(vnode, container)` (spec §6): mounts, patches, or (when
    /// `vnode` is `None`) unmounts the renderer's single tracked root.
    pub fn render(&self, vnode: Option<VNode<N>>, container: N) {
        let previous = self.root.borrow_mut().take();
        match (previous, vnode) {
            (Some((old_vnode, old_container)), Some(new_vnode)) => {
                patch(Some(&old_vnode), &new_vnode, &old_container, None, &self.adapter);
                *self.root.borrow_mut() = Some((new_vnode, old_container));
            }
            (Some((old_vnode, old_container)), None) => {
                unmount(&old_vnode, &old_container, &self.adapter);
            }
            (None, Some(new_vnode)) => {
                patch(None, &new_vnode, &container, None, &self.adapter);
                *self.root.borrow_mut() = Some((new_vnode, container));
            }
            (None, None) => {}
        }
    }
}

/// `createRenderer(adapter) -> { render, onMounted }` (spec §6). `onMounted`
/// is a free function ([`on_mounted`]) rather than a field, since it reads
/// an ambient scope rather than anything owned by a particular renderer.
pub fn create_renderer<N, A>(adapter: A) -> Renderer<N, A>
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    Renderer::new(adapter)
}
