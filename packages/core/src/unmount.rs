//! The unmount walker (spec §4.6) and the supplemented component teardown
//! sequencing (spec §11).

use crate::adapter::HostAdapter;
use crate::component::RenderContext;
use crate::vnode::{Children, NodeKind, VNode};
use std::rc::Rc;

/// Tears down `vnode`'s subtree. Infallible by design (spec §7: "any
/// exception during a child's teardown must not prevent siblings from
/// being torn down") - there is simply nothing here that can fail, since
/// adapter errors are the adapter's own contract to avoid.
pub fn unmount<N, A>(vnode: &VNode<N>, parent: &N, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    match &vnode.kind {
        NodeKind::Component(_) => unmount_component(vnode, adapter),
        NodeKind::Fragment => {
            if let Children::Nodes(nodes) = &vnode.children {
                for child in nodes {
                    unmount(child, parent, adapter);
                }
            }
        }
        NodeKind::Element(_) | NodeKind::Text | NodeKind::Comment => {
            if let Children::Nodes(nodes) = &vnode.children {
                let el = vnode.el().expect("unmounting element missing host node");
                for child in nodes {
                    unmount(child, &el, adapter);
                }
            }
            if let Some(el) = vnode.el() {
                adapter.remove(&el, parent);
            }
        }
    }
}

/// `beforeUnmount` -> effect stopped -> subtree torn down depth-first ->
/// `unmounted` (spec §11, symmetric with the mount sequence's "fire after
/// insertion" ordering for `mounted`).
fn unmount_component<N, A>(vnode: &VNode<N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let instance = match vnode.component_instance() {
        Some(instance) => instance,
        None => return,
    };

    let render_ctx = RenderContext::new(instance.clone());
    let def = instance.borrow().def.clone();

    if let Some(before_unmount) = &def.before_unmount {
        before_unmount(&render_ctx);
    }

    instance.borrow().stop_effect();

    let sub_tree = instance.borrow().take_sub_tree();
    if let Some(sub_tree) = &sub_tree {
        let (container, _anchor) = instance.borrow().host_position();
        unmount(sub_tree, &container, adapter);
    }

    if let Some(unmounted) = &def.unmounted {
        unmounted(&render_ctx);
    }

    // Dropping `instance` here (its last strong reference, since the
    // vnode's `component` cell is about to go out of scope with `vnode`
    // itself) satisfies invariant 5: every `ComponentInstance` a torn-down
    // subtree contained is dereferenced.
}
