//! The patch dispatcher and element/component reconcilers (spec §4.1,
//! §4.2, §4.5).

use crate::adapter::HostAdapter;
use crate::children::reconcile_children;
use crate::component::{
    resolve_props, slots_from_children, ComponentInstance, RenderContext, SetupContext, SetupOutcome,
    SetupScope,
};
use crate::props::has_props_changed;
use crate::reactive::{effect, Signal};
use crate::unmount::unmount;
use crate::vnode::{Children, NodeKind, VNode};
use std::cell::RefCell;
use std::rc::Rc;

fn same_kind<N>(a: &NodeKind<N>, b: &NodeKind<N>) -> bool {
    match (a, b) {
        (NodeKind::Element(t1), NodeKind::Element(t2)) => t1 == t2,
        (NodeKind::Text, NodeKind::Text) => true,
        (NodeKind::Comment, NodeKind::Comment) => true,
        (NodeKind::Fragment, NodeKind::Fragment) => true,
        (NodeKind::Component(d1), NodeKind::Component(d2)) => Rc::ptr_eq(d1, d2),
        _ => false,
    }
}

/// `patch(oldV, newV, container, anchor)` (spec §4.1). `old` is `None` for
/// a pure mount. `adapter` is threaded as an `Rc` rather than a plain
/// reference because a component's reactive effect outlives any single
/// `patch` call and must keep its own handle to it (spec §4.5 step 8).
pub fn patch<N, A>(old: Option<&VNode<N>>, new: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let old = match old {
        Some(old) if same_kind(&old.kind, &new.kind) => Some(old),
        Some(old) => {
            unmount(old, container, adapter);
            None
        }
        None => None,
    };

    match &new.kind {
        NodeKind::Element(tag) => match old {
            Some(old) => patch_element(old, new, adapter),
            None => mount_element(tag, new, container, anchor, adapter),
        },
        NodeKind::Text => match old {
            Some(old) => patch_text_like(old, new, adapter),
            None => mount_text_like(new, container, anchor, adapter, false),
        },
        NodeKind::Comment => match old {
            Some(old) => patch_text_like(old, new, adapter),
            None => mount_text_like(new, container, anchor, adapter, true),
        },
        NodeKind::Fragment => match old {
            Some(old) => reconcile_children(&old.children, &new.children, container, anchor, adapter),
            None => mount_fragment(new, container, anchor, adapter),
        },
        NodeKind::Component(_) => match old {
            Some(old) => patch_component(old, new, adapter),
            None => mount_component(new, container, anchor, adapter),
        },
    }
}

fn mount_element<N, A>(tag: &str, new: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let el = adapter.create_element(tag);
    new.set_el(el.clone());

    match &new.children {
        Children::Text(text) => adapter.set_element_text(&el, text),
        Children::Nodes(nodes) => {
            for node in nodes {
                patch(None, node, &el, None, adapter);
            }
        }
        Children::None | Children::Slots(_) => {}
    }

    for (name, value) in &new.props {
        adapter.patch_prop(&el, name, None, Some(value));
    }

    adapter.insert(&el, container, anchor);
}

fn patch_element<N, A>(old: &VNode<N>, new: &VNode<N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let el = old.el().expect("patched element vnode missing host node");
    new.set_el(el.clone());

    for (name, value) in &new.props {
        if old.props.get(name) != Some(value) {
            adapter.patch_prop(&el, name, old.props.get(name), Some(value));
        }
    }
    for (name, value) in &old.props {
        if !new.props.contains_key(name) {
            adapter.patch_prop(&el, name, Some(value), None);
        }
    }

    reconcile_children(&old.children, &new.children, &el, None, adapter);
}

fn mount_text_like<N, A>(new: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>, is_comment: bool)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let text = new.children.as_text().unwrap_or("");
    let node = if is_comment {
        adapter.create_comment(text)
    } else {
        adapter.create_text_node(text)
    };
    new.set_el(node.clone());
    adapter.insert(&node, container, anchor);
}

fn patch_text_like<N, A>(old: &VNode<N>, new: &VNode<N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let node = old.el().expect("patched text/comment vnode missing host node");
    new.set_el(node.clone());
    let old_text = old.children.as_text().unwrap_or("");
    let new_text = new.children.as_text().unwrap_or("");
    if old_text != new_text {
        adapter.set_text(&node, new_text);
    }
}

fn mount_fragment<N, A>(new: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    if let Some(nodes) = new.children.as_nodes() {
        for node in nodes {
            patch(None, node, container, anchor, adapter);
        }
    }
}

/// `mountComponent(vnode, container, anchor)` (spec §4.5).
fn mount_component<N, A>(new: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let def = match &new.kind {
        NodeKind::Component(def) => def.clone(),
        _ => unreachable!("mount_component called on a non-component vnode"),
    };

    if let Some(before_create) = &def.before_create {
        before_create();
    }

    let (props, attrs) = resolve_props(&def, new.props.clone());
    let slots = slots_from_children(&new.children);

    let instance = Rc::new(RefCell::new(ComponentInstance::new(def.clone(), props, attrs, slots)));

    if let Some(data_fn) = &def.data {
        let initial_state = data_fn();
        instance.borrow_mut().set_state(Signal::new(initial_state));
    }

    instance.borrow().set_host_position(container.clone(), anchor.cloned());
    new.set_component(instance.clone());

    // spec §4.5 step 5: publish `instance` to the ambient "current instance"
    // slot for the duration of `setup` so `on_mounted` can register.
    let setup_scope = SetupScope::enter();
    let setup_outcome = def.setup.as_ref().map(|setup| {
        let props_snapshot = instance.borrow().props_signal().with(|p| p.clone());
        let mut setup_ctx = SetupContext::new(instance.clone());
        setup(&props_snapshot, &mut setup_ctx)
    });
    let mounted_callbacks = setup_scope.take_callbacks();
    drop(setup_scope);

    if let Some(outcome) = setup_outcome {
        match outcome {
            SetupOutcome::Render(render_fn) => instance.borrow().override_render(render_fn),
            SetupOutcome::State(state) => instance.borrow().set_setup_state(state),
        }
    }

    let render_ctx = RenderContext::new(instance.clone());

    if let Some(created) = &def.created {
        created(&render_ctx);
    }

    for cb in mounted_callbacks {
        instance.borrow().queue_mounted_callback(cb);
    }

    run_component_effect(instance, render_ctx, adapter.clone());
}

/// `patchComponent(oldV, newV)` (spec §4.5).
fn patch_component<N, A>(old: &VNode<N>, new: &VNode<N>, _adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let instance = old
        .component_instance()
        .expect("patched component vnode missing instance");
    new.set_component(instance.clone());

    let def = instance.borrow().def.clone();
    let (new_props, new_attrs) = resolve_props(&def, new.props.clone());

    // spec §4.5 step 2: `hasPropsChanged(oldV.props, newV.props)` compares
    // the raw incoming vnode prop maps, not the already-resolved
    // declared-props subset - an attrs-only key changing must still
    // refresh `attrs` below, even though it never touches `props_signal`.
    let changed = has_props_changed(&old.props, &new.props);

    // The re-render this may trigger runs through the reactive effect
    // (spec §4.5: "the patch function must NOT itself call `patch` on the
    // subtree"), not inline here.
    if changed {
        instance.borrow().apply_props_patch(new_props, new_attrs);
    }
    instance.borrow().set_slots(slots_from_children(&new.children));
}

/// Attaches the reactive effect that drives a component's render/patch
/// cycle (spec §4.5 step 8). Split out of `mount_component` so the
/// closure can be built once the render context exists.
fn run_component_effect<N, A>(instance: Rc<RefCell<ComponentInstance<N>>>, render_ctx: RenderContext<N>, adapter: Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let effect_instance = instance.clone();
    let effect_ctx = render_ctx;
    let handle = effect(
        move || {
            let def = effect_instance.borrow().def.clone();
            let render = effect_instance.borrow().current_render().expect(
                "component has neither a declared `render` nor one returned from `setup`",
            );
            let sub_tree = render(&effect_ctx);

            let (container, anchor) = effect_instance.borrow().host_position();
            let is_mounted = effect_instance.borrow().is_mounted();

            if !is_mounted {
                if let Some(before_mount) = &def.before_mount {
                    before_mount(&effect_ctx);
                }
                patch(None, &sub_tree, &container, anchor.as_ref(), &adapter);
                effect_instance.borrow().set_mounted();
                effect_instance.borrow().set_sub_tree(sub_tree);
                effect_instance.borrow().drain_mounted_callbacks();
                if let Some(mounted) = &def.mounted {
                    mounted(&effect_ctx);
                }
            } else {
                if let Some(before_update) = &def.before_update {
                    before_update(&effect_ctx);
                }
                let old_sub_tree = effect_instance.borrow().take_sub_tree();
                patch(old_sub_tree.as_ref(), &sub_tree, &container, anchor.as_ref(), &adapter);
                effect_instance.borrow().set_sub_tree(sub_tree);
                if let Some(updated) = &def.updated {
                    updated(&effect_ctx);
                }
            }
        },
        None,
    );
    instance.borrow().set_effect(handle);
}
