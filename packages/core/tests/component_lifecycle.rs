mod support;

use std::cell::RefCell;
use std::rc::Rc;
use support::{NodeId, Op, RecordingHost};
use vtree_core::{
    create_renderer, on_mounted, ComponentDef, Props, PropSpec, PropValue, RenderContext, SetupOutcome, VNode,
};

fn counter_def(log: Rc<RefCell<Vec<&'static str>>>) -> Rc<ComponentDef<NodeId>> {
    let log_create = log.clone();
    let log_mount = log.clone();
    let log_update = log.clone();
    let log_unmount = log.clone();

    Rc::new(
        ComponentDef::new("Counter")
            .with_props(&[PropSpec::with_default("label", || PropValue::Str("n".to_string()))])
            .with_data(|| {
                let mut state = Props::default();
                state.insert("count".to_string(), PropValue::Number(0.0));
                state
            })
            .with_setup(move |_props, _ctx| {
                let log = log_create.clone();
                on_mounted(move || log.borrow_mut().push("on_mounted"));
                SetupOutcome::State(Props::default())
            })
            .with_created(move |_ctx| log_create.borrow_mut().push("created"))
            .with_before_mount(|_ctx| {})
            .with_mounted(move |_ctx| log_mount.borrow_mut().push("mounted"))
            .with_before_update(|_ctx| {})
            .with_updated(move |_ctx| log_update.borrow_mut().push("updated"))
            .with_before_unmount(|_ctx| {})
            .with_unmounted(move |_ctx| log_unmount.borrow_mut().push("unmounted"))
            .with_render(|ctx: &RenderContext<NodeId>| {
                let count = match ctx.get("count") {
                    Some(PropValue::Number(n)) => n,
                    _ => 0.0,
                };
                // Read `label` too so the render effect subscribes to the
                // props signal, not just `state` - otherwise a prop-only
                // change would never re-trigger this effect.
                let label = match ctx.get("label") {
                    Some(PropValue::Str(s)) => s,
                    _ => "n".to_string(),
                };
                VNode::text(format!("{label}={count}"))
            }),
    )
}

#[test]
fn mount_runs_hooks_in_spec_order_with_on_mounted_before_mounted() {
    support::init_logging();
    let log = Rc::new(RefCell::new(Vec::new()));
    let def = counter_def(log.clone());

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let vnode = VNode::component(def, Props::default(), vtree_core::Children::None);
    renderer.render(Some(vnode), container);

    // created, then the subtree mounts (text node creation), then the
    // queued on_mounted callback drains before the `mounted` hook fires.
    assert_eq!(*log.borrow(), vec!["created", "on_mounted", "mounted"]);

    let ops = renderer.adapter().take_ops();
    assert!(ops.iter().any(|op| matches!(op, Op::CreateText { text, .. } if text == "n=0")));
}

#[test]
fn prop_change_triggers_before_update_and_updated_but_not_a_second_created() {
    support::init_logging();
    let log = Rc::new(RefCell::new(Vec::new()));
    let def = counter_def(log.clone());

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let v1 = VNode::component(def.clone(), Props::default(), vtree_core::Children::None);
    renderer.render(Some(v1), container);
    log.borrow_mut().clear();

    let mut props2 = Props::default();
    props2.insert("label".to_string(), PropValue::Str("other".to_string()));
    let v2 = VNode::component(def, props2, vtree_core::Children::None);
    renderer.render(Some(v2), container);

    assert_eq!(*log.borrow(), vec!["updated"]);
}

#[test]
fn unmount_stops_effect_and_runs_unmounted_hook() {
    support::init_logging();
    let log = Rc::new(RefCell::new(Vec::new()));
    let def = counter_def(log.clone());

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let vnode = VNode::component(def, Props::default(), vtree_core::Children::None);
    renderer.render(Some(vnode), container);
    log.borrow_mut().clear();
    renderer.adapter().take_ops();

    renderer.render(None, container);

    assert_eq!(*log.borrow(), vec!["unmounted"]);
    let ops = renderer.adapter().take_ops();
    assert!(ops.iter().any(|op| matches!(op, Op::Remove { .. })));
}

#[test]
fn on_mounted_outside_setup_is_a_discarded_no_op() {
    support::init_logging();
    // Calling on_mounted with no component currently being set up must not
    // panic - the callback is simply dropped (with a diagnostic).
    on_mounted(|| panic!("this callback must never run"));
}

#[test]
fn function_component_sugar_renders_via_from_render() {
    support::init_logging();
    let def = Rc::new(
        ComponentDef::from_render("Greeting", |ctx: &RenderContext<NodeId>| {
            let name = match ctx.get("name") {
                Some(PropValue::Str(s)) => s,
                _ => "world".to_string(),
            };
            VNode::text(format!("hello, {name}"))
        })
        .with_props(&[PropSpec::required("name")]),
    );

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let mut props = Props::default();
    props.insert("name".to_string(), PropValue::Str("vtree".to_string()));
    let vnode = VNode::component(def, props, vtree_core::Children::None);
    renderer.render(Some(vnode), container);

    let ops = renderer.adapter().take_ops();
    assert!(ops.iter().any(|op| matches!(op, Op::CreateText { text, .. } if text == "hello, vtree")));
}
