mod support;

use pretty_assertions::assert_eq;
use std::rc::{Rc, Weak};
use support::{NodeId, Op, RecordingHost};
use vtree_core::{create_renderer, Children, ComponentDef, Props, RenderContext, VNode};

#[test]
fn unmounting_a_parent_tears_down_nested_elements_depth_first() {
    support::init_logging();
    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let tree = VNode::element(
        "div",
        Props::default(),
        Children::Nodes(vec![
            VNode::element("span", Props::default(), Children::Text("a".to_string())),
            VNode::element("span", Props::default(), Children::Text("b".to_string())),
        ]),
    );
    renderer.render(Some(tree), container);
    renderer.adapter().take_ops();

    renderer.render(None, container);

    let ops = renderer.adapter().take_ops();
    // children removed from their own parent before the parent itself is
    // removed from the outer container.
    match ops.as_slice() {
        [Op::Remove { parent: p1, .. }, Op::Remove { parent: p2, .. }, Op::Remove { node, parent: p3 }] => {
            assert_eq!(p1, p2);
            assert_eq!(*p3, 0);
            assert_eq!(*node, 1);
        }
        other => panic!("unexpected teardown sequence: {other:?}"),
    }
}

#[test]
fn unmounting_a_component_drops_its_last_instance_reference() {
    support::init_logging();
    // Invariant 5: once a mounted component's vnode (and thus the subtree
    // containing it) is fully unmounted, nothing keeps its
    // `ComponentInstance` alive.
    let captured: Rc<std::cell::RefCell<Option<Weak<std::cell::RefCell<vtree_core::ComponentInstance<NodeId>>>>>> =
        Rc::new(std::cell::RefCell::new(None));
    let captured_in_hook = captured.clone();

    let def = Rc::new(
        ComponentDef::from_render("Leaf", |_ctx: &RenderContext<NodeId>| VNode::text("leaf"))
            .with_created(move |ctx: &RenderContext<NodeId>| {
                *captured_in_hook.borrow_mut() = Some(Rc::downgrade(ctx.instance()));
            }),
    );

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let vnode = VNode::component(def, Props::default(), Children::None);
    renderer.render(Some(vnode), container);

    let weak_instance = captured.borrow_mut().take().expect("created hook must have run");
    assert!(weak_instance.upgrade().is_some());

    renderer.render(None, container);

    assert!(weak_instance.upgrade().is_none(), "instance must be dropped once fully unmounted");
}

#[test]
fn fragment_unmount_removes_children_but_issues_no_fragment_level_remove() {
    support::init_logging();
    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let tree = VNode::fragment(vec![
        VNode::text("a"),
        VNode::text("b"),
    ]);
    renderer.render(Some(tree), container);
    renderer.adapter().take_ops();

    renderer.render(None, container);

    let ops = renderer.adapter().take_ops();
    assert_eq!(
        ops,
        vec![
            Op::Remove { node: 1, parent: 0 },
            Op::Remove { node: 2, parent: 0 },
        ]
    );
}

#[test]
fn nested_component_inside_element_is_torn_down_before_its_host_element() {
    support::init_logging();
    let def = Rc::new(ComponentDef::from_render("Leaf", |_ctx: &RenderContext<NodeId>| {
        VNode::text("leaf")
    }));

    let renderer = create_renderer(RecordingHost::new());
    let container = NodeId(0);

    let tree = VNode::element(
        "div",
        Props::default(),
        Children::Nodes(vec![VNode::component(def, Props::default(), Children::None)]),
    );
    renderer.render(Some(tree), container);
    renderer.adapter().take_ops();

    renderer.render(None, container);

    let ops = renderer.adapter().take_ops();
    // The component's text leaf (node 2) is removed from the div (node 1)
    // before the div itself is removed from the container.
    assert_eq!(
        ops,
        vec![
            Op::Remove { node: 2, parent: 1 },
            Op::Remove { node: 1, parent: 0 },
        ]
    );
}
