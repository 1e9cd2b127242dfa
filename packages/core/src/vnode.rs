//! The immutable vnode descriptor (spec §3) and the mutable back-references
//! it carries once mounted.
//!
//! Ownership follows the "parent-owned arena/handles" redesign from spec §9:
//! a container exclusively owns its root [`VNode`]; a vnode exclusively owns
//! its children and (for component vnodes) its [`ComponentInstance`] via a
//! single `Rc` created at mount and dropped at unmount. `el`/`component` are
//! mutable back-reference cells, not a second owner.

use crate::component::ComponentDef;
use crate::props::Props;
use fxhash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A sibling-identity token (spec §3, Glossary: "Key"). Equality is strict,
/// matching the spec's `===` requirement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Str(Rc<str>),
    Int(i64),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(Rc::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(Rc::from(s.as_str()))
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

/// What kind of node a [`VNode`] is (spec §9 redesign: "replace
/// stringly/typeof dispatch with a tagged sum").
pub enum NodeKind<N> {
    Element(Rc<str>),
    Text,
    Comment,
    Fragment,
    Component(Rc<ComponentDef<N>>),
}

impl<N> Clone for NodeKind<N> {
    fn clone(&self) -> Self {
        match self {
            NodeKind::Element(tag) => NodeKind::Element(tag.clone()),
            NodeKind::Text => NodeKind::Text,
            NodeKind::Comment => NodeKind::Comment,
            NodeKind::Fragment => NodeKind::Fragment,
            NodeKind::Component(def) => NodeKind::Component(def.clone()),
        }
    }
}

/// A thunk handed to a component as a named slot (spec §3: "slot mapping
/// (name -> thunk returning a VNode)").
pub type SlotFn<N> = Rc<dyn Fn() -> VNode<N>>;

/// The `children` field of a vnode (spec §3).
pub enum Children<N> {
    None,
    Text(String),
    Nodes(Vec<VNode<N>>),
    Slots(FxHashMap<String, SlotFn<N>>),
}

impl<N> Children<N> {
    pub fn as_nodes(&self) -> Option<&[VNode<N>]> {
        match self {
            Children::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Children::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }
}

/// An immutable vnode descriptor produced by user code, with a handful of
/// mutable back-reference cells populated once it is mounted (spec §3).
pub struct VNode<N> {
    pub kind: NodeKind<N>,
    pub props: Props,
    pub children: Children<N>,
    pub key: Option<Key>,
    el: RefCell<Option<N>>,
    component: RefCell<Option<Rc<RefCell<crate::component::ComponentInstance<N>>>>>,
}

impl<N: Clone> VNode<N> {
    pub fn element(tag: impl Into<Rc<str>>, props: Props, children: Children<N>) -> Self {
        VNode {
            kind: NodeKind::Element(tag.into()),
            props,
            children,
            key: None,
            el: RefCell::new(None),
            component: RefCell::new(None),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        VNode {
            kind: NodeKind::Text,
            props: Props::default(),
            children: Children::Text(text.into()),
            key: None,
            el: RefCell::new(None),
            component: RefCell::new(None),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        VNode {
            kind: NodeKind::Comment,
            props: Props::default(),
            children: Children::Text(text.into()),
            key: None,
            el: RefCell::new(None),
            component: RefCell::new(None),
        }
    }

    pub fn fragment(children: Vec<VNode<N>>) -> Self {
        VNode {
            kind: NodeKind::Fragment,
            props: Props::default(),
            children: Children::Nodes(children),
            key: None,
            el: RefCell::new(None),
            component: RefCell::new(None),
        }
    }

    pub fn component(def: Rc<ComponentDef<N>>, props: Props, children: Children<N>) -> Self {
        VNode {
            kind: NodeKind::Component(def),
            props,
            children,
            key: None,
            el: RefCell::new(None),
            component: RefCell::new(None),
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn set_el(&self, node: N) {
        *self.el.borrow_mut() = Some(node);
    }

    pub fn el(&self) -> Option<N> {
        self.el.borrow().clone()
    }

    pub fn set_component(&self, instance: Rc<RefCell<crate::component::ComponentInstance<N>>>) {
        *self.component.borrow_mut() = Some(instance);
    }

    pub fn component_instance(&self) -> Option<Rc<RefCell<crate::component::ComponentInstance<N>>>> {
        self.component.borrow().clone()
    }

    /// The first real host node produced by this vnode's subtree, used to
    /// anchor insertions before a list neighbor that may itself be a
    /// fragment or component (spec §4.4, §9: "`find_first_element`").
    pub fn first_host_node(&self) -> Option<N> {
        match &self.kind {
            NodeKind::Element(_) | NodeKind::Text | NodeKind::Comment => self.el(),
            NodeKind::Fragment => self
                .children
                .as_nodes()
                .and_then(|c| c.first())
                .and_then(|c| c.first_host_node()),
            NodeKind::Component(_) => self
                .component_instance()
                .and_then(|inst| inst.borrow().sub_tree().and_then(|t| t.first_host_node())),
        }
    }

    /// The last real host node produced by this vnode's subtree (spec §9:
    /// "`find_last_element`").
    pub fn last_host_node(&self) -> Option<N> {
        match &self.kind {
            NodeKind::Element(_) | NodeKind::Text | NodeKind::Comment => self.el(),
            NodeKind::Fragment => self
                .children
                .as_nodes()
                .and_then(|c| c.last())
                .and_then(|c| c.last_host_node()),
            NodeKind::Component(_) => self
                .component_instance()
                .and_then(|inst| inst.borrow().sub_tree().and_then(|t| t.last_host_node())),
        }
    }
}
