//! Component definitions, instances, and the render-context proxy (spec
//! §3 "ComponentInstance", §4.5).

use crate::props::{is_event_name, Props, PropValue};
use crate::reactive::{EffectHandle, Signal};
use crate::vnode::{Children, SlotFn, VNode};
use fxhash::FxHashMap;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A declared component input: its name and an optional default-value
/// factory, used when the incoming prop is absent (spec §4.5 step 3:
/// "using a default if the incoming value is null/undefined").
pub struct PropSpec {
    pub name: &'static str,
    pub default: Option<fn() -> PropValue>,
}

impl PropSpec {
    pub const fn required(name: &'static str) -> Self {
        PropSpec { name, default: None }
    }

    pub const fn with_default(name: &'static str, default: fn() -> PropValue) -> Self {
        PropSpec { name, default: Some(default) }
    }
}

/// What a component's `setup()` produced (spec §4.5 step 5: "If the return
/// value is callable, it becomes `render`; else it is recorded as
/// `setupState`").
pub enum SetupOutcome<N> {
    Render(Rc<dyn Fn(&RenderContext<N>) -> VNode<N>>),
    State(Props),
}

/// The `{ attrs, emit, slots }` context passed to `setup()` (spec §4.5
/// step 5).
pub struct SetupContext<N> {
    pub attrs: Props,
    pub slots: FxHashMap<String, SlotFn<N>>,
    instance: Rc<RefCell<ComponentInstance<N>>>,
}

impl<N: Clone + 'static> SetupContext<N> {
    pub(crate) fn new(instance: Rc<RefCell<ComponentInstance<N>>>) -> Self {
        let (attrs, slots) = {
            let inst = instance.borrow();
            (inst.attrs(), inst.slots.borrow().clone())
        };
        SetupContext { attrs, slots, instance }
    }

    pub fn emit(&self, event: &str, arg: &dyn Any) {
        self.instance.borrow().emit(event, arg);
    }
}

/// A component descriptor: `props`/`setup`/`data`/`render` plus the
/// lifecycle callbacks named in spec §4.5 and §11.
pub struct ComponentDef<N> {
    pub name: &'static str,
    pub props: &'static [PropSpec],
    #[allow(clippy::type_complexity)]
    pub setup: Option<Rc<dyn Fn(&Props, &mut SetupContext<N>) -> SetupOutcome<N>>>,
    pub render: Option<Rc<dyn Fn(&RenderContext<N>) -> VNode<N>>>,
    pub data: Option<Rc<dyn Fn() -> Props>>,
    pub before_create: Option<Rc<dyn Fn()>>,
    pub created: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub before_mount: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub mounted: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub before_update: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub updated: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub before_unmount: Option<Rc<dyn Fn(&RenderContext<N>)>>,
    pub unmounted: Option<Rc<dyn Fn(&RenderContext<N>)>>,
}

impl<N> ComponentDef<N> {
    pub fn new(name: &'static str) -> Self {
        ComponentDef {
            name,
            props: &[],
            setup: None,
            render: None,
            data: None,
            before_create: None,
            created: None,
            before_mount: None,
            mounted: None,
            before_update: None,
            updated: None,
            before_unmount: None,
            unmounted: None,
        }
    }

    /// Sugar for a stateless "function component" (spec §3: `type` may be a
    /// bare function component, not just a descriptor object): a
    /// `ComponentDef` whose `render` is the function and which declares no
    /// state, setup, or lifecycle hooks of its own.
    pub fn from_render(name: &'static str, render: impl Fn(&RenderContext<N>) -> VNode<N> + 'static) -> Self {
        let mut def = Self::new(name);
        def.render = Some(Rc::new(render));
        def
    }

    pub fn with_props(mut self, props: &'static [PropSpec]) -> Self {
        self.props = props;
        self
    }

    #[allow(clippy::type_complexity)]
    pub fn with_setup(
        mut self,
        setup: impl Fn(&Props, &mut SetupContext<N>) -> SetupOutcome<N> + 'static,
    ) -> Self {
        self.setup = Some(Rc::new(setup));
        self
    }

    pub fn with_render(mut self, render: impl Fn(&RenderContext<N>) -> VNode<N> + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    pub fn with_data(mut self, data: impl Fn() -> Props + 'static) -> Self {
        self.data = Some(Rc::new(data));
        self
    }

    pub fn with_before_create(mut self, f: impl Fn() + 'static) -> Self {
        self.before_create = Some(Rc::new(f));
        self
    }

    pub fn with_created(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.created = Some(Rc::new(f));
        self
    }

    pub fn with_before_mount(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.before_mount = Some(Rc::new(f));
        self
    }

    pub fn with_mounted(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.mounted = Some(Rc::new(f));
        self
    }

    pub fn with_before_update(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.before_update = Some(Rc::new(f));
        self
    }

    pub fn with_updated(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.updated = Some(Rc::new(f));
        self
    }

    pub fn with_before_unmount(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.before_unmount = Some(Rc::new(f));
        self
    }

    pub fn with_unmounted(mut self, f: impl Fn(&RenderContext<N>) + 'static) -> Self {
        self.unmounted = Some(Rc::new(f));
        self
    }
}

/// Resolves incoming vnode props against a component's declaration (spec
/// §4.5 step 3): declared names (or names starting with `on`) become
/// `props`, defaulted when absent; everything else becomes `attrs`.
pub fn resolve_props<N>(def: &ComponentDef<N>, incoming: Props) -> (Props, Props) {
    let mut props = Props::default();
    let mut attrs = Props::default();

    for spec in def.props {
        let value = incoming.get(spec.name).cloned().or_else(|| {
            spec.default.map(|f| f())
        });
        if let Some(value) = value {
            props.insert(spec.name.to_string(), value);
        }
    }

    for (name, value) in incoming {
        if def.props.iter().any(|p| p.name == name) {
            continue;
        }
        if is_event_name(&name) {
            props.insert(name, value);
        } else {
            attrs.insert(name, value);
        }
    }

    (props, attrs)
}

/// Per-mount bookkeeping for a component vnode (spec §3).
pub struct ComponentInstance<N> {
    pub def: Rc<ComponentDef<N>>,
    props: Rc<Signal<Props>>,
    attrs: RefCell<Props>,
    state: Option<Rc<Signal<Props>>>,
    setup_state: Rc<Signal<Props>>,
    slots: RefCell<FxHashMap<String, SlotFn<N>>>,
    sub_tree: RefCell<Option<VNode<N>>>,
    is_mounted: Cell<bool>,
    mounted_callbacks: RefCell<Vec<Rc<dyn Fn()>>>,
    effect: RefCell<Option<EffectHandle>>,
    /// Where this component's subtree currently lives. The reactive effect
    /// re-reads this every run (rather than closing over a fixed container/
    /// anchor) because a re-render can be triggered by a plain state write
    /// long after the component's own position in its parent last changed
    /// (spec §4.5 step 8, §5).
    host_container: RefCell<Option<N>>,
    host_anchor: RefCell<Option<N>>,
    /// `setup`'s return value, when callable, overrides `def.render` (spec
    /// §4.5 step 5).
    #[allow(clippy::type_complexity)]
    render_override: RefCell<Option<Rc<dyn Fn(&RenderContext<N>) -> VNode<N>>>>,
}

/// Extracts the slot map a component vnode's children carry. Per the data
/// model (spec §3), a component's `children` is always a slot mapping; any
/// other shape is a caller error and yields no slots.
pub fn slots_from_children<N>(children: &Children<N>) -> FxHashMap<String, SlotFn<N>> {
    match children {
        Children::Slots(slots) => slots.clone(),
        Children::None => FxHashMap::default(),
        _ => {
            log::warn!("component vnode given non-slot children; treating as no slots");
            FxHashMap::default()
        }
    }
}

impl<N: Clone + 'static> ComponentInstance<N> {
    pub fn new(
        def: Rc<ComponentDef<N>>,
        props: Props,
        attrs: Props,
        slots: FxHashMap<String, SlotFn<N>>,
    ) -> Self {
        ComponentInstance {
            def,
            props: Signal::new(props),
            attrs: RefCell::new(attrs),
            state: None,
            setup_state: Signal::new(Props::default()),
            slots: RefCell::new(slots),
            sub_tree: RefCell::new(None),
            is_mounted: Cell::new(false),
            mounted_callbacks: RefCell::new(Vec::new()),
            effect: RefCell::new(None),
            host_container: RefCell::new(None),
            host_anchor: RefCell::new(None),
            render_override: RefCell::new(None),
        }
    }

    pub(crate) fn override_render(&self, render: Rc<dyn Fn(&RenderContext<N>) -> VNode<N>>) {
        *self.render_override.borrow_mut() = Some(render);
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn current_render(&self) -> Option<Rc<dyn Fn(&RenderContext<N>) -> VNode<N>>> {
        self.render_override.borrow().clone().or_else(|| self.def.render.clone())
    }

    pub(crate) fn set_setup_state(&self, state: Props) {
        self.setup_state.set(state);
    }

    pub(crate) fn set_host_position(&self, container: N, anchor: Option<N>) {
        *self.host_container.borrow_mut() = Some(container);
        *self.host_anchor.borrow_mut() = anchor;
    }

    pub(crate) fn host_position(&self) -> (N, Option<N>) {
        (
            self.host_container
                .borrow()
                .clone()
                .expect("host position read before first mount"),
            self.host_anchor.borrow().clone(),
        )
    }

    pub fn is_mounted(&self) -> bool {
        self.is_mounted.get()
    }

    pub(crate) fn set_mounted(&self) {
        self.is_mounted.set(true);
    }

    pub fn sub_tree(&self) -> Option<std::cell::Ref<'_, VNode<N>>> {
        let borrow = self.sub_tree.borrow();
        if borrow.is_some() {
            Some(std::cell::Ref::map(borrow, |o| o.as_ref().unwrap()))
        } else {
            None
        }
    }

    pub(crate) fn take_sub_tree(&self) -> Option<VNode<N>> {
        self.sub_tree.borrow_mut().take()
    }

    pub(crate) fn set_sub_tree(&self, tree: VNode<N>) {
        *self.sub_tree.borrow_mut() = Some(tree);
    }

    pub(crate) fn set_state(&mut self, state: Rc<Signal<Props>>) {
        self.state = Some(state);
    }

    pub(crate) fn set_effect(&self, effect: EffectHandle) {
        *self.effect.borrow_mut() = Some(effect);
    }

    pub(crate) fn stop_effect(&self) {
        if let Some(effect) = self.effect.borrow_mut().take() {
            effect.stop();
        }
    }

    pub(crate) fn queue_mounted_callback(&self, cb: Rc<dyn Fn()>) {
        self.mounted_callbacks.borrow_mut().push(cb);
    }

    pub(crate) fn drain_mounted_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.mounted_callbacks.borrow_mut());
        for cb in callbacks {
            cb();
        }
    }

    pub fn props_signal(&self) -> &Rc<Signal<Props>> {
        &self.props
    }

    /// Applies a prop-change patch (spec §4.5 `patchComponent` step 2):
    /// assigns every new prop, removing any key absent from the new set.
    pub fn apply_props_patch(&self, new_props: Props, new_attrs: Props) {
        self.props.update(|props| {
            props.retain(|k, _| new_props.contains_key(k));
            for (k, v) in new_props {
                props.insert(k, v);
            }
        });
        *self.attrs.borrow_mut() = new_attrs;
    }

    pub fn attrs(&self) -> Props {
        self.attrs.borrow().clone()
    }

    pub(crate) fn set_slots(&self, slots: FxHashMap<String, SlotFn<N>>) {
        *self.slots.borrow_mut() = slots;
    }

    /// `emit(event, ...args)` (spec §3): looks up `on<Event>` (PascalCase)
    /// in the current props and invokes it.
    pub fn emit(&self, event: &str, arg: &dyn Any) {
        let handler_name = pascal_case_event(event);
        let handler = self.props.with(|props| match props.get(&handler_name) {
            Some(PropValue::Handler(f)) => Some(f.clone()),
            _ => None,
        });
        match handler {
            Some(f) => f(arg),
            None => log::debug!("emit(\"{event}\"): no `{handler_name}` handler bound"),
        }
    }
}

fn pascal_case_event(event: &str) -> String {
    let mut out = String::with_capacity(event.len() + 2);
    out.push_str("on");
    let mut chars = event.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    out.extend(chars);
    out
}

/// The proxy passed as the render function's argument (spec §4.5 step 7):
/// reads resolve across `{state, props, setupState, $slots}` in order;
/// writes target `{state, props (refused), setupState}` in order.
pub struct RenderContext<N> {
    instance: Rc<RefCell<ComponentInstance<N>>>,
}

impl<N: Clone + 'static> RenderContext<N> {
    pub fn new(instance: Rc<RefCell<ComponentInstance<N>>>) -> Self {
        RenderContext { instance }
    }

    pub fn instance(&self) -> &Rc<RefCell<ComponentInstance<N>>> {
        &self.instance
    }

    /// Reads `key`, checking `state`, then `props`, then `setupState`.
    pub fn get(&self, key: &str) -> Option<PropValue> {
        let inst = self.instance.borrow();
        if let Some(state) = &inst.state {
            if let Some(v) = state.with(|m| m.get(key).cloned()) {
                return Some(v);
            }
        }
        if let Some(v) = inst.props.with(|m| m.get(key).cloned()) {
            return Some(v);
        }
        inst.setup_state.with(|m| m.get(key).cloned())
    }

    /// The exact-key `$slots` accessor (spec §9 open question: the source's
    /// typo'd `k === '$slots'` check is implemented here as the intended
    /// dedicated lookup rather than folded into [`Self::get`], since a slot
    /// thunk isn't a [`PropValue`]).
    pub fn slot(&self, name: &str) -> Option<SlotFn<N>> {
        self.instance.borrow().slots.borrow().get(name).cloned()
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.instance.borrow().slots.borrow().contains_key(name)
    }

    /// Writes `key`, refusing (with a diagnostic, spec §7) writes to props
    /// or to names absent from every container.
    pub fn set(&self, key: &str, value: PropValue) {
        let inst = self.instance.borrow();
        if let Some(state) = &inst.state {
            let exists = state.with(|m| m.contains_key(key));
            if exists {
                state.update(|m| {
                    m.insert(key.to_string(), value);
                });
                return;
            }
        }
        let is_prop = inst.props.with(|m| m.contains_key(key));
        if is_prop {
            log::warn!("write to prop `{key}` refused; props are owned by the parent");
            return;
        }
        if inst.setup_state.with(|m| m.contains_key(key)) {
            inst.setup_state.update(|m| {
                m.insert(key.to_string(), value);
            });
            return;
        }
        log::warn!("write to unknown render context key `{key}` refused");
    }

    pub fn emit(&self, event: &str, arg: &dyn Any) {
        self.instance.borrow().emit(event, arg);
    }
}

impl<N> Clone for RenderContext<N> {
    fn clone(&self) -> Self {
        RenderContext { instance: self.instance.clone() }
    }
}

thread_local! {
    static MOUNTED_QUEUE_STACK: RefCell<Vec<Rc<RefCell<Vec<Rc<dyn Fn()>>>>>> = RefCell::new(Vec::new());
}

/// Registers `cb` to run once, after the currently-being-set-up component's
/// subtree is inserted into the host (spec §4.5 step 8, §6). A no-op (with
/// a diagnostic) when called outside of a component's `setup()` (spec §7).
pub fn on_mounted(cb: impl Fn() + 'static) {
    let registered = MOUNTED_QUEUE_STACK.with(|stack| {
        if let Some(queue) = stack.borrow().last() {
            queue.borrow_mut().push(Rc::new(cb));
            true
        } else {
            false
        }
    });
    if !registered {
        log::warn!("on_mounted called outside of a component's setup(); callback discarded");
    }
}

/// Enters the ambient "current instance" scope for the duration of a single
/// `setup()` call (spec §5, §9: "a single-slot global register... safe
/// under the single-threaded model"). Never observable outside
/// `mount_component`.
pub(crate) struct SetupScope;

impl SetupScope {
    pub(crate) fn enter() -> Self {
        MOUNTED_QUEUE_STACK.with(|stack| stack.borrow_mut().push(Rc::new(RefCell::new(Vec::new()))));
        SetupScope
    }

    pub(crate) fn take_callbacks(&self) -> Vec<Rc<dyn Fn()>> {
        MOUNTED_QUEUE_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|queue| queue.borrow().clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for SetupScope {
    fn drop(&mut self) {
        MOUNTED_QUEUE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
