//! The reactive primitives the reconciler consumes as an opaque capability
//! (spec §6, §9: "the core should depend on an interface... rather than on a
//! specific library"). The component runtime only ever calls [`effect`] and
//! reads/writes [`Signal`] cells; nothing in `patch`, `children`, or
//! `unmount` depends on how dependency tracking is implemented.
//!
//! This module ships the one concrete engine the crate needs to actually
//! run: a minimal single-threaded tracking reactive system, in the same
//! spirit as Vue's `ref`/`reactive`/`effect` triad referenced by the spec.
//! A host could swap this module out wholesale for a different engine
//! without touching the reconciler proper.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Runs a pending effect re-run. Intercepting this lets a renderer batch
/// reruns into a single flush per tick instead of running them inline
/// (spec §5: "effect invocations are coalesced... one flush per tick").
pub type Scheduler = Rc<dyn Fn(EffectHandle)>;

struct EffectState {
    run: RefCell<Box<dyn FnMut()>>,
    scheduler: Option<Scheduler>,
    active: Cell<bool>,
}

thread_local! {
    static ACTIVE_EFFECT_STACK: RefCell<Vec<Rc<EffectState>>> = RefCell::new(Vec::new());
}

/// A handle to a running [`effect`]. Cloning shares the same underlying
/// effect; dropping all clones does not stop it - call [`EffectHandle::stop`]
/// explicitly (the component runtime does this on unmount, spec §11).
#[derive(Clone)]
pub struct EffectHandle(Rc<EffectState>);

impl EffectHandle {
    /// Re-runs the effect body immediately, tracking whatever reactive
    /// reads it performs this time around.
    pub fn run(&self) {
        if !self.0.active.get() {
            return;
        }
        ACTIVE_EFFECT_STACK.with(|stack| stack.borrow_mut().push(self.0.clone()));
        // catch_unwind is deliberately not used here: a panic inside a
        // component's render/setup must propagate to the caller (spec §7).
        (self.0.run.borrow_mut())();
        ACTIVE_EFFECT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }

    /// Stops the effect: it will never automatically re-run again, even if
    /// a tracked signal it previously read is written to.
    pub fn stop(&self) {
        self.0.active.set(false);
    }
}

/// Registers `run` as a reactive effect: it executes once immediately,
/// tracking any [`Signal::get`] calls performed along the way, and
/// re-executes whenever one of those signals is written.
///
/// When `scheduler` is provided, reruns are routed through it instead of
/// happening inline - this is how a renderer batches component re-renders
/// (spec §5).
pub fn effect(run: impl FnMut() + 'static, scheduler: Option<Scheduler>) -> EffectHandle {
    let state = Rc::new(EffectState {
        run: RefCell::new(Box::new(run)),
        scheduler,
        active: Cell::new(true),
    });
    let handle = EffectHandle(state);
    handle.run();
    handle
}

/// A reactive memory cell. Reading it inside a running [`effect`] subscribes
/// that effect to future writes; writing it reruns (or schedules a rerun of)
/// every subscriber still alive.
///
/// This is the concrete stand-in for the spec's `ref`/`reactive`/
/// `shallowReactive` family - the component runtime uses it for `props`,
/// `state`, and `setupState` (spec §3, §4.5).
pub struct Signal<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Weak<EffectState>>>,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Rc<Self> {
        Rc::new(Signal {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    fn track(&self) {
        ACTIVE_EFFECT_STACK.with(|stack| {
            if let Some(active) = stack.borrow().last() {
                let weak = Rc::downgrade(active);
                let mut subs = self.subscribers.borrow_mut();
                if !subs.iter().any(|w| w.ptr_eq(&weak)) {
                    subs.push(weak);
                }
            }
        });
    }

    fn trigger(&self) {
        let subs = self.subscribers.borrow().clone();
        for weak in subs {
            if let Some(state) = weak.upgrade() {
                if !state.active.get() {
                    continue;
                }
                let handle = EffectHandle(state.clone());
                match &state.scheduler {
                    Some(scheduler) => scheduler(handle),
                    None => handle.run(),
                }
            }
        }
    }

    /// Reads the current value, tracking the read if an effect is running.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.value.borrow().clone()
    }

    /// Runs `f` against a borrow of the value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.value.borrow())
    }

    /// Overwrites the value and notifies subscribers.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.trigger();
    }

    /// Mutates the value in place via `f` and notifies subscribers
    /// unconditionally (this is "shallow" reactivity: the core does not
    /// attempt to detect no-op mutations, matching `shallowReactive`).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn effect_reruns_on_write() {
        let sig = Signal::new(1);
        let log = Rc::new(StdRefCell::new(Vec::new()));
        let sig2 = sig.clone();
        let log2 = log.clone();
        let _handle = effect(
            move || {
                log2.borrow_mut().push(sig2.get());
            },
            None,
        );
        assert_eq!(*log.borrow(), vec![1]);
        sig.set(2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn stopped_effect_does_not_rerun() {
        let sig = Signal::new(1);
        let log = Rc::new(StdRefCell::new(Vec::new()));
        let sig2 = sig.clone();
        let log2 = log.clone();
        let handle = effect(
            move || {
                log2.borrow_mut().push(sig2.get());
            },
            None,
        );
        handle.stop();
        sig.set(2);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn scheduler_intercepts_reruns() {
        let sig = Signal::new(1);
        let pending: Rc<StdRefCell<Vec<EffectHandle>>> = Rc::new(StdRefCell::new(Vec::new()));
        let pending2 = pending.clone();
        let scheduler: Scheduler = Rc::new(move |h| pending2.borrow_mut().push(h));
        let runs = Rc::new(Cell::new(0));
        let runs2 = runs.clone();
        let sig2 = sig.clone();
        let _handle = effect(
            move || {
                sig2.get();
                runs2.set(runs2.get() + 1);
            },
            Some(scheduler),
        );
        assert_eq!(runs.get(), 1);
        sig.set(2);
        // scheduler intercepted the rerun instead of running inline
        assert_eq!(runs.get(), 1);
        assert_eq!(pending.borrow().len(), 1);
        pending.borrow()[0].run();
        assert_eq!(runs.get(), 2);
    }
}
