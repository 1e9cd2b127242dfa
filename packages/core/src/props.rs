//! Prop/attribute values (spec §3: "Names beginning with `on` denote event
//! handlers; all others are host attributes or component inputs").

use fxhash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A value carried as a prop, host attribute, or event handler.
#[derive(Clone)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Number(f64),
    /// An `on*` event handler. Compared by pointer identity - two handler
    /// closures are never considered equal even if they'd behave
    /// identically, matching how the teacher's listener diff always treats
    /// listeners as needing an explicit same-identity check rather than a
    /// deep behavioral one.
    Handler(Rc<dyn Fn(&dyn Any)>),
    /// An opaque value passed straight through to the adapter (e.g. a
    /// renderer-specific style object); compared by pointer identity.
    Any(Rc<dyn Any>),
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "Str({s:?})"),
            PropValue::Bool(b) => write!(f, "Bool({b:?})"),
            PropValue::Number(n) => write!(f, "Number({n:?})"),
            PropValue::Handler(_) => write!(f, "Handler(..)"),
            PropValue::Any(_) => write!(f, "Any(..)"),
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            (PropValue::Any(a), PropValue::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

/// Returns whether a prop name denotes an event handler (spec §3).
pub fn is_event_name(name: &str) -> bool {
    name.starts_with("on")
        && name
            .as_bytes()
            .get(2)
            .map(|b| b.is_ascii_uppercase())
            .unwrap_or(false)
}

/// An ordered mapping from prop/attribute name to value.
pub type Props = FxHashMap<String, PropValue>;

/// Compares two prop maps the way `hasPropsChanged` does (spec §4.5): true
/// if the key sets differ in size, or if any key's value differs.
pub fn has_props_changed(old: &Props, new: &Props) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|(k, v)| old.get(k) != Some(v))
}
