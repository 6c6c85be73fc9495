use crate::snapshot::Snapshot;
use std::fmt;

/// Invoked with the element and its snapshot when a query starts matching
pub type Callback<N> = Box<dyn FnMut(&N, &Snapshot)>;

/// What a query drives on each element
pub enum Behavior<N> {
    /// Class present exactly while the query matches
    Label(String),
    /// Called on every false → true transition of the query, never while it
    /// keeps matching and never when it stops
    Callback(Callback<N>),
}

impl<N> Behavior<N> {
    pub fn label(name: impl Into<String>) -> Self {
        Behavior::Label(name.into())
    }

    pub fn callback(callback: impl FnMut(&N, &Snapshot) + 'static) -> Self {
        Behavior::Callback(Box::new(callback))
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Behavior::Label(name) => Some(name),
            Behavior::Callback(_) => None,
        }
    }
}

impl<N> fmt::Debug for Behavior<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Label(name) => f.debug_tuple("Label").field(name).finish(),
            Behavior::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl<N> From<&str> for Behavior<N> {
    fn from(name: &str) -> Self {
        Behavior::label(name)
    }
}

impl<N> From<String> for Behavior<N> {
    fn from(name: String) -> Self {
        Behavior::Label(name)
    }
}
