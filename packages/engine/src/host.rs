//! Boundary between the engine and the visual element tree hosting it.
//!
//! The engine never owns nodes. It only keeps identity handles in side
//! tables that are evicted on detach, so the host alone decides how long an
//! element lives.

use element_adapter_query::Axis;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one engine's registrations on a shared host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Allocates an id unique for the lifetime of the process
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ObserverId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
}

/// How a node accepts text from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Editing {
    /// Text inputs and text areas, whose text lives in a value
    TextInput,
    /// Content-editable elements, whose text is their content
    ContentEditable,
    None,
}

/// What a structural mutation observation reports for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationScope {
    /// Report text changes anywhere under the element, not only its own
    /// child list
    pub subtree_text: bool,
}

impl MutationScope {
    pub fn child_list() -> Self {
        Self {
            subtree_text: false,
        }
    }

    pub fn subtree_text() -> Self {
        Self { subtree_text: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

/// One queued structural change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord<N> {
    pub kind: MutationKind,
    pub target: N,
}

impl<N> MutationRecord<N> {
    pub fn new(kind: MutationKind, target: N) -> Self {
        Self { kind, target }
    }
}

/// New content box size of an observed element
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEntry<N> {
    pub target: N,
    pub content_box: Size,
}

impl<N> ResizeEntry<N> {
    pub fn new(target: N, content_box: Size) -> Self {
        Self {
            target,
            content_box,
        }
    }
}

/// The element tree, its style surface and its change sources
pub trait Host {
    /// Identity handle of a node
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// Whether `node` still belongs to this host
    fn contains(&self, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn kind(&self, node: &Self::Node) -> NodeKind;
    fn editing(&self, node: &Self::Node) -> Editing;
    fn child_element_count(&self, node: &Self::Node) -> usize;
    /// Value of a text input, text content of anything else
    fn text_value(&self, node: &Self::Node) -> String;
    /// Client box minus padding
    fn content_box(&self, node: &Self::Node) -> Size;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn toggle_class(&mut self, node: &Self::Node, class: &str, present: bool);
    fn set_custom_property(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_custom_property(&mut self, node: &Self::Node, name: &str);

    /// Appends an absolutely positioned, zero-footprint probe to `parent`
    fn append_probe(&mut self, parent: &Self::Node) -> Self::Node;
    /// Sets the probe's size along `axis` to a CSS length such as `1em`
    fn set_probe_length(&mut self, probe: &Self::Node, axis: Axis, length: &str);
    fn probe_size(&self, probe: &Self::Node) -> Size;
    fn remove_probe(&mut self, parent: &Self::Node, probe: &Self::Node);

    fn observe_resize(&mut self, observer: ObserverId, node: &Self::Node);
    fn unobserve_resize(&mut self, observer: ObserverId, node: &Self::Node);
    fn add_input_listener(&mut self, observer: ObserverId, node: &Self::Node);
    fn remove_input_listener(&mut self, observer: ObserverId, node: &Self::Node);
    fn observe_mutations(&mut self, observer: ObserverId, node: &Self::Node, scope: MutationScope);
    /// Stops every mutation observation of `observer` and drops its queued records
    fn disconnect_mutations(&mut self, observer: ObserverId);
}
