//! A complete host backed by an in-memory element tree.
//!
//! Layout is not computed: content boxes are set explicitly. Units resolve
//! from per-element font sizes, the viewport and the parent's content box.
//! Change notifications are queued per observer and delivered with
//! [`MemoryHost::dispatch`] and [`MemoryHost::frame`].

use crate::adapter::Adapter;
use crate::host::{
    Editing, Host, MutationKind, MutationRecord, MutationScope, NodeKind, ObserverId, ResizeEntry,
    Size,
};
use element_adapter_query::{Axis, EvalResult, LengthUnit};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// `<input>` types that do not take free text
const NON_TEXT_INPUT_TYPES: [&str; 8] = [
    "button", "submit", "image", "checkbox", "radio", "hidden", "range", "reset",
];

const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_VIEWPORT: Size = Size {
    width: 1280.0,
    height: 720.0,
};
const PX_PER_CM: f64 = 96.0 / 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: String,
    input_type: Option<String>,
    /// `None` inherits from the parent
    content_editable: Option<bool>,
    /// Input value, or the text of a text node
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content_box: Size,
    /// `None` inherits from the parent
    font_size: Option<f64>,
    classes: Vec<String>,
    custom_properties: BTreeMap<String, String>,
    connected: bool,
}

impl NodeData {
    fn new(kind: NodeKind, tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            tag: tag.to_lowercase(),
            input_type: None,
            content_editable: None,
            text: String::new(),
            parent,
            children: Vec::new(),
            content_box: Size::default(),
            font_size: None,
            classes: Vec::new(),
            custom_properties: BTreeMap::new(),
            connected: true,
        }
    }
}

#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    root: NodeId,
    viewport: Size,
    root_font_size: f64,
    resize_observers: HashMap<ObserverId, HashSet<NodeId>>,
    input_listeners: HashMap<ObserverId, HashSet<NodeId>>,
    mutation_observers: HashMap<ObserverId, HashMap<NodeId, MutationScope>>,
    resize_queue: HashMap<ObserverId, Vec<ResizeEntry<NodeId>>>,
    input_queue: HashMap<ObserverId, Vec<NodeId>>,
    mutation_queue: HashMap<ObserverId, Vec<MutationRecord<NodeId>>>,
    probe_count: usize,
    /// Slots of removed probes, reused by the next probe
    retired_probes: Vec<NodeId>,
    class_toggles: HashMap<(NodeId, String), usize>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// An empty document whose root (`body`) spans the default viewport
    pub fn new() -> Self {
        let mut body = NodeData::new(NodeKind::Element, "body", None);
        body.content_box = DEFAULT_VIEWPORT;
        body.font_size = Some(DEFAULT_FONT_SIZE);

        Self {
            nodes: vec![body],
            root: NodeId(0),
            viewport: DEFAULT_VIEWPORT,
            root_font_size: DEFAULT_FONT_SIZE,
            resize_observers: HashMap::new(),
            input_listeners: HashMap::new(),
            mutation_observers: HashMap::new(),
            resize_queue: HashMap::new(),
            input_queue: HashMap::new(),
            mutation_queue: HashMap::new(),
            probe_count: 0,
            retired_probes: Vec::new(),
            class_toggles: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        self.link(parent, id);
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(data) = self.node_mut(parent) {
            data.children.push(child);
        }
        self.record_mutation(MutationKind::ChildList, parent);
    }

    // Tree building and mutation

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(parent, NodeData::new(NodeKind::Element, tag, Some(parent)))
    }

    pub fn append_input(&mut self, parent: NodeId, input_type: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element, "input", Some(parent));
        data.input_type = Some(input_type.to_lowercase());
        self.push(parent, data)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text, "#text", Some(parent));
        data.text = text.to_string();
        self.push(parent, data)
    }

    /// Detaches `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|data| data.parent) else {
            return;
        };

        self.record_mutation(MutationKind::ChildList, parent);

        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|child| *child != node);
        }

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.node_mut(current) {
                data.connected = false;
                stack.extend(data.children.iter().copied());
            }
        }
        if let Some(data) = self.node_mut(node) {
            data.parent = None;
        }
    }

    /// Replaces the data of a text node
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(data) = self.node_mut(node) {
            data.text = text.to_string();
        }
        self.record_mutation(MutationKind::CharacterData, node);
    }

    /// Sets an input's value the way typing does, notifying input listeners
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(data) = self.node_mut(node) {
            data.text = value.to_string();
        }
        for (observer, nodes) in &self.input_listeners {
            if nodes.contains(&node) {
                self.input_queue.entry(*observer).or_default().push(node);
            }
        }
    }

    pub fn set_input_type(&mut self, node: NodeId, input_type: &str) {
        if let Some(data) = self.node_mut(node) {
            data.input_type = Some(input_type.to_lowercase());
        }
    }

    pub fn set_content_editable(&mut self, node: NodeId, editable: bool) {
        if let Some(data) = self.node_mut(node) {
            data.content_editable = Some(editable);
        }
    }

    pub fn set_font_size(&mut self, node: NodeId, font_size: f64) {
        if node == self.root {
            self.root_font_size = font_size;
        }
        if let Some(data) = self.node_mut(node) {
            data.font_size = Some(font_size);
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    /// Lays `node` out at a new content box, notifying resize observers when
    /// the size changed
    pub fn set_content_box(&mut self, node: NodeId, width: f64, height: f64) {
        let size = Size::new(width, height);
        let Some(data) = self.node_mut(node) else {
            return;
        };
        if data.content_box == size {
            return;
        }
        data.content_box = size;

        for (observer, nodes) in &self.resize_observers {
            if nodes.contains(&node) {
                self.resize_queue
                    .entry(*observer)
                    .or_default()
                    .push(ResizeEntry::new(node, size));
            }
        }
    }

    // Inspection

    pub fn class_names(&self, node: NodeId) -> Vec<String> {
        self.node(node)
            .map(|data| data.classes.clone())
            .unwrap_or_default()
    }

    pub fn custom_property(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .custom_properties
            .get(name)
            .map(String::as_str)
    }

    pub fn custom_properties(&self, node: NodeId) -> Vec<(String, String)> {
        self.node(node)
            .map(|data| {
                data.custom_properties
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many times `class` was added to or removed from `node`
    pub fn class_toggles(&self, node: NodeId, class: &str) -> usize {
        self.class_toggles
            .get(&(node, class.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Nodes ever allocated, connected or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Probes appended since the host was created
    pub fn probe_count(&self) -> usize {
        self.probe_count
    }

    pub fn is_resize_observed(&self, observer: ObserverId, node: NodeId) -> bool {
        self.resize_observers
            .get(&observer)
            .is_some_and(|nodes| nodes.contains(&node))
    }

    pub fn has_input_listener(&self, observer: ObserverId, node: NodeId) -> bool {
        self.input_listeners
            .get(&observer)
            .is_some_and(|nodes| nodes.contains(&node))
    }

    pub fn mutation_scope(&self, observer: ObserverId, node: NodeId) -> Option<MutationScope> {
        self.mutation_observers.get(&observer)?.get(&node).copied()
    }

    pub fn queued_mutations(&self, observer: ObserverId) -> usize {
        self.mutation_queue.get(&observer).map_or(0, Vec::len)
    }

    // Notification delivery

    pub fn take_resize_entries(&mut self, observer: ObserverId) -> Vec<ResizeEntry<NodeId>> {
        self.resize_queue.remove(&observer).unwrap_or_default()
    }

    pub fn take_input_events(&mut self, observer: ObserverId) -> Vec<NodeId> {
        self.input_queue.remove(&observer).unwrap_or_default()
    }

    pub fn take_mutation_records(&mut self, observer: ObserverId) -> Vec<MutationRecord<NodeId>> {
        self.mutation_queue.remove(&observer).unwrap_or_default()
    }

    /// Delivers the adapter's queued mutations, then its input events, then
    /// its resize entries. Resizes only become visible at the next frame.
    pub fn dispatch(&mut self, adapter: &mut Adapter<NodeId>) -> EvalResult<()> {
        let observer = adapter.id();

        let records = self.take_mutation_records(observer);
        if !records.is_empty() {
            adapter.on_mutations(self, &records)?;
        }

        for node in self.take_input_events(observer) {
            adapter.on_input(self, &node)?;
        }

        let entries = self.take_resize_entries(observer);
        if !entries.is_empty() {
            adapter.on_resize(&*self, &entries);
        }

        Ok(())
    }

    /// Next paint opportunity
    pub fn frame(&mut self, adapter: &mut Adapter<NodeId>) -> EvalResult<()> {
        adapter.on_frame(self)
    }

    /// Dispatches everything queued, then runs a frame
    pub fn run(&mut self, adapter: &mut Adapter<NodeId>) -> EvalResult<()> {
        self.dispatch(adapter)?;
        self.frame(adapter)
    }

    // Internals

    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.node(candidate).and_then(|data| data.parent);
        }
        false
    }

    /// Queues one record for each observer watching `target`
    fn record_mutation(&mut self, kind: MutationKind, target: NodeId) {
        let mut observers = Vec::new();

        for (observer, scopes) in &self.mutation_observers {
            let observed = scopes.iter().any(|(node, scope)| match kind {
                MutationKind::ChildList => {
                    *node == target || (scope.subtree_text && self.is_descendant(target, *node))
                }
                MutationKind::CharacterData => {
                    scope.subtree_text && self.is_descendant(target, *node)
                }
                MutationKind::Attributes => false,
            });
            if observed {
                observers.push(*observer);
            }
        }

        for observer in observers {
            self.mutation_queue
                .entry(observer)
                .or_default()
                .push(MutationRecord::new(kind, target));
        }
    }

    fn is_content_editable(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            let Some(data) = self.node(candidate) else {
                return false;
            };
            if let Some(editable) = data.content_editable {
                return editable;
            }
            current = data.parent;
        }
        false
    }

    fn font_size(&self, node: NodeId) -> f64 {
        let mut current = Some(node);
        while let Some(candidate) = current {
            let Some(data) = self.node(candidate) else {
                break;
            };
            if let Some(font_size) = data.font_size {
                return font_size;
            }
            current = data.parent;
        }
        self.root_font_size
    }

    /// Pixels of one `unit` inside `context`
    fn unit_px(&self, context: NodeId, unit: LengthUnit) -> f64 {
        let em = self.font_size(context);
        let rem = self.root_font_size;
        let Size { width, height } = self.viewport;

        match unit {
            LengthUnit::Em | LengthUnit::Ic => em,
            LengthUnit::Ch | LengthUnit::Ex => em * 0.5,
            LengthUnit::Cap => em * 0.7,
            LengthUnit::Lh => em * 1.2,
            LengthUnit::Rem => rem,
            LengthUnit::Rlh => rem * 1.2,
            LengthUnit::Vw | LengthUnit::Vi => width / 100.0,
            LengthUnit::Vh | LengthUnit::Vb => height / 100.0,
            LengthUnit::Vmin => width.min(height) / 100.0,
            LengthUnit::Vmax => width.max(height) / 100.0,
            LengthUnit::Cm => PX_PER_CM,
            LengthUnit::Mm => PX_PER_CM / 10.0,
            LengthUnit::Q => PX_PER_CM / 40.0,
            LengthUnit::In => 96.0,
            LengthUnit::Pt => 96.0 / 72.0,
            LengthUnit::Pc => 16.0,
        }
    }

    /// Resolves a CSS length such as `1em` or `1%` inside `context`
    fn resolve_length(&self, context: NodeId, axis: Axis, length: &str) -> f64 {
        let split = length
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(length.len());
        let (magnitude, unit) = length.split_at(split);

        let Ok(magnitude) = magnitude.parse::<f64>() else {
            warn!(length, "Unparseable probe length");
            return 0.0;
        };

        let px = match unit {
            "" | "px" => 1.0,
            "%" => {
                let content_box = self.node(context).map(|data| data.content_box).unwrap_or_default();
                content_box.along(axis) / 100.0
            }
            unit => match unit.parse::<LengthUnit>() {
                Ok(unit) => self.unit_px(context, unit),
                Err(_) => {
                    warn!(length, "Unknown probe unit");
                    return 0.0;
                }
            },
        };

        magnitude * px
    }
}

impl Host for MemoryHost {
    type Node = NodeId;

    fn contains(&self, node: &NodeId) -> bool {
        self.node(*node).is_some_and(|data| data.connected)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node)?.parent
    }

    fn kind(&self, node: &NodeId) -> NodeKind {
        self.node(*node).map_or(NodeKind::Text, |data| data.kind)
    }

    fn editing(&self, node: &NodeId) -> Editing {
        let Some(data) = self.node(*node) else {
            return Editing::None;
        };
        if data.kind != NodeKind::Element {
            return Editing::None;
        }

        let text_input = match data.tag.as_str() {
            "textarea" => true,
            "input" => data
                .input_type
                .as_deref()
                .map_or(true, |input_type| !NON_TEXT_INPUT_TYPES.contains(&input_type)),
            _ => false,
        };

        if text_input {
            Editing::TextInput
        } else if self.is_content_editable(*node) {
            Editing::ContentEditable
        } else {
            Editing::None
        }
    }

    fn child_element_count(&self, node: &NodeId) -> usize {
        self.node(*node).map_or(0, |data| {
            data.children
                .iter()
                .filter(|child| self.kind(child) == NodeKind::Element)
                .count()
        })
    }

    fn text_value(&self, node: &NodeId) -> String {
        let Some(data) = self.node(*node) else {
            return String::new();
        };
        if data.kind == NodeKind::Text || self.editing(node) == Editing::TextInput {
            return data.text.clone();
        }
        data.children
            .iter()
            .map(|child| self.text_value(child))
            .collect()
    }

    fn content_box(&self, node: &NodeId) -> Size {
        self.node(*node).map(|data| data.content_box).unwrap_or_default()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.node(*node)
            .is_some_and(|data| data.classes.iter().any(|name| name == class))
    }

    fn toggle_class(&mut self, node: &NodeId, class: &str, present: bool) {
        let Some(data) = self.node_mut(*node) else {
            return;
        };
        let has = data.classes.iter().any(|name| name == class);
        if has == present {
            return;
        }
        if present {
            data.classes.push(class.to_string());
        } else {
            data.classes.retain(|name| name != class);
        }
        *self
            .class_toggles
            .entry((*node, class.to_string()))
            .or_insert(0) += 1;
    }

    fn set_custom_property(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(data) = self.node_mut(*node) {
            data.custom_properties
                .insert(name.to_string(), value.to_string());
        }
    }

    fn remove_custom_property(&mut self, node: &NodeId, name: &str) {
        if let Some(data) = self.node_mut(*node) {
            data.custom_properties.remove(name);
        }
    }

    fn append_probe(&mut self, parent: &NodeId) -> NodeId {
        self.probe_count += 1;
        let data = NodeData::new(NodeKind::Element, "div", Some(*parent));

        let Some(probe) = self.retired_probes.pop() else {
            return self.push(*parent, data);
        };
        if let Some(slot) = self.node_mut(probe) {
            *slot = data;
        }
        self.link(*parent, probe);
        probe
    }

    fn set_probe_length(&mut self, probe: &NodeId, axis: Axis, length: &str) {
        let context = self.parent(probe).unwrap_or(self.root);
        let px = self.resolve_length(context, axis, length);
        if let Some(data) = self.node_mut(*probe) {
            data.content_box = match axis {
                Axis::Width => Size::new(px, 0.0),
                Axis::Height => Size::new(0.0, px),
            };
        }
    }

    fn probe_size(&self, probe: &NodeId) -> Size {
        self.content_box(probe)
    }

    fn remove_probe(&mut self, _parent: &NodeId, probe: &NodeId) {
        if !self.contains(probe) {
            return;
        }
        self.remove(*probe);
        self.retired_probes.push(*probe);
    }

    fn observe_resize(&mut self, observer: ObserverId, node: &NodeId) {
        let inserted = self
            .resize_observers
            .entry(observer)
            .or_default()
            .insert(*node);
        if inserted {
            let entry = ResizeEntry::new(*node, self.content_box(node));
            self.resize_queue.entry(observer).or_default().push(entry);
        }
    }

    fn unobserve_resize(&mut self, observer: ObserverId, node: &NodeId) {
        if let Some(nodes) = self.resize_observers.get_mut(&observer) {
            nodes.remove(node);
        }
        if let Some(entries) = self.resize_queue.get_mut(&observer) {
            entries.retain(|entry| entry.target != *node);
        }
    }

    fn add_input_listener(&mut self, observer: ObserverId, node: &NodeId) {
        self.input_listeners
            .entry(observer)
            .or_default()
            .insert(*node);
    }

    fn remove_input_listener(&mut self, observer: ObserverId, node: &NodeId) {
        if let Some(nodes) = self.input_listeners.get_mut(&observer) {
            nodes.remove(node);
        }
        if let Some(events) = self.input_queue.get_mut(&observer) {
            events.retain(|event| event != node);
        }
    }

    fn observe_mutations(&mut self, observer: ObserverId, node: &NodeId, scope: MutationScope) {
        self.mutation_observers
            .entry(observer)
            .or_default()
            .insert(*node, scope);
    }

    fn disconnect_mutations(&mut self, observer: ObserverId) {
        self.mutation_observers.remove(&observer);
        self.mutation_queue.remove(&observer);
    }
}
