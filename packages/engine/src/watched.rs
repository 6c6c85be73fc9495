use crate::host::{Editing, Host, MutationScope};
use element_adapter_query::utils::dedup;
use element_adapter_query::Property;
use serde::Serialize;

/// Deduplicated set of properties one engine tracks. Nothing outside this
/// set is ever measured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WatchedProperties {
    properties: Vec<Property>,
}

impl WatchedProperties {
    pub fn new(properties: impl IntoIterator<Item = Property>) -> Self {
        Self {
            properties: dedup(properties),
        }
    }

    pub fn contains(&self, property: Property) -> bool {
        self.properties.contains(&property)
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        self.properties.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Any of width, height, orientation or aspect ratio
    pub fn dimensions(&self) -> bool {
        self.properties.iter().any(Property::depends_on_box)
    }

    pub fn characters(&self) -> bool {
        self.contains(Property::Characters)
    }

    pub fn children(&self) -> bool {
        self.contains(Property::Children)
    }

    /// Properties written to the `--ea-*` mirror. Measuring the box yields
    /// all four box properties, so watching any of them mirrors all four.
    pub fn mirrored(&self) -> impl Iterator<Item = Property> + '_ {
        let dimensions = self.dimensions();
        Property::ALL.into_iter().filter(move |property| {
            self.contains(*property) || (dimensions && property.depends_on_box())
        })
    }

    /// Characters of a content-editable element come from its subtree
    pub fn editable_characters(&self, editing: Editing) -> bool {
        self.characters() && editing == Editing::ContentEditable
    }

    /// How an element with the given editing mode is mutation-observed, if
    /// at all. Text inputs never are.
    pub fn mutation_scope(&self, editing: Editing) -> Option<MutationScope> {
        if editing == Editing::TextInput {
            return None;
        }

        if self.editable_characters(editing) {
            Some(MutationScope::subtree_text())
        } else if self.children() {
            Some(MutationScope::child_list())
        } else {
            None
        }
    }
}

/// Change sources an engine wires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Listeners {
    pub dimensions: bool,
    pub input: bool,
    pub mutations: bool,
}

impl Listeners {
    /// Only the sources the watched set and the elements actually need
    pub fn required<H: Host>(host: &H, elements: &[H::Node], watched: &WatchedProperties) -> Self {
        let any_editing = |mode: Editing| elements.iter().any(|node| host.editing(node) == mode);

        Self {
            dimensions: watched.dimensions(),
            input: watched.characters() && any_editing(Editing::TextInput),
            mutations: (watched.children()
                && elements
                    .iter()
                    .any(|node| host.editing(node) != Editing::TextInput))
                || (watched.characters() && any_editing(Editing::ContentEditable)),
        }
    }
}
