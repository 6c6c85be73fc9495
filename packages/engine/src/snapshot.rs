use element_adapter_query::{
    compute_orientation, compute_ratio, format_number, Orientation, Property, Value,
};
use serde::Serialize;

/// Last known value of each watched property of one element.
///
/// Properties that were never measured stay `None`; merging only replaces
/// the properties present in the update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width, height and the properties derived from them
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            aspect_ratio: Some(compute_ratio(width, height)),
            orientation: Some(compute_orientation(width, height)),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: usize) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_characters(mut self, characters: usize) -> Self {
        self.characters = Some(characters);
        self
    }

    pub fn get(&self, property: Property) -> Option<Value> {
        match property {
            Property::Width => self.width.map(Value::Number),
            Property::Height => self.height.map(Value::Number),
            Property::AspectRatio => self.aspect_ratio.map(Value::Number),
            Property::Orientation => self.orientation.map(Value::Orientation),
            Property::Children => self.children.map(Value::from),
            Property::Characters => self.characters.map(Value::from),
        }
    }

    /// Value seen by queries: counts that were never measured read as zero
    pub fn query_value(&self, property: Property) -> Option<Value> {
        match self.get(property) {
            None if property.is_count() => Some(Value::Number(0.0)),
            value => value,
        }
    }

    /// Returns `self` overlaid with every property `update` carries
    pub fn merge(&self, update: &Snapshot) -> Snapshot {
        Snapshot {
            width: update.width.or(self.width),
            height: update.height.or(self.height),
            aspect_ratio: update.aspect_ratio.or(self.aspect_ratio),
            orientation: update.orientation.or(self.orientation),
            children: update.children.or(self.children),
            characters: update.characters.or(self.characters),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, Value)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(|property| self.get(property).map(|value| (property, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Custom-property text for a value: dimensions carry a `px` suffix
pub fn format_property(property: Property, value: Value) -> String {
    match value {
        Value::Number(n) if property.is_dimension() => format!("{}px", format_number(n)),
        value => value.to_string(),
    }
}
