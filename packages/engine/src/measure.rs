//! Measurement of elements: derived properties and unit resolution.

use crate::host::{Editing, Host};
use crate::snapshot::Snapshot;
use crate::watched::WatchedProperties;
use element_adapter_query::{Axis, LengthUnit, UnitKey, UnitMeasurements};
use tracing::warn;

/// Trimmed text length of a text input or content-editable element, 0 for
/// anything else
pub fn count_characters<H: Host>(host: &H, node: &H::Node) -> usize {
    match host.editing(node) {
        Editing::TextInput | Editing::ContentEditable => {
            host.text_value(node).trim().chars().count()
        }
        Editing::None => 0,
    }
}

/// Baseline snapshot, touching only the measurements the watched set needs
pub fn initial_snapshot<H: Host>(host: &H, node: &H::Node, watched: &WatchedProperties) -> Snapshot {
    let mut snapshot = Snapshot::new();

    if watched.dimensions() {
        let content_box = host.content_box(node);
        snapshot = Snapshot::from_dimensions(content_box.width, content_box.height);
    }

    let editing = host.editing(node);

    if watched.characters() && editing != Editing::None {
        snapshot.characters = Some(count_characters(host, node));
    }

    if watched.children() && editing == Editing::None {
        snapshot.children = Some(host.child_element_count(node));
    }

    snapshot
}

/// Pixel equivalent of every unit a query set needs for `node`: plain units
/// against the element itself, percentages against its containing block.
/// Nothing is probed when no unit is needed.
pub fn measure_units<H: Host>(
    host: &mut H,
    node: &H::Node,
    units: &[LengthUnit],
    percent_units: &[Axis],
) -> UnitMeasurements {
    let mut measurements = UnitMeasurements::new();

    let unit_requests: Vec<(UnitKey, Axis, String)> = units
        .iter()
        .map(|unit| (UnitKey::Length(*unit), Axis::Width, format!("1{unit}")))
        .collect();
    measurements.extend(probe(host, node, &unit_requests));

    if !percent_units.is_empty() {
        match host.parent(node) {
            Some(parent) => {
                let percent_requests: Vec<(UnitKey, Axis, String)> = percent_units
                    .iter()
                    .map(|axis| (UnitKey::Percent(*axis), *axis, "1%".to_string()))
                    .collect();
                measurements.extend(probe(host, &parent, &percent_requests));
            }
            None => warn!(node = ?node, "No containing block to resolve percentages against"),
        }
    }

    measurements
}

/// Sizes one transient probe in `context` for each request and reads it
/// back. The probe is removed before returning.
fn probe<H: Host>(
    host: &mut H,
    context: &H::Node,
    requests: &[(UnitKey, Axis, String)],
) -> UnitMeasurements {
    let mut measurements = UnitMeasurements::new();
    if requests.is_empty() {
        return measurements;
    }

    let probe = host.append_probe(context);

    for (key, axis, length) in requests {
        host.set_probe_length(&probe, *axis, length);
        measurements.insert(*key, host.probe_size(&probe).along(*axis));
    }

    host.remove_probe(context, &probe);
    measurements
}
