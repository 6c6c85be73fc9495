use crate::behavior::Behavior;
use crate::cache::TransitionCache;
use crate::host::Host;
use crate::snapshot::{format_property, Snapshot};
use element_adapter_query::{CompiledEntry, EvalResult, UnitMeasurements};
use tracing::debug;

/// Evaluates every behavior's query for one element and applies the
/// outcome, then mirrors the snapshot onto the element's custom properties.
///
/// A type mismatch aborts the pass before the mirror is written.
pub fn apply<H: Host>(
    host: &mut H,
    node: &H::Node,
    snapshot: &Snapshot,
    measurements: &UnitMeasurements,
    entries: &mut [CompiledEntry<Behavior<H::Node>>],
    transitions: &mut TransitionCache<H::Node>,
) -> EvalResult<()> {
    for (index, entry) in entries.iter_mut().enumerate() {
        let matched = entry
            .query
            .evaluate(measurements, |property| snapshot.query_value(property))?;

        match &mut entry.behavior {
            Behavior::Label(label) => set_label(host, node, label, matched),
            Behavior::Callback(callback) => {
                let previously = transitions.record(node, index, matched);
                if matched && !previously {
                    debug!(node = ?node, query = %entry.text, "Query started matching, invoking callback");
                    callback(node, snapshot);
                }
            }
        }
    }

    mirror(host, node, snapshot);
    Ok(())
}

/// Adds or removes `label`, touching the element only when its state differs
pub fn set_label<H: Host>(host: &mut H, node: &H::Node, label: &str, present: bool) {
    if host.has_class(node, label) != present {
        host.toggle_class(node, label, present);
    }
}

/// Writes every known property as `--ea-<property>`
pub fn mirror<H: Host>(host: &mut H, node: &H::Node, snapshot: &Snapshot) {
    for (property, value) in snapshot.iter() {
        host.set_custom_property(
            node,
            &property.custom_property_name(),
            &format_property(property, value),
        );
    }
}
