//! The observation engine: wires change sources for a set of elements and
//! keeps their behaviors in sync with what they measure.
//!
//! ```text
//!   resize ──► on_resize ──► pending ──► on_frame ─┐
//!   input  ──► on_input  (count changed?) ─────────┼──► adapt(element)
//!   mutate ──► on_mutations (disconnect … reconnect)┘      │
//!                                                         ▼
//!                              measure units ─► apply behaviors ─► mirror
//! ```

use crate::applier::{apply, set_label};
use crate::behavior::Behavior;
use crate::cache::{PropertyCache, TransitionCache};
use crate::error::{AttachError, AttachResult};
use crate::host::{Editing, Host, MutationKind, MutationRecord, ObserverId, ResizeEntry};
use crate::measure::{count_characters, initial_snapshot, measure_units};
use crate::params::{parse_target, validate_queries, validate_watched_properties, AttachOptions};
use crate::snapshot::Snapshot;
use crate::watched::{Listeners, WatchedProperties};
use element_adapter_query::{compile_query_list, Axis, CompiledEntry, EvalResult, LengthUnit};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Attached,
    /// Terminal. Every notification and refresh is inert from here on.
    Detached,
}

/// One attach call: its elements, compiled behaviors and per-element state
pub struct Adapter<N> {
    id: ObserverId,
    state: AdapterState,
    elements: Vec<N>,
    entries: Vec<CompiledEntry<Behavior<N>>>,
    units: Vec<LengthUnit>,
    percent_units: Vec<Axis>,
    watched: WatchedProperties,
    listeners: Listeners,
    cache: PropertyCache<N>,
    transitions: TransitionCache<N>,
    /// Elements with a dimension change waiting for the next frame
    pending: Vec<N>,
}

impl<N> fmt::Debug for Adapter<N>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("elements", &self.elements)
            .field("queries", &self.entries.len())
            .field("watched", &self.watched)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<N> Adapter<N>
where
    N: Clone + Eq + Hash + fmt::Debug,
{
    /// Validates `options`, compiles every query, measures each element,
    /// wires the change sources the watched properties need and applies
    /// every behavior once.
    ///
    /// Validation runs before anything touches the host, so a setup error
    /// leaves nothing wired.
    #[instrument(skip_all, fields(queries = options.queries.len()))]
    pub fn attach<H>(host: &mut H, options: AttachOptions<N>) -> AttachResult<Self>
    where
        H: Host<Node = N>,
    {
        let AttachOptions {
            target,
            queries,
            watched_properties,
        } = options;

        validate_queries(&queries)?;
        let extra = validate_watched_properties(watched_properties.as_deref())?;
        let elements = parse_target(&*host, target)?;
        let compiled = compile_query_list(queries)?;

        let watched = WatchedProperties::new(compiled.properties.iter().copied().chain(extra));
        if watched.is_empty() {
            return Err(AttachError::NoWatchedProperties);
        }

        let listeners = Listeners::required(&*host, &elements, &watched);

        let mut adapter = Adapter {
            id: ObserverId::next(),
            state: AdapterState::Attached,
            elements,
            entries: compiled.entries,
            units: compiled.units,
            percent_units: compiled.percent_units,
            watched,
            listeners,
            cache: PropertyCache::new(),
            transitions: TransitionCache::new(),
            pending: Vec::new(),
        };

        if let Err(error) = adapter.observe(host) {
            adapter.detach(host);
            return Err(error.into());
        }

        info!(
            observer = %adapter.id,
            elements = adapter.elements.len(),
            queries = adapter.entries.len(),
            watched = adapter.watched.len(),
            "Attached element adapter"
        );

        Ok(adapter)
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == AdapterState::Attached
    }

    pub fn elements(&self) -> &[N] {
        &self.elements
    }

    pub fn watched(&self) -> &WatchedProperties {
        &self.watched
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    pub fn snapshot(&self, node: &N) -> Option<&Snapshot> {
        self.cache.get(node)
    }

    /// Number of elements waiting for the next frame
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn observe<H>(&mut self, host: &mut H) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        for element in &self.elements {
            let snapshot = initial_snapshot(&*host, element, &self.watched);
            self.cache.insert(element.clone(), snapshot);
        }

        if self.listeners.dimensions {
            for element in &self.elements {
                host.observe_resize(self.id, element);
            }
            debug!(observer = %self.id, "Wired dimension listener");
        }

        if self.listeners.input {
            for element in &self.elements {
                if host.editing(element) == Editing::TextInput {
                    host.add_input_listener(self.id, element);
                }
            }
            debug!(observer = %self.id, "Wired text-input listener");
        }

        if self.listeners.mutations {
            self.connect_mutations(host);
            debug!(observer = %self.id, "Wired structural-mutation listener");
        }

        let elements = self.elements.clone();
        for element in &elements {
            self.adapt(host, element)?;
        }

        Ok(())
    }

    fn connect_mutations<H>(&self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        for element in &self.elements {
            if !host.contains(element) {
                continue;
            }
            if let Some(scope) = self.watched.mutation_scope(host.editing(element)) {
                host.observe_mutations(self.id, element, scope);
            }
        }
    }

    /// Re-evaluates every behavior of `node` from its cached snapshot and a
    /// freshly measured unit table
    fn adapt<H>(&mut self, host: &mut H, node: &N) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        let Some(snapshot) = self.cache.get(node).copied() else {
            return Ok(());
        };

        let measurements = measure_units(host, node, &self.units, &self.percent_units);
        debug!(observer = %self.id, node = ?node, "Applying behaviors");

        apply(
            host,
            node,
            &snapshot,
            &measurements,
            &mut self.entries,
            &mut self.transitions,
        )
    }

    fn evict(&mut self, node: &N) {
        self.cache.remove(node);
        self.transitions.forget(node);
        self.pending.retain(|pending| pending != node);
    }

    /// Merges new content boxes and defers their re-apply to the next frame.
    /// Several entries for one element collapse into a single re-apply.
    pub fn on_resize<H>(&mut self, host: &H, entries: &[ResizeEntry<N>])
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            return;
        }

        for entry in entries {
            if !host.contains(&entry.target) {
                warn!(observer = %self.id, node = ?entry.target, "Dropping resize of unreachable element");
                continue;
            }

            let update = Snapshot::from_dimensions(entry.content_box.width, entry.content_box.height);
            if self.cache.update(&entry.target, &update).is_none() {
                warn!(observer = %self.id, node = ?entry.target, "Dropping resize of unknown element");
                continue;
            }

            if !self.pending.contains(&entry.target) {
                self.pending.push(entry.target.clone());
            }
        }
    }

    /// Next paint opportunity: re-applies every element with a pending
    /// dimension change. Elements that left the host are evicted instead.
    ///
    /// Every pending element is processed; the first evaluation error is
    /// returned afterwards.
    pub fn on_frame<H>(&mut self, host: &mut H) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            self.pending.clear();
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending);
        let mut result = Ok(());

        for node in &pending {
            if !host.contains(node) {
                warn!(observer = %self.id, node = ?node, "Evicting unreachable element");
                self.evict(node);
                continue;
            }

            if let Err(error) = self.adapt(host, node) {
                result = result.and(Err(error));
            }
        }

        result
    }

    /// Text-input notification. Re-applies synchronously, but only if the
    /// trimmed character count actually changed.
    pub fn on_input<H>(&mut self, host: &mut H, node: &N) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            return Ok(());
        }

        let Some(cached) = self.cache.get(node) else {
            warn!(observer = %self.id, node = ?node, "Dropping input of unknown element");
            return Ok(());
        };

        let characters = count_characters(&*host, node);
        if cached.characters == Some(characters) {
            debug!(observer = %self.id, node = ?node, characters, "Character count unchanged");
            return Ok(());
        }

        self.cache
            .update(node, &Snapshot::new().with_characters(characters));
        self.adapt(host, node)
    }

    /// Structural mutations. The listener is disconnected while the records
    /// are processed so the applier's own writes are never observed, then
    /// reconnected whatever the outcome.
    pub fn on_mutations<H>(&mut self, host: &mut H, records: &[MutationRecord<N>]) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            return Ok(());
        }

        host.disconnect_mutations(self.id);
        let result = self.process_mutations(host, records);
        self.connect_mutations(host);

        result
    }

    fn process_mutations<H>(&mut self, host: &mut H, records: &[MutationRecord<N>]) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        let mut affected: Vec<N> = Vec::new();

        for record in records {
            if !matches!(record.kind, MutationKind::ChildList | MutationKind::CharacterData) {
                continue;
            }
            match self.tracked_ancestor(&*host, &record.target) {
                Some(element) if !affected.contains(&element) => affected.push(element),
                Some(_) => {}
                None => debug!(observer = %self.id, node = ?record.target, "Ignoring mutation outside tracked elements"),
            }
        }

        for element in &affected {
            let editing = host.editing(element);
            let mut update = Snapshot::new();

            if self.watched.children() && editing == Editing::None {
                update.children = Some(host.child_element_count(element));
            }
            if self.watched.editable_characters(editing) {
                update.characters = Some(count_characters(&*host, element));
            }

            if update.is_empty() {
                continue;
            }

            self.cache.update(element, &update);
            self.adapt(host, element)?;
        }

        Ok(())
    }

    /// Closest tracked element at or above `node`
    fn tracked_ancestor<H>(&self, host: &H, node: &N) -> Option<N>
    where
        H: Host<Node = N>,
    {
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if self.cache.contains(&candidate) {
                return Some(candidate);
            }
            current = host.parent(&candidate);
        }
        None
    }

    /// Re-applies every element from its cached snapshot. A no-op once
    /// detached.
    pub fn refresh<H>(&mut self, host: &mut H) -> EvalResult<()>
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            return Ok(());
        }

        let elements = self.elements.clone();
        let mut result = Ok(());

        for element in &elements {
            if !host.contains(element) {
                self.evict(element);
                continue;
            }
            if let Err(error) = self.adapt(host, element) {
                result = result.and(Err(error));
            }
        }

        debug!(observer = %self.id, "Refreshed");
        result
    }

    /// Unwires every listener, removes every label and `--ea-*` mirror this
    /// engine may have written and forgets all per-element state. Calling it
    /// again does nothing.
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        if !self.is_attached() {
            return;
        }
        self.state = AdapterState::Detached;

        if self.listeners.mutations {
            host.disconnect_mutations(self.id);
        }

        for element in &self.elements {
            if self.listeners.dimensions {
                host.unobserve_resize(self.id, element);
            }
            if self.listeners.input {
                host.remove_input_listener(self.id, element);
            }

            if !host.contains(element) {
                continue;
            }

            for entry in &self.entries {
                if let Some(label) = entry.behavior.as_label() {
                    set_label(host, element, label, false);
                }
            }
            for property in self.watched.mirrored() {
                host.remove_custom_property(element, &property.custom_property_name());
            }
        }

        self.cache.clear();
        self.transitions.clear();
        self.pending.clear();

        info!(observer = %self.id, elements = self.elements.len(), "Detached element adapter");
    }
}
