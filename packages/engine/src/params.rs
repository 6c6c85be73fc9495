//! Input contract checks run once, before anything is wired.

use crate::behavior::{Behavior, Callback};
use crate::error::{AttachError, AttachResult};
use crate::host::{Host, NodeKind};
use crate::snapshot::Snapshot;
use element_adapter_query::{validate_all, Property};

/// One element or a list of elements
#[derive(Debug, Clone, PartialEq)]
pub enum Target<N> {
    One(N),
    Many(Vec<N>),
}

impl<N> Target<N> {
    pub fn one(node: N) -> Self {
        Target::One(node)
    }

    pub fn many(nodes: impl IntoIterator<Item = N>) -> Self {
        Target::Many(nodes.into_iter().collect())
    }

    pub fn into_vec(self) -> Vec<N> {
        match self {
            Target::One(node) => vec![node],
            Target::Many(nodes) => nodes,
        }
    }
}

impl<N> From<Vec<N>> for Target<N> {
    fn from(nodes: Vec<N>) -> Self {
        Target::Many(nodes)
    }
}

/// Everything `attach` needs
#[derive(Debug)]
pub struct AttachOptions<N> {
    pub target: Target<N>,
    /// Query text paired with the behavior it drives, applied in order
    pub queries: Vec<(String, Behavior<N>)>,
    /// Extra properties to track even if no query references them
    pub watched_properties: Option<Vec<String>>,
}

impl<N> AttachOptions<N> {
    pub fn new(target: Target<N>) -> Self {
        Self {
            target,
            queries: Vec::new(),
            watched_properties: None,
        }
    }

    pub fn query(mut self, text: impl Into<String>, behavior: Behavior<N>) -> Self {
        self.queries.push((text.into(), behavior));
        self
    }

    pub fn label(self, text: impl Into<String>, label: impl Into<String>) -> Self {
        self.query(text, Behavior::label(label))
    }

    pub fn callback(
        self,
        text: impl Into<String>,
        callback: impl FnMut(&N, &Snapshot) + 'static,
    ) -> Self {
        let callback: Callback<N> = Box::new(callback);
        self.query(text, Behavior::Callback(callback))
    }

    pub fn watch<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watched_properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }
}

/// Flattens the target, rejecting empty lists and anything that is not a
/// live element of `host`
pub fn parse_target<H: Host>(host: &H, target: Target<H::Node>) -> AttachResult<Vec<H::Node>> {
    let elements = target.into_vec();

    if elements.is_empty() {
        return Err(AttachError::empty_target());
    }

    let is_element = |node: &H::Node| host.contains(node) && host.kind(node) == NodeKind::Element;
    if !elements.iter().all(is_element) {
        let items: Vec<String> = elements
            .iter()
            .map(|node| {
                if is_element(node) {
                    format!("{node:?}")
                } else {
                    format!("{node:?} (not an element)")
                }
            })
            .collect();
        return Err(AttachError::invalid_target(&items));
    }

    Ok(elements)
}

/// Grammar check of every query text; the first invalid one fails the call
pub fn validate_queries<B>(queries: &[(String, B)]) -> AttachResult<()> {
    validate_all(queries.iter().map(|(text, _)| text.as_str()))?;
    Ok(())
}

/// Parses explicit watched properties: absent is fine, empty or unknown is not
pub fn validate_watched_properties(properties: Option<&[String]>) -> AttachResult<Vec<Property>> {
    let Some(properties) = properties else {
        return Ok(Vec::new());
    };

    if properties.is_empty() {
        return Err(AttachError::invalid_watched_properties(None));
    }

    properties
        .iter()
        .map(|name| {
            name.parse::<Property>()
                .map_err(|_| AttachError::invalid_watched_properties(Some(name)))
        })
        .collect()
}
