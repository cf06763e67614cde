//! Normalization of irregular nested responses into flat mappings.
//!
//! # Design
//! The service collapses repeated elements inconsistently: zero elements
//! drop the key, one element arrives as a bare mapping, two or more arrive
//! as a sequence. `extract` hides that behind one rule applied at every
//! nesting level:
//!
//! 1. Descend the wrapper keys to the return node. A missing node yields an
//!    empty result.
//! 2. Copy the declared context keys off the return node.
//! 3. Normalize the collection at the current level to a sequence of
//!    mappings, dropping nil entries.
//! 4. At an intermediate level, every non-collection key of the element
//!    joins the context for the level below. Keys from the inner level win
//!    over the outer level, which wins over the return-node context.
//! 5. Rename keys into record vocabulary as each level is merged, so a
//!    renamed outer key never displaces an inner element's own key.
//!
//! Extraction never fails; malformed entries are dropped with a warning.

use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce::Symbol;
use crate::record::Mapping;

/// Where repeated elements live in a response and which keys are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSpec {
    /// Keys leading from the response root to the return node.
    pub wrapper: &'static [&'static str],
    /// Keys read off the return node and merged into every element.
    pub context: &'static [&'static str],
    /// Collection key per nesting level, outermost first.
    pub collection: &'static [&'static str],
    /// `(response key, record key)` renames applied at every level.
    pub renames: &'static [(&'static str, &'static str)],
}

impl ExtractionSpec {
    pub const fn new(wrapper: &'static [&'static str], collection: &'static [&'static str]) -> Self {
        Self {
            wrapper,
            context: &[],
            collection,
            renames: &[],
        }
    }

    pub const fn with_context(mut self, context: &'static [&'static str]) -> Self {
        self.context = context;
        self
    }

    pub const fn with_renames(mut self, renames: &'static [(&'static str, &'static str)]) -> Self {
        self.renames = renames;
        self
    }
}

/// Flatten `response` into an ordered sequence of per-record mappings.
pub fn extract(response: &Value, spec: &ExtractionSpec) -> Vec<Mapping> {
    let Some(node) = return_node(response, spec.wrapper) else {
        debug!(wrapper = ?spec.wrapper, "no return node in response");
        return Vec::new();
    };

    let mut out = Vec::new();
    flatten(node, spec.collection, &context_of(node, spec), spec.renames, &mut out);
    debug!(collection = ?spec.collection, count = out.len(), "extracted elements");
    out
}

/// The declared context keys of `response`'s return node, renamed. Empty
/// when there is no return node.
pub fn context(response: &Value, spec: &ExtractionSpec) -> Mapping {
    return_node(response, spec.wrapper)
        .map(|node| context_of(node, spec))
        .unwrap_or_default()
}

fn context_of(node: &Mapping, spec: &ExtractionSpec) -> Mapping {
    let mut context = Mapping::new();
    for key in spec.context {
        if let Some(value) = node.get(*key) {
            context.insert(renamed(key, spec.renames).to_string(), value.clone());
        }
    }
    context
}

/// Descend `path` from the root; every step must land on a mapping.
pub fn return_node<'a>(response: &'a Value, path: &[&str]) -> Option<&'a Mapping> {
    let mut node = response.as_object()?;
    for key in path {
        node = node.get(*key)?.as_object()?;
    }
    Some(node)
}

fn flatten(
    node: &Mapping,
    levels: &[&str],
    context: &Mapping,
    renames: &[(&str, &str)],
    out: &mut Vec<Mapping>,
) {
    let Some((key, inner)) = levels.split_first() else {
        out.push(merged(context, node, None, renames));
        return;
    };
    for element in normalize(node.get(*key)) {
        match inner.first() {
            None => out.push(merged(context, element, None, renames)),
            Some(next) => {
                let scoped = merged(context, element, Some(*next), renames);
                flatten(element, inner, &scoped, renames, out);
            }
        }
    }
}

/// Normalize a collection value: absent or nil is empty, a bare mapping is a
/// one-element sequence, and a sequence passes through minus nil entries.
pub fn normalize(value: Option<&Value>) -> Vec<&Mapping> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(as_element).collect(),
        Some(single) => as_element(single).into_iter().collect(),
    }
}

fn as_element(value: &Value) -> Option<&Mapping> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(entry = %other, "dropping non-mapping collection entry");
            None
        }
    }
}

/// `context` overlaid with `element` (minus `skip`), the element's keys
/// renamed into record vocabulary first. The element's keys win; within one
/// element a key already in record vocabulary wins over a renamed one.
fn merged(context: &Mapping, element: &Mapping, skip: Option<&str>, renames: &[(&str, &str)]) -> Mapping {
    let mut out = context.clone();
    for (k, v) in element {
        if skip == Some(k.as_str()) {
            continue;
        }
        let target = renamed(k, renames);
        if target != k.as_str() && element.contains_key(target) {
            continue;
        }
        out.insert(target.to_string(), v.clone());
    }
    out
}

fn renamed<'a>(key: &'a str, renames: &[(&str, &'a str)]) -> &'a str {
    renames
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| *to)
}

/// Fold name/value pair elements into one mapping keyed by the symbolized
/// name, e.g. `{"name": "Post Date", "value": "2011-03-01"}` becomes
/// `{"post_date": "2011-03-01"}`. Later pairs win on duplicate names.
pub fn fold_pairs(elements: &[Mapping], name_key: &str, value_key: &str) -> Mapping {
    let mut out = Mapping::new();
    for element in elements {
        let Some(name) = element.get(name_key).and_then(Value::as_str) else {
            continue;
        };
        let value = element.get(value_key).cloned().unwrap_or(Value::Null);
        out.insert(Symbol::new(name).as_str().to_string(), value);
    }
    out
}
