//! # Naming Context
//!
//! Run-scoped registry of the names handed out to schemas.
//!
//! A base name is the schema's `title`, else the role it plays in its parent
//! (property name or parent component name), title-cased. When the base is
//! already held by a structurally different schema, a two-digit suffix is
//! appended (`Profile01`, `Profile02`, ...). Structurally identical schemas
//! share one name.

use crate::naming::case::title_case;
use crate::naming::structural::structurally_equal;
use crate::schema::graph::{SchemaGraph, SchemaId};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Fallback base when neither a title nor a role yields any characters.
const ANONYMOUS_BASE: &str = "Anonymous";

/// Name assignments for one mapping run.
#[derive(Debug, Clone, Default)]
pub struct NamingContext {
    /// Name -> node holding it, in assignment order. `None` marks a
    /// synthetic name with no node of its own.
    taken: IndexMap<String, Option<SchemaId>>,
    /// Node -> its assigned name.
    by_id: HashMap<SchemaId, String>,
}

impl NamingContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context pre-loaded with every component name of `graph`, so
    /// anonymous schemas never shadow a component.
    pub fn seeded(graph: &SchemaGraph) -> Self {
        let mut ctx = Self::new();
        for (name, id) in graph.components() {
            ctx.reserve(name, id);
        }
        ctx
    }

    /// Binds `name` to `id` without suffixing. Existing bindings win.
    pub fn reserve(&mut self, name: &str, id: SchemaId) {
        if !self.taken.contains_key(name) {
            self.taken.insert(name.to_string(), Some(id));
        }
        self.by_id.entry(id).or_insert_with(|| name.to_string());
    }

    /// The name already given to `id`, if any.
    pub fn name_of(&self, id: SchemaId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// All assigned names, in assignment order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.taken.keys().map(String::as_str)
    }

    /// Names `id`, deriving the base from its title or `role`.
    pub fn assign(&mut self, graph: &SchemaGraph, id: SchemaId, role: &str) -> String {
        if let Some(existing) = self.by_id.get(&id) {
            return existing.clone();
        }

        let base = base_name(graph, id, role);
        let mut suffix = 0usize;
        loop {
            let candidate = if suffix == 0 {
                base.clone()
            } else {
                format!("{}{:02}", base, suffix)
            };

            match self.taken.get(&candidate) {
                None => {
                    tracing::trace!(name = %candidate, id = %id, "assigned schema name");
                    self.taken.insert(candidate.clone(), Some(id));
                    self.by_id.insert(id, candidate.clone());
                    return candidate;
                }
                Some(Some(holder)) if structurally_equal(graph, *holder, id) => {
                    tracing::trace!(name = %candidate, id = %id, "reusing name of identical schema");
                    self.by_id.insert(id, candidate.clone());
                    return candidate;
                }
                Some(_) => suffix += 1,
            }
        }
    }

    /// Reserves a name for a type that has no node of its own, such as one
    /// alternative of an `allOf` distributed over a `oneOf`. Never reuses.
    pub fn assign_synthetic(&mut self, base: &str) -> String {
        let base = if base.is_empty() { ANONYMOUS_BASE } else { base };
        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        while self.taken.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{}{:02}", base, suffix);
        }
        self.taken.insert(candidate.clone(), None);
        candidate
    }
}

/// The un-suffixed name for `id`: its title, else `role`, title-cased.
pub fn base_name(graph: &SchemaGraph, id: SchemaId, role: &str) -> String {
    let source = graph[id]
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(role);
    let name = title_case(source);
    if name.is_empty() {
        ANONYMOUS_BASE.to_string()
    } else {
        name
    }
}
