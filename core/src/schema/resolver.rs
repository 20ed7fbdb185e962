//! # Schema Resolver
//!
//! Dereferences and canonicalizes raw `ShimSchema` trees into a [`SchemaGraph`].
//!
//! Handles:
//! - `$ref` to `#/components/schemas/*` as graph edges (one node per component).
//! - Recursive components: a ref to a component still under construction is a
//!   back-edge to the same node.
//! - `allOf` flattening into a single record, merged before any `oneOf` /
//!   `anyOf` wrapping.
//! - Nullability from `nullable`, `x-nullable` and `type: [T, "null"]`.

use crate::error::{AppError, AppResult};
use crate::oas::ref_utils::{component_name, ComponentSection};
use crate::oas::shims::{ShimComponents, ShimOpenApi, ShimSchema};
use crate::schema::graph::{
    PrimitiveKind, SchemaGraph, SchemaId, SchemaKind, SchemaNode, UnionKind,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use utoipa::openapi::RefOr;

/// Run-scoped resolver state. One instance resolves one document.
pub struct SchemaResolver<'a> {
    components: Option<&'a ShimComponents>,
    self_uri: Option<&'a str>,
    graph: SchemaGraph,
    /// Component name -> node, for finished and in-progress components.
    resolved: HashMap<String, SchemaId>,
    /// Components currently on the resolution stack.
    active: HashSet<SchemaId>,
    /// Component aliases (`A: {$ref: B}`) currently being followed.
    aliasing: HashSet<String>,
}

impl<'a> SchemaResolver<'a> {
    /// Creates a resolver over the document's components.
    pub fn new(doc: &'a ShimOpenApi) -> Self {
        Self {
            components: doc.components.as_ref(),
            self_uri: doc.self_uri.as_deref(),
            graph: SchemaGraph::new(),
            resolved: HashMap::new(),
            active: HashSet::new(),
            aliasing: HashSet::new(),
        }
    }

    /// Resolves every component schema in declaration order.
    pub fn resolve_components(&mut self) -> AppResult<()> {
        let Some(components) = self.components else {
            return Ok(());
        };
        for name in components.schemas.keys() {
            self.resolve_component(name)?;
        }
        Ok(())
    }

    /// Resolves a `$ref`-or-inline schema found at `location`.
    pub fn resolve(&mut self, schema: &RefOr<ShimSchema>, location: &str) -> AppResult<SchemaId> {
        match schema {
            RefOr::Ref(r) => self.resolve_ref(&r.ref_location),
            RefOr::T(inline) => self.resolve_inline(inline, location),
        }
    }

    /// Read access to the graph built so far.
    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Consumes the resolver, yielding the finished graph.
    pub fn finish(self) -> SchemaGraph {
        self.graph
    }

    fn resolve_ref(&mut self, ref_str: &str) -> AppResult<SchemaId> {
        let name = component_name(ref_str, self.self_uri, ComponentSection::Schemas)?;
        self.resolve_component(&name)
    }

    /// Resolves a named component, reusing the node if it was seen before.
    pub fn resolve_component(&mut self, name: &str) -> AppResult<SchemaId> {
        if let Some(id) = self.resolved.get(name) {
            if self.active.contains(id) {
                tracing::trace!(component = name, "back-edge to component under resolution");
            }
            return Ok(*id);
        }

        let raw = self
            .components
            .and_then(|c| c.schemas.get(name))
            .ok_or_else(|| {
                AppError::UnresolvedReference(format!("#/components/schemas/{}", name))
            })?;

        match raw {
            RefOr::Ref(r) => {
                if !self.aliasing.insert(name.to_string()) {
                    return Err(AppError::unsupported(
                        name,
                        "component aliases form a reference cycle without a schema",
                    ));
                }
                let target = self.resolve_ref(&r.ref_location)?;
                self.aliasing.remove(name);
                self.resolved.insert(name.to_string(), target);
                self.graph.register_component(name, target);
                Ok(target)
            }
            RefOr::T(schema) => {
                let id = self.graph.push(SchemaNode::anonymous(SchemaKind::empty_record()));
                self.resolved.insert(name.to_string(), id);
                self.graph.register_component(name, id);
                self.active.insert(id);

                let mut node = self.build_node(schema, name)?;
                node.name = Some(name.to_string());
                self.graph.replace(id, node);

                self.active.remove(&id);
                tracing::debug!(component = name, id = %id, "resolved component schema");
                Ok(id)
            }
        }
    }

    fn resolve_inline(&mut self, schema: &ShimSchema, location: &str) -> AppResult<SchemaId> {
        let node = self.build_node(schema, location)?;
        Ok(self.graph.push(node))
    }

    fn build_node(&mut self, schema: &ShimSchema, location: &str) -> AppResult<SchemaNode> {
        let type_names: Vec<&str> = schema
            .schema_type
            .as_ref()
            .map(|t| t.names())
            .unwrap_or_default();
        let type_is_nullable = type_names.contains(&"null");
        let concrete: Vec<&str> = type_names.into_iter().filter(|t| *t != "null").collect();

        let union = match (&schema.one_of, &schema.any_of) {
            (Some(_), Some(_)) => {
                return Err(AppError::unsupported(
                    location,
                    "oneOf and anyOf on the same schema have no defined precedence",
                ))
            }
            (Some(branches), None) => Some((branches, UnionKind::OneOf)),
            (None, Some(branches)) => Some((branches, UnionKind::AnyOf)),
            (None, None) => None,
        };

        // allOf (and sibling structure) first, then any union wrapping.
        let base = match &schema.all_of {
            Some(members) => Some(self.merge_all_of(members, schema, &concrete, location)?),
            None => self.own_shape(schema, &concrete, location)?,
        };

        let kind = match (base, union) {
            (Some(base), Some((branches, kind))) => {
                let union_kind = self.union_kind(branches, kind, location)?;
                if is_bare_object(&base) {
                    union_kind
                } else {
                    let base_id = self.graph.push(SchemaNode::anonymous(base));
                    let union_id = self.graph.push(SchemaNode::anonymous(union_kind));
                    SchemaKind::Intersection {
                        branches: vec![base_id, union_id],
                    }
                }
            }
            (Some(base), None) => base,
            (None, Some((branches, kind))) => self.union_kind(branches, kind, location)?,
            (None, None) => SchemaKind::empty_record(),
        };

        Ok(SchemaNode {
            kind,
            nullable: schema.nullable || schema.x_nullable || type_is_nullable,
            default: schema.default.clone(),
            name: None,
            title: schema.title.clone(),
        })
    }

    /// The node's own structural keywords, ignoring composition.
    fn own_shape(
        &mut self,
        schema: &ShimSchema,
        concrete: &[&str],
        location: &str,
    ) -> AppResult<Option<SchemaKind>> {
        match concrete {
            [] => {
                if schema.items.is_some() {
                    self.array_kind(schema, location).map(Some)
                } else if !schema.properties.is_empty() || !schema.required.is_empty() {
                    self.record_kind(schema, location).map(Some)
                } else {
                    Ok(None)
                }
            }
            ["object"] => self.record_kind(schema, location).map(Some),
            ["array"] => self.array_kind(schema, location).map(Some),
            [single] => PrimitiveKind::from_type_name(single)
                .map(|p| Some(SchemaKind::Primitive(p)))
                .ok_or_else(|| {
                    AppError::unsupported(location, format!("unknown type '{}'", single))
                }),
            many => {
                let mut branches = Vec::with_capacity(many.len());
                for name in many {
                    let prim = PrimitiveKind::from_type_name(name).ok_or_else(|| {
                        AppError::unsupported(
                            location,
                            format!("type list mixes '{}' with other types", name),
                        )
                    })?;
                    branches.push(
                        self.graph
                            .push(SchemaNode::anonymous(SchemaKind::Primitive(prim))),
                    );
                }
                Ok(Some(SchemaKind::Union {
                    branches,
                    kind: UnionKind::AnyOf,
                }))
            }
        }
    }

    fn record_kind(&mut self, schema: &ShimSchema, location: &str) -> AppResult<SchemaKind> {
        let mut fields = IndexMap::new();
        for (prop, prop_schema) in &schema.properties {
            let id = self.resolve(prop_schema, &format!("{}.{}", location, prop))?;
            fields.insert(prop.clone(), id);
        }
        let required: IndexSet<String> = schema.required.iter().cloned().collect();
        Ok(SchemaKind::Record { fields, required })
    }

    fn array_kind(&mut self, schema: &ShimSchema, location: &str) -> AppResult<SchemaKind> {
        let items = schema
            .items
            .as_ref()
            .ok_or_else(|| AppError::unsupported(location, "array schema without 'items'"))?;
        let item = self.resolve(items, &format!("{}[]", location))?;
        Ok(SchemaKind::Array { item })
    }

    fn union_kind(
        &mut self,
        branches: &[RefOr<ShimSchema>],
        kind: UnionKind,
        location: &str,
    ) -> AppResult<SchemaKind> {
        let mut ids = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            ids.push(self.resolve(branch, &format!("{}.{}[{}]", location, kind.as_str(), i))?);
        }
        Ok(SchemaKind::Union {
            branches: ids,
            kind,
        })
    }

    /// Flattens `allOf` members (plus the node's own properties/type) into one
    /// shape. Falls back to an intersection when a member is still under
    /// construction or is itself a composition.
    fn merge_all_of(
        &mut self,
        members: &[RefOr<ShimSchema>],
        schema: &ShimSchema,
        concrete: &[&str],
        location: &str,
    ) -> AppResult<SchemaKind> {
        let mut ids = Vec::with_capacity(members.len() + 1);
        for (i, member) in members.iter().enumerate() {
            ids.push(self.resolve(member, &format!("{}.allOf[{}]", location, i))?);
        }
        if let Some(sibling) = self.own_shape(schema, concrete, location)? {
            ids.push(self.graph.push(SchemaNode::anonymous(sibling)));
        }

        if ids.iter().any(|id| self.active.contains(id)) {
            tracing::trace!(location = location, "allOf member is recursive; keeping intersection");
            return Ok(SchemaKind::Intersection { branches: ids });
        }

        let mut merged: Option<SchemaKind> = None;
        for id in &ids {
            let member = &self.graph[*id].kind;
            merged = match (merged, member) {
                (_, SchemaKind::Union { .. }) | (_, SchemaKind::Intersection { .. }) => {
                    return Ok(SchemaKind::Intersection {
                        branches: ids.clone(),
                    });
                }
                (None, kind) => Some(kind.clone()),
                (
                    Some(SchemaKind::Record {
                        mut fields,
                        mut required,
                    }),
                    SchemaKind::Record {
                        fields: more_fields,
                        required: more_required,
                    },
                ) => {
                    // Later members override earlier properties of the same name.
                    for (name, field_id) in more_fields {
                        fields.insert(name.clone(), *field_id);
                    }
                    required.extend(more_required.iter().cloned());
                    Some(SchemaKind::Record { fields, required })
                }
                (Some(SchemaKind::Primitive(a)), SchemaKind::Primitive(b)) if a == *b => {
                    Some(SchemaKind::Primitive(a))
                }
                (Some(SchemaKind::Array { item: a }), SchemaKind::Array { item: b }) if a == *b => {
                    Some(SchemaKind::Array { item: a })
                }
                (Some(acc), other) => {
                    return Err(AppError::unsupported(
                        location,
                        format!(
                            "allOf combines '{}' with '{}'",
                            acc.describe(),
                            other.describe()
                        ),
                    ))
                }
            };
        }

        Ok(merged.unwrap_or_else(SchemaKind::empty_record))
    }
}

fn is_bare_object(kind: &SchemaKind) -> bool {
    matches!(kind, SchemaKind::Record { fields, required } if fields.is_empty() && required.is_empty())
}

/// Resolves every component schema of `doc` into a fresh graph.
pub fn resolve_schemas(doc: &ShimOpenApi) -> AppResult<SchemaGraph> {
    let mut resolver = SchemaResolver::new(doc);
    resolver.resolve_components()?;
    Ok(resolver.finish())
}
