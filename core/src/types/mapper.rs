//! # Type Mapper
//!
//! The contract-to-declared direction: maps schema graph nodes to
//! [`DeclaredType`]s. Named components map to `Named` references; anonymous
//! records and intersections get names from the [`NamingContext`] and are
//! emitted as extra definitions.

use crate::declared::model::{DeclaredType, RecordField, RecordType, ScalarKind};
use crate::naming::context::{base_name, NamingContext};
use crate::schema::graph::{PrimitiveKind, SchemaGraph, SchemaId, SchemaKind};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::collections::HashSet;

/// Options shared by the mapping directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapperConfig {
    /// A nullable field or parameter is also treated as not required.
    pub treat_nilable_as_optional: bool,
}

/// Ordered type definitions produced by one mapping run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeModel {
    /// Definitions keyed by type name, components first.
    pub definitions: IndexMap<String, DeclaredType>,
}

impl TypeModel {
    /// Looks up a definition.
    pub fn get(&self, name: &str) -> Option<&DeclaredType> {
        self.definitions.get(name)
    }

    /// Definition names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// Maps one graph. Holds the run's naming state.
pub struct TypeMapper<'g> {
    graph: &'g SchemaGraph,
    config: MapperConfig,
    naming: NamingContext,
    extra: IndexMap<String, DeclaredType>,
    emitted: HashSet<String>,
}

impl<'g> TypeMapper<'g> {
    /// A mapper whose naming context is seeded with the graph's components.
    pub fn new(graph: &'g SchemaGraph, config: MapperConfig) -> Self {
        Self {
            graph,
            config,
            naming: NamingContext::seeded(graph),
            extra: IndexMap::new(),
            emitted: HashSet::new(),
        }
    }

    /// The naming context of this run.
    pub fn naming(&self) -> &NamingContext {
        &self.naming
    }

    /// Maps the node at `id`, which sits under `role` (property or parent
    /// component name) in its parent.
    pub fn map_schema(&mut self, id: SchemaId, role: &str) -> DeclaredType {
        let graph = self.graph;
        let node = &graph[id];
        let ty = match &node.name {
            Some(name) => DeclaredType::Named(name.clone()),
            None => self.map_anonymous(id, role),
        };
        wrap_nullable(ty, node.nullable)
    }

    /// Definitions emitted for anonymous schemas so far.
    pub fn finish(self) -> TypeModel {
        TypeModel {
            definitions: self.extra,
        }
    }

    fn map_anonymous(&mut self, id: SchemaId, role: &str) -> DeclaredType {
        let graph = self.graph;
        match &graph[id].kind {
            SchemaKind::Primitive(p) => DeclaredType::Scalar(scalar_of(*p)),
            SchemaKind::Array { item } => {
                DeclaredType::array(self.map_schema(*item, &format!("{} item", role)))
            }
            SchemaKind::Union { branches, .. } => DeclaredType::Union(
                branches
                    .iter()
                    .map(|b| self.map_schema(*b, role))
                    .collect(),
            ),
            SchemaKind::Record { .. } | SchemaKind::Intersection { .. } => {
                let name = self.naming.assign(graph, id, role);
                // A component already carries its own definition.
                if graph.component(&name).is_none() {
                    self.emit(id, &name);
                }
                DeclaredType::Named(name)
            }
        }
    }

    /// Adds the definition of `id` under `name` unless already present.
    fn emit(&mut self, id: SchemaId, name: &str) {
        if !self.emitted.insert(name.to_string()) {
            return;
        }
        // Reserve the slot so the parent precedes nested definitions.
        self.extra
            .insert(name.to_string(), DeclaredType::Named(name.to_string()));
        let definition = self.definition(id, name);
        self.extra.insert(name.to_string(), definition);
    }

    /// The body of `id` as a definition called `name`, without nullability.
    fn definition(&mut self, id: SchemaId, name: &str) -> DeclaredType {
        let graph = self.graph;
        match &graph[id].kind {
            SchemaKind::Primitive(p) => DeclaredType::Scalar(scalar_of(*p)),
            SchemaKind::Array { item } => {
                DeclaredType::array(self.map_schema(*item, &format!("{} item", name)))
            }
            SchemaKind::Union { branches, .. } => DeclaredType::Union(
                branches
                    .iter()
                    .map(|b| self.map_schema(*b, name))
                    .collect(),
            ),
            SchemaKind::Record { fields, required } => {
                let fields: Vec<(String, SchemaId)> =
                    fields.iter().map(|(k, v)| (k.clone(), *v)).collect();
                DeclaredType::Record(self.record(name, &fields, required))
            }
            SchemaKind::Intersection { .. } => self.intersection(id, name),
        }
    }

    fn record(
        &mut self,
        name: &str,
        fields: &[(String, SchemaId)],
        required: &IndexSet<String>,
    ) -> RecordType {
        let mut out = Vec::with_capacity(fields.len());
        for (field, field_id) in fields {
            let nullable = self.graph[*field_id].nullable;
            out.push(RecordField {
                name: field.clone(),
                ty: self.map_schema(*field_id, field),
                optional: !required.contains(field)
                    || (nullable && self.config.treat_nilable_as_optional),
                doc: None,
            });
        }
        RecordType::new(name, out)
    }

    /// Flattens an intersection into a record. When a member is a union, the
    /// shared fields are distributed over each alternative, producing a union
    /// of merged records.
    fn intersection(&mut self, id: SchemaId, name: &str) -> DeclaredType {
        let mut base = Flattened::default();
        let mut visited = HashSet::new();
        self.flatten(id, &mut base, &mut visited);

        let Some(alternatives) = base.unions.first().cloned() else {
            return DeclaredType::Record(self.record(name, &base.fields_vec(), &base.required));
        };
        if base.unions.len() > 1 {
            tracing::debug!(name = name, "intersection has several unions; distributing the first");
        }

        let graph = self.graph;
        let mut members = Vec::with_capacity(alternatives.len());
        for (i, alt) in alternatives.iter().enumerate() {
            let label = match &graph[*alt].name {
                Some(component) => component.clone(),
                None => base_name(graph, *alt, &format!("variant {}", i + 1)),
            };
            let variant_name = self.naming.assign_synthetic(&format!("{}{}", name, label));

            let mut merged = Flattened {
                fields: base.fields.clone(),
                required: base.required.clone(),
                unions: Vec::new(),
            };
            let mut alt_visited = visited.clone();
            self.flatten(*alt, &mut merged, &mut alt_visited);

            self.emitted.insert(variant_name.clone());
            self.extra.insert(
                variant_name.clone(),
                DeclaredType::Named(variant_name.clone()),
            );
            let record = self.record(&variant_name, &merged.fields_vec(), &merged.required);
            self.extra
                .insert(variant_name.clone(), DeclaredType::Record(record));
            members.push(DeclaredType::Named(variant_name));
        }
        DeclaredType::Union(members)
    }

    fn flatten(&self, id: SchemaId, acc: &mut Flattened, visited: &mut HashSet<SchemaId>) {
        if !visited.insert(id) {
            return;
        }
        match &self.graph[id].kind {
            SchemaKind::Record { fields, required } => {
                for (k, v) in fields {
                    acc.fields.insert(k.clone(), *v);
                }
                acc.required.extend(required.iter().cloned());
            }
            SchemaKind::Intersection { branches } => {
                for b in branches {
                    self.flatten(*b, acc, visited);
                }
            }
            SchemaKind::Union { branches, .. } => acc.unions.push(branches.clone()),
            SchemaKind::Primitive(_) | SchemaKind::Array { .. } => {
                tracing::debug!(id = %id, "ignoring non-object allOf member");
            }
        }
    }
}

#[derive(Default)]
struct Flattened {
    fields: IndexMap<String, SchemaId>,
    required: IndexSet<String>,
    unions: Vec<Vec<SchemaId>>,
}

impl Flattened {
    fn fields_vec(&self) -> Vec<(String, SchemaId)> {
        self.fields.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

fn scalar_of(p: PrimitiveKind) -> ScalarKind {
    match p {
        PrimitiveKind::String => ScalarKind::String,
        PrimitiveKind::Integer => ScalarKind::Integer,
        PrimitiveKind::Number => ScalarKind::Number,
        PrimitiveKind::Boolean => ScalarKind::Boolean,
    }
}

fn wrap_nullable(ty: DeclaredType, nullable: bool) -> DeclaredType {
    if nullable && !ty.is_nullable() {
        DeclaredType::nullable(ty)
    } else {
        ty
    }
}

/// Maps every component schema of `graph`, followed by the anonymous
/// definitions they pull in.
pub fn map_components(graph: &SchemaGraph, config: MapperConfig) -> TypeModel {
    let mut mapper = TypeMapper::new(graph, config);
    let mut definitions = IndexMap::new();

    for (name, id) in graph.components() {
        let node = &graph[id];
        let body = match node.name.as_deref() {
            // Alias component (`A: {$ref: B}`).
            Some(target) if target != name => DeclaredType::Named(target.to_string()),
            _ => mapper.definition(id, name),
        };
        definitions.insert(name.to_string(), wrap_nullable(body, node.nullable));
    }

    let extra = mapper.finish();
    tracing::debug!(
        components = definitions.len(),
        anonymous = extra.definitions.len(),
        "mapped component schemas"
    );
    for (name, ty) in extra.definitions {
        definitions.entry(name).or_insert(ty);
    }
    TypeModel { definitions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::parse_openapi_document;
    use crate::schema::resolve_schemas;
    use pretty_assertions::assert_eq;

    fn graph_for(yaml: &str) -> SchemaGraph {
        resolve_schemas(&parse_openapi_document(yaml).unwrap()).unwrap()
    }

    const PETS: &str = r#"
openapi: 3.0.0
components:
  schemas:
    Dog:
      type: object
      required: [bark]
      properties:
        bark: {type: boolean}
    Cat:
      type: object
      required: [meow]
      properties:
        meow: {type: boolean}
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Dog'
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
    Owner:
      type: object
      required: [name, nickname]
      properties:
        name: {type: string}
        nickname: {type: string, nullable: true}
        address:
          type: object
          properties:
            street: {type: string}
        pets:
          type: array
          items: {$ref: '#/components/schemas/Pet'}
"#;

    #[test]
    fn test_union_name_joins_branches_without_dedup() {
        let graph = graph_for(PETS);
        let model = map_components(&graph, MapperConfig::default());
        assert_eq!(model.get("Pet").unwrap().type_name(), "Dog|Cat|Dog");
    }

    #[test]
    fn test_record_optionality_and_anonymous_definitions() {
        let graph = graph_for(PETS);
        let model = map_components(&graph, MapperConfig::default());

        let Some(DeclaredType::Record(owner)) = model.get("Owner") else {
            panic!("Owner should be a record");
        };
        assert!(!owner.field("name").unwrap().optional);
        let nickname = owner.field("nickname").unwrap();
        assert!(!nickname.optional);
        assert_eq!(nickname.ty.type_name(), "Option<String>");
        assert_eq!(owner.field("address").unwrap().ty.type_name(), "Address");
        assert!(owner.field("address").unwrap().optional);
        assert_eq!(owner.field("pets").unwrap().ty.type_name(), "Vec<Pet>");

        assert_eq!(
            model.names().collect::<Vec<_>>(),
            vec!["Dog", "Cat", "Pet", "Owner", "Address"]
        );
    }

    #[test]
    fn test_treat_nilable_as_optional() {
        let graph = graph_for(PETS);
        let model = map_components(
            &graph,
            MapperConfig {
                treat_nilable_as_optional: true,
            },
        );
        let Some(DeclaredType::Record(owner)) = model.get("Owner") else {
            panic!("Owner should be a record");
        };
        assert!(owner.field("nickname").unwrap().optional);
        assert!(!owner.field("name").unwrap().optional);
    }

    #[test]
    fn test_anonymous_branch_collides_with_component() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Activity: {type: object, properties: {kind: {type: string}}}
    Profile: {type: object, properties: {id: {type: string}}}
    FeedItem:
      oneOf:
        - $ref: '#/components/schemas/Activity'
        - title: Profile
          type: object
          properties:
            displayName: {type: string}
"#,
        );
        let model = map_components(&graph, MapperConfig::default());
        assert_eq!(
            model.get("FeedItem").unwrap().type_name(),
            "Activity|Profile01"
        );
        assert!(matches!(model.get("Profile01"), Some(DeclaredType::Record(_))));
    }

    #[test]
    fn test_inline_copy_of_component_reuses_it_without_redefinition() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Address:
      type: object
      properties:
        city: {type: string}
    Owner:
      type: object
      properties:
        home:
          title: Address
          type: object
          properties:
            city: {type: string}
"#,
        );
        let owner = graph.component("Owner").unwrap();
        let SchemaKind::Record { fields, .. } = &graph[owner].kind else {
            panic!("Owner should be a record");
        };

        let mut mapper = TypeMapper::new(&graph, MapperConfig::default());
        assert_eq!(
            mapper.map_schema(fields["home"], "home"),
            DeclaredType::named("Address")
        );
        assert_eq!(mapper.finish().definitions.len(), 0);
    }

    #[test]
    fn test_all_of_with_one_of_distributes() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Circle: {type: object, required: [radius], properties: {radius: {type: number}}}
    Square: {type: object, properties: {side: {type: number}}}
    Shape:
      allOf:
        - type: object
          required: [id]
          properties: {id: {type: string}}
      oneOf:
        - $ref: '#/components/schemas/Circle'
        - $ref: '#/components/schemas/Square'
"#,
        );
        let model = map_components(&graph, MapperConfig::default());
        assert_eq!(
            model.get("Shape").unwrap().type_name(),
            "ShapeCircle|ShapeSquare"
        );
        let Some(DeclaredType::Record(circle)) = model.get("ShapeCircle") else {
            panic!("ShapeCircle should be a record");
        };
        let names: Vec<&str> = circle.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "radius"]);
        assert!(!circle.field("radius").unwrap().optional);
    }

    #[test]
    fn test_recursive_component_maps_to_named() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Node:
      type: object
      properties:
        children: {type: array, items: {$ref: '#/components/schemas/Node'}}
"#,
        );
        let model = map_components(&graph, MapperConfig::default());
        let Some(DeclaredType::Record(node)) = model.get("Node") else {
            panic!("Node should be a record");
        };
        assert_eq!(node.fields[0].ty.type_name(), "Vec<Node>");
    }
}
