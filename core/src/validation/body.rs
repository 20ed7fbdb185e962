//! # Structural Body Validation
//!
//! Depth-first comparison of a declared type against a contract schema.
//! Nullability is ignored on both sides. Named declared types are resolved
//! through the service model; active-path sets keyed by (schema node,
//! declared type name) stop recursion on cyclic schemas, including cycles
//! that run only through `oneOf`/`anyOf`/`allOf` branches.

use crate::declared::model::{DeclaredType, ScalarKind, ServiceModel};
use crate::schema::graph::{PrimitiveKind, SchemaGraph, SchemaId, SchemaKind};
use crate::validation::error::ValidationError;
use std::collections::HashSet;

/// Compares declared types against nodes of one schema graph.
pub struct BodyValidator<'a> {
    graph: &'a SchemaGraph,
    service: &'a ServiceModel,
    active: HashSet<(SchemaId, String)>,
    composing: HashSet<(SchemaId, String)>,
    nilable_as_optional: bool,
}

impl<'a> BodyValidator<'a> {
    /// A validator over `graph`, resolving named types through `service`.
    pub fn new(graph: &'a SchemaGraph, service: &'a ServiceModel) -> Self {
        Self {
            graph,
            service,
            active: HashSet::new(),
            composing: HashSet::new(),
            nilable_as_optional: false,
        }
    }

    /// A required contract field whose schema is nullable may be left out of
    /// the declared record.
    pub fn with_nilable_as_optional(mut self, enabled: bool) -> Self {
        self.nilable_as_optional = enabled;
        self
    }

    /// All findings for `declared` against `schema`; empty when compatible.
    pub fn check(
        &mut self,
        declared: &DeclaredType,
        schema: SchemaId,
        field_name: &str,
    ) -> Vec<ValidationError> {
        match declared.strip_nullable() {
            DeclaredType::Named(name) => self.check_named(name, schema, field_name),
            other => self.check_resolved(other, None, schema, field_name),
        }
    }

    fn check_named(
        &mut self,
        name: &str,
        schema: SchemaId,
        field_name: &str,
    ) -> Vec<ValidationError> {
        let service = self.service;
        let Some(definition) = service.lookup(name) else {
            // Opaque type: only the component of the same name is accepted.
            return if self.graph[schema].name.as_deref() == Some(name) {
                Vec::new()
            } else {
                vec![ValidationError::mismatch(
                    field_name,
                    self.graph.describe(schema),
                    name,
                )]
            };
        };

        let key = (schema, name.to_string());
        if !self.active.insert(key.clone()) {
            tracing::trace!(type_name = name, schema = %schema, "cycle in body validation");
            return Vec::new();
        }
        let errors = match definition.strip_nullable() {
            DeclaredType::Named(alias) if alias != name => {
                self.check_named(alias, schema, field_name)
            }
            DeclaredType::Named(_) => Vec::new(),
            resolved => self.check_resolved(resolved, Some(name), schema, field_name),
        };
        self.active.remove(&key);
        errors
    }

    /// `declared` is neither `Named` nor `Nullable`. `own_name` is the name it
    /// was reached through, if any.
    fn check_resolved(
        &mut self,
        declared: &DeclaredType,
        own_name: Option<&str>,
        schema: SchemaId,
        field_name: &str,
    ) -> Vec<ValidationError> {
        // Every alternative of a declared union must fit the whole node.
        if let DeclaredType::Union(members) = declared {
            return members
                .iter()
                .flat_map(|m| self.check(m, schema, field_name))
                .collect();
        }

        let graph = self.graph;
        let kind = &graph[schema].kind;
        if !matches!(
            kind,
            SchemaKind::Union { .. } | SchemaKind::Intersection { .. }
        ) {
            return self.check_shape(declared, own_name, schema, kind, field_name);
        }

        let key = (
            schema,
            own_name
                .map(str::to_string)
                .unwrap_or_else(|| declared.type_name()),
        );
        if !self.composing.insert(key.clone()) {
            tracing::trace!(schema = %schema, "cycle through composed schemas");
            return Vec::new();
        }
        let errors = match kind {
            SchemaKind::Union { branches, .. } => {
                self.check_union(declared, own_name, branches, field_name)
            }
            SchemaKind::Intersection { branches } => branches
                .iter()
                .flat_map(|b| self.check_resolved(declared, own_name, *b, field_name))
                .collect(),
            _ => Vec::new(),
        };
        self.composing.remove(&key);
        errors
    }

    /// First matching branch wins; otherwise the errors of the first branch.
    fn check_union(
        &mut self,
        declared: &DeclaredType,
        own_name: Option<&str>,
        branches: &[SchemaId],
        field_name: &str,
    ) -> Vec<ValidationError> {
        let mut first_errors = None;
        for (i, branch) in branches.iter().enumerate() {
            let errors = self.check_resolved(declared, own_name, *branch, field_name);
            if errors.is_empty() {
                tracing::trace!(branch = i, field = field_name, "union branch matched");
                return Vec::new();
            }
            if first_errors.is_none() {
                first_errors = Some(errors);
            }
        }
        let label = own_name
            .map(str::to_string)
            .or_else(|| match declared {
                DeclaredType::Record(record) => Some(record.name.clone()),
                _ => None,
            })
            .unwrap_or_else(|| field_name.to_string());
        vec![ValidationError::OneOfTypeValidation {
            field_name: label,
            branch_errors: first_errors.unwrap_or_default(),
        }]
    }

    fn check_shape(
        &mut self,
        declared: &DeclaredType,
        own_name: Option<&str>,
        schema: SchemaId,
        kind: &SchemaKind,
        field_name: &str,
    ) -> Vec<ValidationError> {
        let mismatch = |graph: &SchemaGraph| {
            vec![ValidationError::mismatch(
                field_name,
                graph.describe(schema),
                own_name
                    .map(str::to_string)
                    .unwrap_or_else(|| declared.type_name()),
            )]
        };

        match (declared, kind) {
            (DeclaredType::Scalar(s), SchemaKind::Primitive(p)) => {
                if scalar_fits(*s, *p) {
                    Vec::new()
                } else {
                    mismatch(self.graph)
                }
            }
            (DeclaredType::Array(item), SchemaKind::Array { item: schema_item }) => {
                self.check(item, *schema_item, field_name)
            }
            (DeclaredType::Record(record), SchemaKind::Record { fields, required }) => {
                let mut errors = Vec::new();
                for (name, field_schema) in fields {
                    match record.field(name) {
                        Some(field) => errors.extend(self.check(&field.ty, *field_schema, name)),
                        None if required.contains(name)
                            && !(self.nilable_as_optional
                                && self.graph[*field_schema].nullable) =>
                        {
                            errors.push(ValidationError::missing(name.clone()))
                        }
                        None => {}
                    }
                }
                // Required names without a property schema still need a field.
                for name in required.iter().filter(|r| !fields.contains_key(*r)) {
                    if record.field(name).is_none() {
                        errors.push(ValidationError::missing(name.clone()));
                    }
                }
                errors
            }
            _ => mismatch(self.graph),
        }
    }
}

fn scalar_fits(declared: ScalarKind, contract: PrimitiveKind) -> bool {
    matches!(
        (declared, contract),
        (ScalarKind::String, PrimitiveKind::String)
            | (ScalarKind::Integer, PrimitiveKind::Integer)
            | (ScalarKind::Integer, PrimitiveKind::Number)
            | (ScalarKind::Number, PrimitiveKind::Number)
            | (ScalarKind::Boolean, PrimitiveKind::Boolean)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declared::model::{RecordField, RecordType};
    use crate::oas::parse_openapi_document;
    use crate::schema::resolve_schemas;
    use pretty_assertions::assert_eq;

    fn graph_for(yaml: &str) -> SchemaGraph {
        resolve_schemas(&parse_openapi_document(yaml).unwrap()).unwrap()
    }

    fn string() -> DeclaredType {
        DeclaredType::Scalar(ScalarKind::String)
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
        name: {type: string}
    Cat:
      type: object
      required: [meow]
      properties:
        meow: {type: boolean}
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Dog'
        - $ref: '#/components/schemas/Cat'
    Node:
      type: object
      required: [value]
      properties:
        value: {type: integer}
        next: {$ref: '#/components/schemas/Node'}
"#;

    #[test]
    fn test_one_of_anchored_to_first_branch() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new().with_record(RecordType::new(
            "Dog",
            vec![RecordField::required("name", string())],
        ));
        let mut validator = BodyValidator::new(&graph, &service);

        let errors = validator.check(
            &DeclaredType::named("Dog"),
            graph.component("Pet").unwrap(),
            "pet",
        );
        assert_eq!(
            errors,
            vec![ValidationError::OneOfTypeValidation {
                field_name: "Dog".into(),
                branch_errors: vec![ValidationError::missing("bark")],
            }]
        );
    }

    #[test]
    fn test_second_branch_match_is_silent() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new().with_record(RecordType::new(
            "Kitty",
            vec![RecordField::required(
                "meow",
                DeclaredType::Scalar(ScalarKind::Boolean),
            )],
        ));
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::named("Kitty"),
            graph.component("Pet").unwrap(),
            "pet",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_sibling_fields_all_reported() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new().with_record(RecordType::new(
            "DogDto",
            vec![RecordField::required(
                "name",
                DeclaredType::Scalar(ScalarKind::Integer),
            )],
        ));
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::named("DogDto"),
            graph.component("Dog").unwrap(),
            "dog",
        );
        assert_eq!(
            errors,
            vec![
                ValidationError::missing("bark"),
                ValidationError::mismatch("name", "string", "i64"),
            ]
        );
    }

    #[test]
    fn test_recursive_schema_terminates() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new().with_record(RecordType::new(
            "ListNode",
            vec![
                RecordField::required("value", DeclaredType::Scalar(ScalarKind::Integer)),
                RecordField::optional(
                    "next",
                    DeclaredType::nullable(DeclaredType::named("ListNode")),
                ),
            ],
        ));
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::named("ListNode"),
            graph.component("Node").unwrap(),
            "node",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_mutual_all_of_cycle_terminates() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    A:
      allOf:
        - $ref: '#/components/schemas/B'
    B:
      allOf:
        - $ref: '#/components/schemas/A'
"#,
        );
        let service = ServiceModel::new().with_record(RecordType::new(
            "ADto",
            vec![RecordField::required("id", string())],
        ));
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::named("ADto"),
            graph.component("A").unwrap(),
            "a",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_declared_union_matches_one_of_per_member() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new()
            .with_record(RecordType::new(
                "Dog",
                vec![RecordField::required(
                    "bark",
                    DeclaredType::Scalar(ScalarKind::Boolean),
                )],
            ))
            .with_record(RecordType::new(
                "Cat",
                vec![RecordField::required(
                    "meow",
                    DeclaredType::Scalar(ScalarKind::Boolean),
                )],
            ))
            .with_type(
                "Pet",
                DeclaredType::Union(vec![DeclaredType::named("Dog"), DeclaredType::named("Cat")]),
            );
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::named("Pet"),
            graph.component("Pet").unwrap(),
            "pet",
        );
        assert_eq!(errors, Vec::new());
    }

    #[test]
    fn test_declared_union_reports_each_failing_member() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new().with_record(RecordType::new(
            "Dog",
            vec![RecordField::required(
                "bark",
                DeclaredType::Scalar(ScalarKind::Boolean),
            )],
        ));
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(
            &DeclaredType::Union(vec![DeclaredType::named("Dog"), string()]),
            graph.component("Dog").unwrap(),
            "pet",
        );
        assert_eq!(errors, vec![ValidationError::mismatch("pet", "Dog", "String")]);
    }

    #[test]
    fn test_nullable_required_field_may_be_omitted() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Owner:
      type: object
      required: [name, nickname]
      properties:
        name: {type: string}
        nickname: {type: string, nullable: true}
"#,
        );
        let service = ServiceModel::new().with_record(RecordType::new(
            "OwnerDto",
            vec![RecordField::required("name", string())],
        ));
        let owner = graph.component("Owner").unwrap();
        let dto = DeclaredType::named("OwnerDto");

        let mut strict = BodyValidator::new(&graph, &service);
        assert_eq!(
            strict.check(&dto, owner, "owner"),
            vec![ValidationError::missing("nickname")]
        );

        let mut lenient = BodyValidator::new(&graph, &service).with_nilable_as_optional(true);
        assert!(lenient.check(&dto, owner, "owner").is_empty());
    }

    #[test]
    fn test_primitive_vs_record_mismatch() {
        let graph = graph_for(PETS);
        let service = ServiceModel::new();
        let mut validator = BodyValidator::new(&graph, &service);
        let errors = validator.check(&string(), graph.component("Dog").unwrap(), "dog");
        assert_eq!(errors, vec![ValidationError::mismatch("dog", "Dog", "String")]);

        let errors = validator.check(
            &DeclaredType::array(string()),
            graph.component("Dog").unwrap(),
            "dogs",
        );
        assert_eq!(
            errors,
            vec![ValidationError::mismatch("dogs", "Dog", "Vec<String>")]
        );
    }
}
