//! End-to-end checks over a petstore contract: naming, parameter mapping,
//! auth configuration and service validation.

use cdd_contract_core::types::describe_parameters;
use cdd_contract_core::{
    map_components, validate, AuthConfigModel, ContractModel, DeclaredParam, DeclaredType,
    HttpMethod, MapperConfig, ParamBinding, ParamLocation, ResourceFunction, ScalarKind,
    ServiceModel, ValidationConfig, ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      parameters:
        - name: x-api-version
          in: header
          required: true
          schema: {type: string}
        - name: limit
          in: query
          schema: {type: integer}
    post:
      operationId: createPet
      tags: [pets]
      requestBody:
        required: true
        content:
          application/json:
            schema: {$ref: '#/components/schemas/Pet'}
  /pets/{petId}:
    get:
      operationId: getPet
      tags: [pets]
      parameters:
        - {name: petId, in: path, required: true, schema: {type: string}}
    delete:
      operationId: deletePet
      tags: [pets]
      parameters:
        - {name: petId, in: path, required: true, schema: {type: string}}
  /feed:
    get:
      operationId: getFeed
      tags: [feed]
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
    Activity:
      type: object
      properties:
        kind: {type: string}
    FeedItem:
      oneOf:
        - $ref: '#/components/schemas/Activity'
        - title: profile
          type: object
          properties:
            displayName: {type: string}
    Notification:
      oneOf:
        - title: profile
          type: object
          properties:
            avatar: {type: string}
        - $ref: '#/components/schemas/Activity'
        - $ref: '#/components/schemas/Activity'
  securitySchemes:
    ApiKeyA:
      type: apiKey
      in: header
      name: X-Api-Key-A
      description: Key for the public API.
    Bearer:
      type: http
      scheme: bearer
    ApiKeyB:
      type: apiKey
      in: query
      name: api_key_b
      description: |
        Key for partner access.
        Issued on request.
"#;

fn contract() -> ContractModel {
    ContractModel::from_yaml_str(PETSTORE).expect("petstore should resolve")
}

fn string() -> DeclaredType {
    DeclaredType::Scalar(ScalarKind::String)
}

#[test]
fn test_union_names_and_collision_suffixes() {
    let contract = contract();
    let model = map_components(&contract.graph, MapperConfig::default());

    assert_eq!(model.get("Pet").unwrap().type_name(), "Dog|Cat");
    assert_eq!(
        model.get("FeedItem").unwrap().type_name(),
        "Activity|Profile"
    );
    // Different shape under the same title, first-encountered order.
    assert_eq!(
        model.get("Notification").unwrap().type_name(),
        "Profile01|Activity|Activity"
    );
    assert!(model.get("Profile").is_some());
    assert!(model.get("Profile01").is_some());
}

#[test]
fn test_header_parameter_descriptor() {
    let params = vec![
        DeclaredParam::new("x\\-api\\-version", ParamBinding::Header, string()),
        DeclaredParam::new(
            "x_trace",
            ParamBinding::Header,
            DeclaredType::nullable(string()),
        )
        .with_rename("x-trace"),
        DeclaredParam::new(
            "x_ids",
            ParamBinding::Header,
            DeclaredType::array(DeclaredType::Scalar(ScalarKind::Integer)),
        ),
    ];

    let strict = describe_parameters(&params, &MapperConfig::default());
    assert_eq!(strict.len(), 2);
    assert_eq!(
        strict[0].to_value(),
        json!({
            "name": "x-api-version",
            "in": "header",
            "required": true,
            "schema": {"type": "string"}
        })
    );
    assert_eq!(strict[0].location, ParamLocation::Header);
    assert!(strict[1].required);
    assert!(strict[1].schema.nullable);

    let lenient = describe_parameters(
        &params,
        &MapperConfig {
            treat_nilable_as_optional: true,
        },
    );
    assert!(!lenient[1].required);
    assert!(lenient[1].schema.nullable);
}

#[test]
fn test_auth_config_from_document() {
    let contract = contract();
    let auth = AuthConfigModel::from_schemes(&contract.security_schemes);

    let record = auth.config_type();
    assert_eq!(record.fields.len(), 2);
    assert_eq!(record.fields[0].name, "api_key_a");
    assert_eq!(record.fields[1].name, "api_key_b");
    assert_eq!(
        record.fields[1].doc.as_deref(),
        Some("Key for partner access.\nIssued on request.\n")
    );
    assert_eq!(
        auth.lookup_table(),
        json!({"X-Api-Key-A": "api_key_a", "api_key_b": "api_key_b"})
    );
    assert_eq!(auth.wiring_statements().len(), 2);
}

#[test]
fn test_validation_end_to_end() {
    let contract = contract();
    let service = ServiceModel::new()
        .with_types_from_source(
            r#"
            /// Declared pet payload.
            pub struct Dog {
                pub name: String,
            }
            "#,
        )
        .unwrap()
        .with_resource(
            ResourceFunction::new("/pets", HttpMethod::Get)
                .with_param(DeclaredParam::new(
                    "x\\-api\\-version",
                    ParamBinding::Header,
                    string(),
                ))
                .with_param(DeclaredParam::new(
                    "limit",
                    ParamBinding::Query,
                    DeclaredType::nullable(DeclaredType::Scalar(ScalarKind::Integer)),
                )),
        )
        .with_resource(
            ResourceFunction::new("/pets", HttpMethod::Post).with_param(DeclaredParam::new(
                "pet",
                ParamBinding::Body,
                DeclaredType::named("Dog"),
            )),
        )
        .with_resource(ResourceFunction::new("/pets/{petId}", HttpMethod::Get).with_param(
            DeclaredParam::new("petId", ParamBinding::Path, string()),
        ))
        .with_resource(ResourceFunction::new("/pets/{id}", HttpMethod::Put));

    let errors = validate(&contract, &service, &ValidationConfig::default());
    assert_eq!(
        errors,
        vec![
            ValidationError::OneOfTypeValidation {
                field_name: "Dog".into(),
                branch_errors: vec![ValidationError::MissingField {
                    field_name: "bark".into()
                }],
            },
            ValidationError::OperationPathMissing {
                path: "/pets/{petId}".into(),
                method: HttpMethod::Delete,
            },
            ValidationError::OperationPathMissing {
                path: "/feed".into(),
                method: HttpMethod::Get,
            },
            ValidationError::ResourcePathMissing {
                path: "/pets/{id}".into(),
                method: HttpMethod::Put,
            },
        ]
    );
}

#[test]
fn test_one_operation_path_missing_per_unimplemented_pair() {
    let contract = contract();
    let service = ServiceModel::new();
    let errors = validate(&contract, &service, &ValidationConfig::default());

    assert_eq!(errors.len(), contract.operations.len());
    for op in &contract.operations {
        let count = errors
            .iter()
            .filter(|e| {
                matches!(e, ValidationError::OperationPathMissing { path, method }
                    if *path == op.path && *method == op.method)
            })
            .count();
        assert_eq!(count, 1, "{} {}", op.method, op.path);
    }
}

#[test]
fn test_selection_policy_from_yaml() {
    let contract = contract();
    let config = ValidationConfig::from_yaml_str(
        r#"
tags: [pets]
excludeOperations: [deletePet, createPet]
"#,
    )
    .unwrap();

    let errors = validate(&contract, &ServiceModel::new(), &config);
    let missing: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        missing,
        vec![
            "operation get /pets is not implemented",
            "operation get /pets/{petId} is not implemented",
        ]
    );
}
