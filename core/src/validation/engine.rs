//! # Validation Engine
//!
//! Compares a service model against a resolved contract.
//!
//! Per selected contract operation, in document order:
//! 1. coverage: the (path, method) pair must have a declared resource;
//! 2. parameters: every declared path/query/header parameter must exist in
//!    the contract and be compatible;
//! 3. body: the declared body must fit the contract body schema.
//!
//! Declared resources with no contract operation are reported last, unless
//! an include filter narrows the run.

use crate::declared::model::{ResourceFunction, ServiceModel};
use crate::schema::contract::{ContractModel, ContractOperation};
use crate::validation::body::BodyValidator;
use crate::validation::config::ValidationConfig;
use crate::validation::error::ValidationError;

/// Field name reported when a required contract body is not declared.
pub const REQUEST_BODY_FIELD: &str = "requestBody";

/// Validates `service` against `contract`. Findings are returned in
/// operation-then-field order.
pub fn validate(
    contract: &ContractModel,
    service: &ServiceModel,
    config: &ValidationConfig,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut validator = BodyValidator::new(&contract.graph, service)
        .with_nilable_as_optional(config.treat_nilable_as_optional);

    for op in &contract.operations {
        if !config.is_selected(op) {
            tracing::trace!(path = %op.path, method = %op.method, "operation not selected");
            continue;
        }
        match service.resource(&op.path, op.method) {
            None => errors.push(ValidationError::OperationPathMissing {
                path: op.path.clone(),
                method: op.method,
            }),
            Some(resource) => {
                let before = errors.len();
                validate_operation(&mut validator, op, resource, &mut errors);
                tracing::debug!(
                    path = %op.path,
                    method = %op.method,
                    findings = errors.len() - before,
                    "validated operation"
                );
            }
        }
    }

    if !config.has_include_filter() {
        for resource in &service.resources {
            if contract.operation(&resource.path, resource.method).is_none() {
                errors.push(ValidationError::ResourcePathMissing {
                    path: resource.path.clone(),
                    method: resource.method,
                });
            }
        }
    }

    errors
}

fn validate_operation(
    validator: &mut BodyValidator<'_>,
    op: &ContractOperation,
    resource: &ResourceFunction,
    errors: &mut Vec<ValidationError>,
) {
    for param in resource.non_body_params() {
        let Some(location) = param.binding.location() else {
            continue;
        };
        let name = param.external_name();
        match op.parameter(&name, location) {
            None => errors.push(ValidationError::missing(name)),
            Some(contract_param) => {
                if let Some(schema) = contract_param.schema {
                    errors.extend(validator.check(&param.ty, schema, &name));
                }
            }
        }
    }

    match (resource.body(), &op.request_body) {
        (Some(body), Some(contract_body)) => {
            if let Some(schema) = contract_body.schema {
                errors.extend(validator.check(&body.ty, schema, &body.external_name()));
            }
        }
        (Some(body), None) => errors.push(ValidationError::missing(body.external_name())),
        (None, Some(contract_body)) if contract_body.required => {
            errors.push(ValidationError::missing(REQUEST_BODY_FIELD))
        }
        (None, _) => {}
    }
}
