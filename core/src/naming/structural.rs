//! # Structural Identity
//!
//! Decides whether two graph nodes describe the same shape, so the naming
//! context can hand one name to repeated anonymous schemas.

use crate::schema::graph::{SchemaGraph, SchemaId, SchemaKind};
use std::collections::HashSet;

/// Compares the bodies of `a` and `b`.
///
/// Children that are named components are equal only when they are the same
/// node. Anonymous children are compared recursively. Pairs already under
/// comparison are assumed equal, which terminates on cycles.
pub fn structurally_equal(graph: &SchemaGraph, a: SchemaId, b: SchemaId) -> bool {
    let mut visited = HashSet::new();
    bodies_equal(graph, a, b, &mut visited)
}

fn bodies_equal(
    graph: &SchemaGraph,
    a: SchemaId,
    b: SchemaId,
    visited: &mut HashSet<(SchemaId, SchemaId)>,
) -> bool {
    if a == b || !visited.insert((a, b)) {
        return true;
    }

    let (left, right) = (&graph[a], &graph[b]);
    if left.nullable != right.nullable || left.default != right.default {
        return false;
    }

    match (&left.kind, &right.kind) {
        (SchemaKind::Primitive(x), SchemaKind::Primitive(y)) => x == y,
        (SchemaKind::Array { item: x }, SchemaKind::Array { item: y }) => {
            children_equal(graph, *x, *y, visited)
        }
        (
            SchemaKind::Record {
                fields: fx,
                required: rx,
            },
            SchemaKind::Record {
                fields: fy,
                required: ry,
            },
        ) => {
            fx.len() == fy.len()
                && rx == ry
                && fx.iter().zip(fy.iter()).all(|((nx, cx), (ny, cy))| {
                    nx == ny && children_equal(graph, *cx, *cy, visited)
                })
        }
        (
            SchemaKind::Union {
                branches: bx,
                kind: kx,
            },
            SchemaKind::Union {
                branches: by,
                kind: ky,
            },
        ) => kx == ky && branches_equal(graph, bx, by, visited),
        (SchemaKind::Intersection { branches: bx }, SchemaKind::Intersection { branches: by }) => {
            branches_equal(graph, bx, by, visited)
        }
        _ => false,
    }
}

fn branches_equal(
    graph: &SchemaGraph,
    x: &[SchemaId],
    y: &[SchemaId],
    visited: &mut HashSet<(SchemaId, SchemaId)>,
) -> bool {
    x.len() == y.len()
        && x.iter()
            .zip(y)
            .all(|(a, b)| children_equal(graph, *a, *b, visited))
}

fn children_equal(
    graph: &SchemaGraph,
    a: SchemaId,
    b: SchemaId,
    visited: &mut HashSet<(SchemaId, SchemaId)>,
) -> bool {
    if graph[a].name.is_some() || graph[b].name.is_some() {
        return a == b;
    }
    bodies_equal(graph, a, b, visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::parse_openapi_document;
    use crate::schema::resolve_schemas;

    fn graph_for(yaml: &str) -> SchemaGraph {
        resolve_schemas(&parse_openapi_document(yaml).unwrap()).unwrap()
    }

    fn field(graph: &SchemaGraph, component: &str, name: &str) -> SchemaId {
        match &graph[graph.component(component).unwrap()].kind {
            SchemaKind::Record { fields, .. } => fields[name],
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_inline_records_are_equal() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Owner: {type: object, properties: {id: {type: string}}}
    A:
      type: object
      properties:
        meta: {type: object, properties: {owner: {$ref: '#/components/schemas/Owner'}}}
    B:
      type: object
      properties:
        meta: {type: object, properties: {owner: {$ref: '#/components/schemas/Owner'}}}
    C:
      type: object
      properties:
        meta: {type: object, properties: {owner: {type: object, properties: {id: {type: string}}}}}
"#,
        );
        let a = field(&graph, "A", "meta");
        let b = field(&graph, "B", "meta");
        let c = field(&graph, "C", "meta");
        assert!(structurally_equal(&graph, a, b));
        // Named child vs anonymous child with the same body differ.
        assert!(!structurally_equal(&graph, a, c));
    }

    #[test]
    fn test_top_level_named_nodes_compare_bodies() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Left: {type: object, properties: {x: {type: integer}}}
    Right: {type: object, properties: {x: {type: integer}}}
    Other: {type: object, properties: {x: {type: string}}}
"#,
        );
        let left = graph.component("Left").unwrap();
        let right = graph.component("Right").unwrap();
        let other = graph.component("Other").unwrap();
        assert!(structurally_equal(&graph, left, right));
        assert!(!structurally_equal(&graph, left, other));
    }

    #[test]
    fn test_recursive_shapes_terminate() {
        let graph = graph_for(
            r#"
openapi: 3.0.0
components:
  schemas:
    Tree:
      type: object
      properties:
        children: {type: array, items: {$ref: '#/components/schemas/Tree'}}
    Forest:
      type: object
      properties:
        children: {type: array, items: {$ref: '#/components/schemas/Forest'}}
"#,
        );
        let tree = graph.component("Tree").unwrap();
        let forest = graph.component("Forest").unwrap();
        // Different named children.
        assert!(!structurally_equal(&graph, tree, forest));
        assert!(structurally_equal(&graph, tree, tree));
    }
}
