//! Example payloads and flattened documentation metadata.
//!
//! Both traversals carry a visited set of reference names scoped to one
//! top-level call. Revisiting a name within a call chain is the cycle
//! termination signal, not an error, so self-referential schemas produce
//! finite output. Independent calls over the same document never share
//! state.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::ResolveError;
use crate::resolve::{resolve_type, unsupported};
use crate::types::{ResolvedType, TypeCategory, TypeDescriptor};

/// One flattened documentation record: a property and where it sits in the
/// expansion.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyMeta {
    /// Indentation level: 0 for the root schema's own properties.
    pub level: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub resolved: ResolvedType,
}

/// Representative example value for a named schema.
///
/// The schema's own name counts as visited, so a self-referential schema
/// collapses to an empty placeholder at its first re-entry:
/// `Node { children: array<Node> }` yields `{"children": [{}]}`.
///
/// # Errors
///
/// Fails with `ResolveError::DanglingReference` if the name (or any
/// reference reached from it) has no schema, or `UnsupportedType` for a
/// property outside the classification rules.
pub fn schema_example(doc: &Document, name: &str) -> Result<Value, ResolveError> {
    let mut visited = HashSet::new();
    visited.insert(name.to_string());
    object_example(doc, name, &mut visited)
}

/// Representative example value for one descriptor.
///
/// Primitives map to fixed literals per format, enums to their first
/// declared code, arrays to a single-element list, references to the
/// target schema's example (or an empty placeholder once visited).
///
/// # Errors
///
/// Same failure modes as [`schema_example`].
pub fn example(doc: &Document, descriptor: &TypeDescriptor) -> Result<Value, ResolveError> {
    example_inner(doc, descriptor, &mut HashSet::new())
}

fn example_inner(
    doc: &Document,
    descriptor: &TypeDescriptor,
    visited: &mut HashSet<String>,
) -> Result<Value, ResolveError> {
    if descriptor.enum_name.is_some() {
        return Ok(first_code(&descriptor.variants));
    }

    match (descriptor.kind.as_deref(), descriptor.format.as_deref()) {
        (Some("integer"), Some("int32")) => return Ok(Value::from(1)),
        (Some("integer"), Some("int64")) => return Ok(Value::from("2")),
        (Some("number"), Some("float" | "double")) => return Ok(Value::from(3.1)),
        (Some("number"), _) => return Ok(Value::from(5.1)),
        (Some("string"), Some("date")) => return Ok(Value::from("2020-01-01")),
        (Some("string"), Some("date-time")) => return Ok(Value::from("2020-01-01 01:02:03")),
        (Some("string"), _) => return Ok(Value::from("example")),
        (Some("boolean"), _) => return Ok(Value::from(true)),
        _ => {}
    }

    if let Some(reference) = &descriptor.reference {
        if visited.contains(reference) {
            return Ok(Value::Object(Map::new()));
        }
        visited.insert(reference.clone());
        if doc.schemas.contains_key(reference) {
            return object_example(doc, reference, visited);
        }
        if let Some(enum_schema) = doc.enums.get(reference) {
            return Ok(first_code(&enum_schema.variants));
        }
        return Err(ResolveError::DanglingReference {
            reference: reference.clone(),
        });
    }

    match descriptor.kind.as_deref() {
        Some("object") => Ok(Value::Object(Map::new())),
        Some("array") => {
            let Some(items) = descriptor.items.as_deref() else {
                return Err(unsupported(descriptor));
            };
            Ok(Value::Array(vec![example_inner(doc, items, visited)?]))
        }
        _ => Err(unsupported(descriptor)),
    }
}

fn object_example(
    doc: &Document,
    name: &str,
    visited: &mut HashSet<String>,
) -> Result<Value, ResolveError> {
    let Some(schema) = doc.schemas.get(name) else {
        return Err(ResolveError::DanglingReference {
            reference: name.to_string(),
        });
    };
    let mut map = Map::new();
    for (property, descriptor) in &schema.properties {
        map.insert(property.clone(), example_inner(doc, descriptor, visited)?);
    }
    Ok(Value::Object(map))
}

fn first_code(variants: &[crate::types::EnumVariant]) -> Value {
    variants
        .first()
        .map(|v| Value::from(v.code.clone()))
        .unwrap_or(Value::Null)
}

/// Flattened property listing for documentation tables.
///
/// Depth-first, pre-order: each property in declaration order produces one
/// record; an internal reference not yet visited in this call expands its
/// target's records directly below at `level + 1`. Arrays descend through
/// item descriptors until a reference is found.
///
/// # Errors
///
/// Same failure modes as [`schema_example`].
pub fn flattened(doc: &Document, name: &str) -> Result<Vec<PropertyMeta>, ResolveError> {
    let mut visited = HashSet::new();
    let mut records = Vec::new();
    flatten_into(doc, name, 0, &mut visited, &mut records)?;
    Ok(records)
}

fn flatten_into(
    doc: &Document,
    name: &str,
    level: usize,
    visited: &mut HashSet<String>,
    records: &mut Vec<PropertyMeta>,
) -> Result<(), ResolveError> {
    let Some(schema) = doc.schemas.get(name) else {
        return Err(ResolveError::DanglingReference {
            reference: name.to_string(),
        });
    };
    for (property, descriptor) in &schema.properties {
        let resolved = resolve_type(descriptor, 0)?;
        let expand = resolved.category == TypeCategory::Internal
            && !visited.contains(&resolved.name);
        let target = resolved.name.clone();
        let is_array = resolved.array_depth > 0;
        records.push(PropertyMeta {
            level,
            name: property.clone(),
            description: descriptor.description.clone(),
            required: schema.is_required(property),
            resolved,
        });
        if expand {
            visited.insert(target.clone());
            let expansion = if is_array {
                // Descend through nested item descriptors until the
                // reference is found; arrays of primitives never get here.
                let mut item = descriptor.items.as_deref();
                while let Some(inner) = item {
                    if inner.reference.is_some() {
                        break;
                    }
                    item = inner.items.as_deref();
                }
                item.and_then(|i| i.reference.clone())
            } else {
                Some(target)
            };
            // References bound to hoisted enums have no properties to list.
            if let Some(reference) = expansion {
                if !doc.enums.contains_key(&reference) {
                    flatten_into(doc, &reference, level + 1, visited, records)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn descriptor(kind: &str, format: Option<&str>) -> TypeDescriptor {
        TypeDescriptor {
            kind: Some(kind.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    fn empty_doc() -> Document {
        build(json!({"components": {"schemas": {}}}))
    }

    #[test]
    fn primitive_example_literals() {
        let doc = empty_doc();
        let cases = [
            (descriptor("integer", Some("int32")), json!(1)),
            (descriptor("integer", Some("int64")), json!("2")),
            (descriptor("number", Some("float")), json!(3.1)),
            (descriptor("number", Some("double")), json!(3.1)),
            (descriptor("number", None), json!(5.1)),
            (descriptor("string", Some("date")), json!("2020-01-01")),
            (
                descriptor("string", Some("date-time")),
                json!("2020-01-01 01:02:03"),
            ),
            (descriptor("string", None), json!("example")),
            (descriptor("boolean", None), json!(true)),
            (descriptor("object", None), json!({})),
        ];
        for (input, expected) in cases {
            assert_eq!(example(&doc, &input).unwrap(), expected);
        }
    }

    #[test]
    fn enum_example_is_first_code() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "state": {
                        "type": "string",
                        "description": "state[OrderState]",
                        "enum": ["NEW/**fresh*/", "DONE"]
                    }
                }}
            }}
        }));
        assert_eq!(
            schema_example(&doc, "Order").unwrap(),
            json!({"state": "NEW"})
        );
    }

    #[test]
    fn array_example_is_single_element() {
        let doc = empty_doc();
        let array = TypeDescriptor {
            kind: Some("array".to_string()),
            items: Some(Box::new(descriptor("integer", Some("int32")))),
            ..Default::default()
        };
        assert_eq!(example(&doc, &array).unwrap(), json!([1]));
    }

    #[test]
    fn self_referential_schema_terminates() {
        let doc = build(json!({
            "components": {"schemas": {
                "Node": {"properties": {
                    "children": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Node"}
                    }
                }}
            }}
        }));
        assert_eq!(
            schema_example(&doc, "Node").unwrap(),
            json!({"children": [{}]})
        );
    }

    #[test]
    fn mutually_recursive_schemas_terminate() {
        let doc = build(json!({
            "components": {"schemas": {
                "A": {"properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }}
        }));
        assert_eq!(schema_example(&doc, "A").unwrap(), json!({"b": {"a": {}}}));
    }

    #[test]
    fn independent_calls_do_not_share_visited_state() {
        let doc = build(json!({
            "components": {"schemas": {
                "Node": {"properties": {
                    "children": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Node"}
                    }
                }}
            }}
        }));
        let first = schema_example(&doc, "Node").unwrap();
        let second = schema_example(&doc, "Node").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_reference_fails_at_first_use() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "customer": {"$ref": "#/components/schemas/Customer"}
                }}
            }}
        }));
        let err = schema_example(&doc, "Order").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::DanglingReference { reference } if reference == "Customer"
        ));
    }

    #[test]
    fn flattened_marks_required_in_declaration_order() {
        let doc = build(json!({
            "components": {"schemas": {
                "Person": {
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "age": {"type": "integer", "format": "int32"}
                    }
                }
            }}
        }));
        let records = flattened(&doc, "Person").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].name.as_str(), records[0].required), ("name", true));
        assert_eq!((records[1].name.as_str(), records[1].required), ("age", false));
        assert_eq!(records[0].level, 0);
    }

    #[test]
    fn flattened_expands_internal_references_one_level_deeper() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "id": {"type": "string"},
                    "customer": {"$ref": "#/components/schemas/Customer"}
                }},
                "Customer": {"properties": {
                    "name": {"type": "string"}
                }}
            }}
        }));
        let records = flattened(&doc, "Order").unwrap();
        let summary: Vec<(usize, &str)> = records
            .iter()
            .map(|r| (r.level, r.name.as_str()))
            .collect();
        assert_eq!(summary, [(0, "id"), (0, "customer"), (1, "name")]);
    }

    #[test]
    fn flattened_descends_arrays_to_the_referenced_schema() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "lines": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Line"}
                    }
                }},
                "Line": {"properties": {
                    "sku": {"type": "string"}
                }}
            }}
        }));
        let records = flattened(&doc, "Order").unwrap();
        assert_eq!(records[0].resolved.array_depth, 1);
        assert_eq!(records[0].resolved.name, "Line");
        assert_eq!((records[1].level, records[1].name.as_str()), (1, "sku"));
    }

    #[test]
    fn flattened_visits_each_reference_once_per_call() {
        let doc = build(json!({
            "components": {"schemas": {
                "Node": {"properties": {
                    "children": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Node"}
                    }
                }}
            }}
        }));
        let records = flattened(&doc, "Node").unwrap();
        // Root expands once; the nested visit sees Node already visited.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, 0);
        assert_eq!(records[1].level, 1);
    }
}
