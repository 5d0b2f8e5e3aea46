//! Document model and schema graph builder.
//!
//! The build is two-phase. Pass 1 constructs tags, operations, and named
//! schemas verbatim from the raw document; every `$ref` is kept as a plain
//! name. Pass 2 (binding) links those names to concrete schemas, after
//! inline enums have been hoisted into named schemas and alias-marked
//! schema names (`Foo$$Bar`) have filled in missing canonical names.
//! Alias-marked names are removed from the public map only once binding is
//! complete.
//!
//! References that fail to bind are recorded, not fatal: they surface
//! either through [`Document::verify`] or at first dereference during
//! example or metadata generation.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BuildError, LoadError};
use crate::types::{
    canonical_name, extract_enum_name, EnumVariant, TypeDescriptor, ALIAS_MARKER,
    SCHEMA_REF_PREFIX,
};

// --- Raw document shapes (the wire format the core consumes) ---

/// Raw document: `{tags, paths: {path: {verb: operation}}, components: {schemas}}`.
#[derive(Debug, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub tags: Vec<RawTag>,
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, RawOperation>>,
    #[serde(default)]
    pub components: RawComponents,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawComponents {
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,
}

#[derive(Debug, Deserialize)]
pub struct RawTag {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One schema fragment: a property shape, optionally with `$ref`, `items`,
/// or an inline enum.
#[derive(Debug, Default, Deserialize)]
pub struct RawShape {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub items: Option<Box<RawShape>>,
    pub description: Option<String>,
    #[serde(rename = "enum", default)]
    pub variants: Vec<String>,
}

/// A named schema: a shape extended with ordered properties and a required
/// list.
#[derive(Debug, Deserialize)]
pub struct RawSchema {
    #[serde(flatten)]
    pub shape: RawShape,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: IndexMap<String, RawShape>,
}

#[derive(Debug, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RawRequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, RawResponse>,
}

#[derive(Debug, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: RawShape,
}

#[derive(Debug, Deserialize)]
pub struct RawRequestBody {
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<RawShape>,
}

/// Where an operation parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    #[serde(other)]
    Other,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Other => write!(f, "other"),
        }
    }
}

impl From<&RawShape> for TypeDescriptor {
    fn from(raw: &RawShape) -> Self {
        let reference = raw
            .reference
            .as_deref()
            .map(|r| r.trim_start_matches(SCHEMA_REF_PREFIX).to_string());
        let (enum_name, variants) = if raw.variants.is_empty() {
            (None, Vec::new())
        } else {
            (
                extract_enum_name(raw.description.as_deref()),
                raw.variants.iter().map(|v| EnumVariant::parse(v)).collect(),
            )
        };
        TypeDescriptor {
            kind: raw.kind.clone(),
            format: raw.format.clone(),
            reference,
            items: raw.items.as_deref().map(|i| Box::new(Self::from(i))),
            description: raw.description.clone(),
            enum_name,
            variants,
        }
    }
}

// --- Cross-linked model ---

/// A named object schema: descriptor plus ordered properties and required
/// set. Identity is its key in the document's schema map.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub descriptor: TypeDescriptor,
    pub required: Vec<String>,
    pub properties: IndexMap<String, TypeDescriptor>,
}

impl ObjectSchema {
    fn from_raw(raw: &RawSchema) -> Self {
        Self {
            descriptor: TypeDescriptor::from(&raw.shape),
            required: raw.required.clone(),
            properties: raw
                .properties
                .iter()
                .map(|(name, shape)| (name.clone(), TypeDescriptor::from(shape)))
                .collect(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.descriptor.description.as_deref()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

/// A named enum schema, hoisted from an inline enumeration.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    pub variants: Vec<EnumVariant>,
    pub description: Option<String>,
}

/// One HTTP method bound to one path.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: String,
    pub summary: Option<String>,
    /// Owning tag names, as declared.
    pub tags: Vec<String>,
    pub verb: String,
    /// Raw path template, parameters in `{braces}`.
    pub path: String,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<TypeDescriptor>,
    pub response: Option<TypeDescriptor>,
}

impl Operation {
    fn from_raw(verb: &str, path: &str, raw: &RawOperation) -> Self {
        let request_body = raw
            .request_body
            .as_ref()
            .and_then(|body| body.content.get("application/json"))
            .and_then(|media| media.schema.as_ref())
            .map(TypeDescriptor::from);
        let response = raw
            .responses
            .get("200")
            .and_then(|r| r.content.get("*/*").or_else(|| r.content.get("application/json")))
            .and_then(|media| media.schema.as_ref())
            .map(TypeDescriptor::from);
        Self {
            id: raw.operation_id.clone(),
            summary: raw.summary.clone(),
            tags: raw.tags.clone(),
            verb: verb.to_string(),
            path: path.to_string(),
            parameters: raw
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    location: p.location,
                    required: p.required,
                    description: p.description.clone(),
                    schema: TypeDescriptor::from(&p.schema),
                })
                .collect(),
            request_body,
            response,
        }
    }

    /// Parameters carried in the path.
    pub fn path_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
    }

    /// Parameters carried in the query string.
    pub fn query_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: TypeDescriptor,
}

/// A named grouping of operations, one per logical service.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub description: String,
    /// Indices into [`Document::operations`], in binding order.
    pub operations: Vec<usize>,
}

/// A reference that failed to bind: where it was declared and what name it
/// tried to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub context: String,
    pub reference: String,
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at {}", self.reference, self.context)
    }
}

/// The cross-linked document: tags, the operation arena, and the canonical
/// schema and enum maps.
///
/// Built once, then treated as read-only by every resolution and
/// generation call. All inter-schema edges are name-keyed lookups into
/// [`Document::schemas`] and [`Document::enums`], so cyclic schemas are
/// representable without ownership cycles.
#[derive(Debug)]
pub struct Document {
    pub tags: Vec<Tag>,
    pub operations: Vec<Operation>,
    pub schemas: IndexMap<String, ObjectSchema>,
    pub enums: IndexMap<String, EnumSchema>,
    dangling: Vec<DanglingRef>,
}

impl Document {
    /// Deserialize a raw JSON value and build the cross-linked model.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidDocument` if the value does not match the
    /// expected document shape. Unresolved references do not fail the
    /// build; see [`Document::verify`].
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        let raw: RawDocument = serde_json::from_value(value)
            .map_err(|source| LoadError::InvalidDocument { source })?;
        Ok(Self::build(raw))
    }

    /// Build the cross-linked model from a parsed raw document.
    pub fn build(raw: RawDocument) -> Self {
        let tags = raw
            .tags
            .iter()
            .map(|t| Tag {
                name: t.name.clone(),
                description: t.description.clone(),
                operations: Vec::new(),
            })
            .collect();

        let mut schemas: IndexMap<String, ObjectSchema> = raw
            .components
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), ObjectSchema::from_raw(schema)))
            .collect();

        let mut operations = Vec::new();
        for (path, verbs) in &raw.paths {
            for (verb, op) in verbs {
                operations.push(Operation::from_raw(verb, path, op));
            }
        }

        // Enum hoisting: every inline enum with an extractable name becomes
        // a shared named schema. First registration wins, so the same name
        // across schemas yields exactly one entry.
        let mut enums = IndexMap::new();
        for schema in schemas.values() {
            for descriptor in schema.properties.values() {
                hoist_enums(descriptor, &mut enums);
            }
        }
        for op in &operations {
            for parameter in &op.parameters {
                hoist_enums(&parameter.schema, &mut enums);
            }
            if let Some(descriptor) = &op.request_body {
                hoist_enums(descriptor, &mut enums);
            }
            if let Some(descriptor) = &op.response {
                hoist_enums(descriptor, &mut enums);
            }
        }

        // Alias promotion: an aliased schema stands in for a missing
        // canonical name so references to the canonical name bind.
        let aliased: Vec<String> = schemas
            .keys()
            .filter(|name| name.contains(ALIAS_MARKER))
            .cloned()
            .collect();
        for name in &aliased {
            let canonical = canonical_name(name).to_string();
            if !schemas.contains_key(&canonical) {
                let promoted = schemas[name].clone();
                schemas.insert(canonical, promoted);
            }
        }

        let mut doc = Document {
            tags,
            operations,
            schemas,
            enums,
            dangling: Vec::new(),
        };
        doc.bind();

        // Aliased names are transient: drop them only after binding, so
        // in-flight lookups against them still worked.
        doc.schemas.retain(|name, _| !name.contains(ALIAS_MARKER));
        doc
    }

    /// Binding pass: link every stored reference name to a concrete schema,
    /// copy target descriptions over reference descriptions, and register
    /// each operation with its owning tags.
    fn bind(&mut self) {
        let mut targets: HashMap<String, Option<String>> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.descriptor.description.clone()))
            .collect();
        for (name, enum_schema) in &self.enums {
            targets
                .entry(name.clone())
                .or_insert_with(|| enum_schema.description.clone());
        }

        let mut dangling = Vec::new();

        for (name, schema) in self.schemas.iter_mut() {
            for (property, descriptor) in schema.properties.iter_mut() {
                let context = format!("{name}.{property}");
                bind_descriptor(descriptor, &targets, &context, &mut dangling);
            }
        }

        for (index, op) in self.operations.iter_mut().enumerate() {
            for tag_name in &op.tags {
                if let Some(tag) = self.tags.iter_mut().find(|t| &t.name == tag_name) {
                    tag.operations.push(index);
                }
            }
            for parameter in op.parameters.iter_mut() {
                let context = format!("{}.{}", op.id, parameter.name);
                bind_descriptor(&mut parameter.schema, &targets, &context, &mut dangling);
            }
            if let Some(descriptor) = op.request_body.as_mut() {
                let context = format!("{}.requestBody", op.id);
                bind_descriptor(descriptor, &targets, &context, &mut dangling);
            }
            if let Some(descriptor) = op.response.as_mut() {
                let context = format!("{}.response", op.id);
                bind_descriptor(descriptor, &targets, &context, &mut dangling);
            }
        }

        self.dangling = dangling;
    }

    /// References recorded as unresolved during binding.
    pub fn dangling(&self) -> &[DanglingRef] {
        &self.dangling
    }

    /// Eagerly check that every reference bound to a schema.
    ///
    /// The build itself records unresolved references without failing, so a
    /// sloppy document can still be partially useful; callers that want
    /// all-or-nothing semantics run this right after building.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnresolvedReferences` listing every dangling
    /// reference with its declaration site.
    pub fn verify(&self) -> Result<(), BuildError> {
        if self.dangling.is_empty() {
            Ok(())
        } else {
            Err(BuildError::UnresolvedReferences {
                refs: self.dangling.clone(),
            })
        }
    }

    /// The operations owned by a tag, in binding order.
    pub fn tag_operations<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a Operation> {
        tag.operations.iter().map(|&index| &self.operations[index])
    }
}

/// Register every extractable inline enum reachable from a descriptor.
fn hoist_enums(descriptor: &TypeDescriptor, enums: &mut IndexMap<String, EnumSchema>) {
    if let Some(name) = &descriptor.enum_name {
        enums.entry(name.clone()).or_insert_with(|| EnumSchema {
            variants: descriptor.variants.clone(),
            description: descriptor.description.clone(),
        });
    }
    if let Some(items) = &descriptor.items {
        hoist_enums(items, enums);
    }
}

/// Bind one descriptor (and its item descriptors) against the target map.
///
/// The stored reference is rewritten to its alias-stripped form. When the
/// target exists its description replaces the inline one, so documentation
/// reflects the referenced type. Lookup failures are recorded, not fatal.
fn bind_descriptor(
    descriptor: &mut TypeDescriptor,
    targets: &HashMap<String, Option<String>>,
    context: &str,
    dangling: &mut Vec<DanglingRef>,
) {
    if let Some(reference) = descriptor.reference.take() {
        let stripped = canonical_name(&reference).to_string();
        match targets.get(&stripped) {
            Some(description) => descriptor.description = description.clone(),
            None => dangling.push(DanglingRef {
                context: context.to_string(),
                reference: stripped.clone(),
            }),
        }
        descriptor.reference = Some(stripped);
    }
    if let Some(items) = descriptor.items.as_mut() {
        bind_descriptor(items, targets, context, dangling);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn schemas_keep_declaration_order() {
        let doc = build(json!({
            "components": {"schemas": {
                "Zebra": {"properties": {"name": {"type": "string"}}},
                "Apple": {"properties": {"name": {"type": "string"}}}
            }}
        }));
        let names: Vec<&String> = doc.schemas.keys().collect();
        assert_eq!(names, ["Zebra", "Apple"]);
    }

    #[test]
    fn reference_prefix_is_stripped_at_construction() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "customer": {"$ref": "#/components/schemas/Customer"}
                }},
                "Customer": {"properties": {"name": {"type": "string"}}}
            }}
        }));
        let customer = &doc.schemas["Order"].properties["customer"];
        assert_eq!(customer.reference.as_deref(), Some("Customer"));
    }

    #[test]
    fn binding_copies_target_description() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "customer": {
                        "$ref": "#/components/schemas/Customer",
                        "description": "inline text"
                    }
                }},
                "Customer": {
                    "description": "a customer account",
                    "properties": {"name": {"type": "string"}}
                }
            }}
        }));
        let customer = &doc.schemas["Order"].properties["customer"];
        assert_eq!(customer.description.as_deref(), Some("a customer account"));
    }

    #[test]
    fn alias_promotion_fills_missing_canonical_name() {
        let doc = build(json!({
            "components": {"schemas": {
                "Foo$$Bar": {"properties": {"id": {"type": "string"}}}
            }}
        }));
        assert!(doc.schemas.contains_key("Foo"));
        assert!(!doc.schemas.keys().any(|n| n.contains("$$")));
    }

    #[test]
    fn alias_promotion_keeps_existing_canonical_schema() {
        let doc = build(json!({
            "components": {"schemas": {
                "Foo": {"properties": {"kept": {"type": "string"}}},
                "Foo$$Bar": {"properties": {"shadowed": {"type": "string"}}}
            }}
        }));
        assert!(doc.schemas["Foo"].properties.contains_key("kept"));
        assert_eq!(doc.schemas.len(), 1);
    }

    #[test]
    fn aliased_reference_binds_to_canonical_schema() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "variant": {"$ref": "#/components/schemas/Foo$$Bar"}
                }},
                "Foo": {
                    "description": "canonical foo",
                    "properties": {"id": {"type": "string"}}
                }
            }}
        }));
        let variant = &doc.schemas["Order"].properties["variant"];
        assert_eq!(variant.reference.as_deref(), Some("Foo"));
        assert_eq!(variant.description.as_deref(), Some("canonical foo"));
        assert!(doc.dangling().is_empty());
    }

    #[test]
    fn enum_hoisting_is_idempotent_across_schemas() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "state": {
                        "type": "string",
                        "description": "order state[OrderState]",
                        "enum": ["NEW", "DONE"]
                    }
                }},
                "Refund": {"properties": {
                    "state": {
                        "type": "string",
                        "description": "refund uses the same states[OrderState]",
                        "enum": ["NEW", "DONE"]
                    }
                }}
            }}
        }));
        assert_eq!(doc.enums.len(), 1);
        let hoisted = &doc.enums["OrderState"];
        assert_eq!(hoisted.variants[0].code, "NEW");
    }

    #[test]
    fn anonymous_enum_stays_inline() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "state": {"type": "string", "enum": ["NEW", "DONE"]}
                }}
            }}
        }));
        assert!(doc.enums.is_empty());
        let state = &doc.schemas["Order"].properties["state"];
        assert_eq!(state.enum_name, None);
        assert_eq!(state.variants.len(), 2);
    }

    #[test]
    fn dangling_reference_is_recorded_not_fatal() {
        let doc = build(json!({
            "components": {"schemas": {
                "Order": {"properties": {
                    "customer": {"$ref": "#/components/schemas/Customer"}
                }}
            }}
        }));
        assert_eq!(doc.dangling().len(), 1);
        assert_eq!(doc.dangling()[0].reference, "Customer");
        assert_eq!(doc.dangling()[0].context, "Order.customer");
        assert!(doc.verify().is_err());
    }

    #[test]
    fn operations_register_against_owning_tags() {
        let doc = build(json!({
            "tags": [
                {"name": "order", "description": "Order"},
                {"name": "admin", "description": "Admin"}
            ],
            "paths": {
                "/api/order/service/list": {
                    "get": {
                        "tags": ["order", "admin"],
                        "operationId": "listOrders",
                        "responses": {}
                    }
                }
            },
            "components": {"schemas": {}}
        }));
        assert_eq!(doc.tags[0].operations, [0]);
        assert_eq!(doc.tags[1].operations, [0]);
        let op = doc.tag_operations(&doc.tags[0]).next().unwrap();
        assert_eq!(op.id, "listOrders");
        assert_eq!(op.verb, "get");
    }

    #[test]
    fn request_body_and_response_descriptors_bind() {
        let doc = build(json!({
            "tags": [{"name": "order", "description": "Order"}],
            "paths": {
                "/api/order/service/create": {
                    "post": {
                        "tags": ["order"],
                        "operationId": "createOrder",
                        "requestBody": {"content": {"application/json": {
                            "schema": {"$ref": "#/components/schemas/Order"}
                        }}},
                        "responses": {"200": {"content": {"*/*": {
                            "schema": {"$ref": "#/components/schemas/Order"}
                        }}}}
                    }
                }
            },
            "components": {"schemas": {
                "Order": {
                    "description": "an order",
                    "properties": {"id": {"type": "string"}}
                }
            }}
        }));
        let op = &doc.operations[0];
        let body = op.request_body.as_ref().unwrap();
        assert_eq!(body.reference.as_deref(), Some("Order"));
        assert_eq!(body.description.as_deref(), Some("an order"));
        let response = op.response.as_ref().unwrap();
        assert_eq!(response.reference.as_deref(), Some("Order"));
    }

    #[test]
    fn parameter_locations_split_path_and_query() {
        let doc = build(json!({
            "tags": [{"name": "order", "description": "Order"}],
            "paths": {
                "/api/order/service/get/{id}": {
                    "get": {
                        "tags": ["order"],
                        "operationId": "getOrder",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true,
                             "schema": {"type": "integer", "format": "int64"}},
                            {"name": "verbose", "in": "query", "required": false,
                             "schema": {"type": "boolean"}}
                        ],
                        "responses": {}
                    }
                }
            },
            "components": {"schemas": {}}
        }));
        let op = &doc.operations[0];
        assert_eq!(op.path_parameters().count(), 1);
        assert_eq!(op.query_parameters().count(), 1);
    }
}
