//! OpenAPI client-model compiler.
//!
//! Ingests an OpenAPI-style document (tags, operations, schemas) and builds
//! a typed, cross-linked, cycle-safe model, from which deterministic
//! artifacts are derived: resolved type classifications for code emitters,
//! example payloads, flattened documentation tables, and stable
//! per-operation codes.
//!
//! The build is two-phase: schemas and operations are first constructed
//! verbatim with references held as plain names, then a binding pass links
//! names to schemas, hoists inline enums into named schemas, and collapses
//! alias-marked (`Foo$$Bar`) schema variants onto canonical names. All
//! graph traversals carry per-call visited sets, so self-referential and
//! mutually recursive schemas never loop.
//!
//! # Example
//!
//! ```
//! use oas_model::{operation_code, schema_example, Document};
//! use serde_json::json;
//!
//! let doc = Document::from_value(json!({
//!     "tags": [{"name": "order", "description": "Order"}],
//!     "paths": {
//!         "/api/order/service/get/{id}": {
//!             "get": {
//!                 "tags": ["order"],
//!                 "operationId": "getOrder",
//!                 "parameters": [{
//!                     "name": "id", "in": "path", "required": true,
//!                     "schema": {"type": "integer", "format": "int64"}
//!                 }],
//!                 "responses": {"200": {"content": {"*/*": {
//!                     "schema": {"$ref": "#/components/schemas/Order"}
//!                 }}}}
//!             }
//!         }
//!     },
//!     "components": {"schemas": {
//!         "Order": {
//!             "description": "an order",
//!             "required": ["id"],
//!             "properties": {
//!                 "id": {"type": "integer", "format": "int64"},
//!                 "total": {"type": "number", "format": "double"}
//!             }
//!         }
//!     }}
//! })).unwrap();
//!
//! // Example payloads use fixed literals per format; int64 travels as text.
//! let example = schema_example(&doc, "Order").unwrap();
//! assert_eq!(example, json!({"id": "2", "total": 3.1}));
//!
//! // Operation codes canonicalize the path before hashing, so they are
//! // stable against parameter renames and route-declaration conventions.
//! assert_eq!(
//!     operation_code("get", "/api/order/service/get/{id}"),
//!     operation_code("GET", "/api/order/service/get/{orderId}"),
//! );
//! ```

mod document;
mod error;
mod example;
mod loader;
mod markdown;
mod opcode;
mod resolve;
mod types;

pub use document::{
    DanglingRef, Document, EnumSchema, ObjectSchema, Operation, ParamLocation, Parameter,
    RawDocument, Tag,
};
pub use error::{BuildError, LoadError, RenderError, ResolveError};
pub use example::{example, flattened, schema_example, PropertyMeta};
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use markdown::render_markdown;
pub use opcode::{canonical_path, operation_code, operation_codes};
pub use resolve::{resolve_type, DECIMAL_IMPORT};
pub use types::{
    canonical_name, extract_enum_name, EnumVariant, ResolvedType, TypeCategory, TypeDescriptor,
    ALIAS_MARKER,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
