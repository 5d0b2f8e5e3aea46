//! Core model types shared by the graph builder, the resolver, and the
//! generators.

use serde::Serialize;

/// Separator marking a schema name as a generated variant of a canonical
/// schema, e.g. `Foo$$Bar` is a variant of `Foo`.
pub const ALIAS_MARKER: &str = "$$";

/// Prefix carried by `$ref` values pointing into the document's schema
/// section.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Strip the alias marker from a schema name, leaving the canonical name.
///
/// Names without a marker are returned unchanged.
pub fn canonical_name(name: &str) -> &str {
    match name.find(ALIAS_MARKER) {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Extract an enum name from a description annotation.
///
/// The name is the substring inside the first bracket pair, e.g.
/// `"order state[OrderState]"` yields `OrderState`. Descriptions without a
/// complete, non-empty bracket pair carry no extractable name; such enums
/// stay inline and are never hoisted.
pub fn extract_enum_name(description: Option<&str>) -> Option<String> {
    let after = description?.split_once('[')?.1;
    let name = after.split_once(']')?.0;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// One code/description pair of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVariant {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumVariant {
    /// Parse a raw enum entry of the form `CODE/**text*/`.
    ///
    /// The trailing comment is optional. All `*/` sequences are dropped
    /// before splitting on `/**`.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.trim().replace("*/", "");
        match cleaned.split_once("/**") {
            Some((code, description)) => Self {
                code: code.to_string(),
                description: Some(description.to_string()),
            },
            None => Self {
                code: cleaned,
                description: None,
            },
        }
    }
}

/// One property's declared shape.
///
/// Reference names are weak links: lookup keys into the document's schema
/// map, never ownership edges, so the schema graph may contain cycles
/// without creating ownership cycles. Nested item descriptors are owned
/// transitively.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeDescriptor {
    /// Primitive kind: string, integer, number, boolean, object, array.
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
    /// Format qualifier: int32, int64, float, double, date, date-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Name of the referenced schema, if this descriptor is a reference.
    /// Alias markers are stripped during the binding phase.
    #[serde(skip_serializing_if = "Option::is_none", rename = "$ref")]
    pub reference: Option<String>,
    /// Item descriptor for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name extracted from the description for inline enums.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    /// Inline enumeration values, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "enum")]
    pub variants: Vec<EnumVariant>,
}

/// Code-generation category of a resolved type.
///
/// Closed set: every descriptor the resolver accepts falls into exactly
/// one of these, and downstream emitters branch on nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCategory {
    /// Raw target primitive, used as-is (string, number, boolean, any).
    Primitive,
    /// Target builtin that needs construction (Date).
    Constructed,
    /// Named schema defined in the same document.
    Internal,
    /// Library type used as-is; carries an import requirement.
    External,
    /// Library type that needs construction (Decimal); carries an import.
    ConstructedExternal,
    /// Named enumeration, hoisted from an inline enum.
    Enum,
}

/// Generation-ready classification of one descriptor.
///
/// Pure derived data: recomputed on demand by
/// [`resolve_type`](crate::resolve_type), never stored in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedType {
    pub category: TypeCategory,
    /// Display name in the target representation.
    pub name: String,
    /// Number of array layers wrapping the base type.
    pub array_depth: usize,
    /// Import statement required by the target, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResolvedType {
    /// Display name with array suffixes, e.g. `Order[][]`.
    pub fn display(&self) -> String {
        format!("{}{}", self.name, "[]".repeat(self.array_depth))
    }
}
