//! Type resolution: classifies a descriptor into a generation-ready type.

use crate::error::ResolveError;
use crate::types::{canonical_name, ResolvedType, TypeCategory, TypeDescriptor};

/// Import statement carried by the arbitrary-precision decimal type.
pub const DECIMAL_IMPORT: &str = "import Decimal from 'decimal.js';";

/// Classify a descriptor at the given array nesting depth.
///
/// Deterministic and side-effect free. Recursion happens only through
/// array descriptors; each level strips one array layer and increments the
/// depth, so `array<array<integer:int32>>` at depth 0 resolves to a numeric
/// primitive at depth 2.
///
/// # Errors
///
/// Returns `ResolveError::UnsupportedType` when the descriptor matches no
/// classification rule, carrying the offending shape for diagnosis.
pub fn resolve_type(
    descriptor: &TypeDescriptor,
    array_depth: usize,
) -> Result<ResolvedType, ResolveError> {
    let resolved = |category, name: &str, import: Option<&str>| ResolvedType {
        category,
        name: name.to_string(),
        array_depth,
        import: import.map(str::to_string),
        description: descriptor.description.clone(),
    };

    // Arrays resolve through their item. The array's own description wins
    // over the item's.
    if descriptor.kind.as_deref() == Some("array") {
        let Some(items) = descriptor.items.as_deref() else {
            return Err(unsupported(descriptor));
        };
        let mut inner = resolve_type(items, array_depth + 1)?;
        inner.description = descriptor.description.clone();
        return Ok(inner);
    }

    if let Some(enum_name) = &descriptor.enum_name {
        return Ok(resolved(TypeCategory::Enum, enum_name, None));
    }

    match (descriptor.kind.as_deref(), descriptor.format.as_deref()) {
        (Some("integer"), Some("int32")) => {
            Ok(resolved(TypeCategory::Primitive, "number", None))
        }
        // 64-bit integers exceed the target's 53-bit safe integer range,
        // so they travel as text.
        (Some("integer"), Some("int64")) => {
            Ok(resolved(TypeCategory::Primitive, "string", None))
        }
        (Some("number"), Some("float" | "double")) => {
            Ok(resolved(TypeCategory::Primitive, "number", None))
        }
        (Some("number"), _) => Ok(resolved(
            TypeCategory::ConstructedExternal,
            "Decimal",
            Some(DECIMAL_IMPORT),
        )),
        (Some("string"), Some("date" | "date-time")) => {
            Ok(resolved(TypeCategory::Constructed, "Date", None))
        }
        (Some("string"), _) => Ok(resolved(TypeCategory::Primitive, "string", None)),
        (Some("boolean"), _) => Ok(resolved(TypeCategory::Primitive, "boolean", None)),
        _ => {
            if let Some(reference) = &descriptor.reference {
                return Ok(resolved(
                    TypeCategory::Internal,
                    canonical_name(reference),
                    None,
                ));
            }
            if descriptor.kind.as_deref() == Some("object") {
                return Ok(resolved(TypeCategory::Primitive, "any", None));
            }
            Err(unsupported(descriptor))
        }
    }
}

pub(crate) fn unsupported(descriptor: &TypeDescriptor) -> ResolveError {
    ResolveError::UnsupportedType {
        descriptor: serde_json::to_string(descriptor)
            .unwrap_or_else(|_| format!("{descriptor:?}")),
    }
}
