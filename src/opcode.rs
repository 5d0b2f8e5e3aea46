//! Stable operation codes derived from verb + canonical path.
//!
//! Codes feed permission keys and versioned documentation, so they must
//! survive edits to summaries, parameter names, and route-declaration
//! conventions unchanged.

use std::collections::HashMap;

use indexmap::IndexMap;
use md5::{Digest, Md5};

use crate::document::Document;
use crate::error::BuildError;

/// Wildcard replacing path-parameter segments.
const WILDCARD: &str = "*";

/// Canonicalize a path template.
///
/// Parameter segments (`{name}`) become a wildcard, so routes differing
/// only in parameter names canonicalize identically. For `api`-prefixed
/// paths with at least three segments the `api` prefix is dropped and the
/// next two segments swapped, so service-name-first and
/// resource-name-first route conventions produce the same path.
pub fn canonical_path(path: &str) -> String {
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| if s.starts_with('{') { WILDCARD } else { s })
        .collect();
    if segments.len() >= 3 && segments[0] == "api" {
        segments.remove(0);
        segments.swap(0, 1);
    }
    format!("/{}", segments.join("/"))
}

/// Derive the stable short code for one verb + path pair.
///
/// The code is characters 8..24 of the lowercase hex MD5 digest of the
/// upper-cased verb concatenated with the canonical path. Reproducible
/// byte-for-byte across runs.
pub fn operation_code(verb: &str, path: &str) -> String {
    let input = format!("{}{}", verb.to_uppercase(), canonical_path(path));
    let digest = Md5::digest(input.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    hex[8..24].to_string()
}

/// Operation id → code table for a whole document, in operation order.
///
/// # Errors
///
/// Returns `BuildError::DuplicateOperationId` if two operations share an
/// id, or `BuildError::CodeCollision` if two operations hash to the same
/// code; either would silently alias table entries.
pub fn operation_codes(doc: &Document) -> Result<IndexMap<String, String>, BuildError> {
    let mut codes: IndexMap<String, String> = IndexMap::new();
    let mut seen: HashMap<String, String> = HashMap::new();
    for op in &doc.operations {
        if codes.contains_key(&op.id) {
            return Err(BuildError::DuplicateOperationId { id: op.id.clone() });
        }
        let code = operation_code(&op.verb, &op.path);
        if let Some(first) = seen.get(&code) {
            return Err(BuildError::CodeCollision {
                code,
                first: first.clone(),
                second: op.id.clone(),
            });
        }
        seen.insert(code.clone(), op.id.clone());
        codes.insert(op.id.clone(), code);
    }
    Ok(codes)
}
