//! Markdown documentation rendered from the resolved model.
//!
//! A thin consumer of the core surface: tags, operations, resolved types,
//! flattened metadata, and example payloads. No resolution logic lives
//! here.

use crate::document::{Document, Operation, Tag};
use crate::error::{RenderError, ResolveError};
use crate::example::{example, flattened};
use crate::resolve::resolve_type;
use crate::types::TypeCategory;

/// Render the whole document as one markdown string: one section per tag,
/// sorted by tag description, operations sorted by id.
///
/// # Errors
///
/// Returns `RenderError` naming the operation whose types failed to
/// resolve; nothing is emitted for a document that fails partway.
pub fn render_markdown(doc: &Document) -> Result<String, RenderError> {
    let mut out: Vec<String> = Vec::new();
    let mut tags: Vec<&Tag> = doc.tags.iter().collect();
    tags.sort_by(|a, b| a.description.cmp(&b.description));
    for tag in tags {
        out.push(format!("## {} {}Service\n", tag.name, tag.description));
        let mut ops: Vec<&Operation> = doc.tag_operations(tag).collect();
        ops.sort_by(|a, b| a.id.cmp(&b.id));
        for op in ops {
            render_operation(doc, op, &mut out).map_err(|source| RenderError {
                context: op.id.clone(),
                source,
            })?;
        }
    }
    Ok(out.join("\n"))
}

fn render_operation(
    doc: &Document,
    op: &Operation,
    out: &mut Vec<String>,
) -> Result<(), ResolveError> {
    out.push(format!(
        "### {} {}\n",
        op.summary.as_deref().unwrap_or(""),
        op.id
    ));
    out.push(format!("**Path:** {}\n", op.path));
    out.push(format!("**Method:** {}\n", op.verb));

    if !op.parameters.is_empty() {
        out.push("**Parameters**\n".to_string());
        out.push("| name | in | type | description | required |".to_string());
        out.push("| --- | --- | --- | --- | --- |".to_string());
        for parameter in &op.parameters {
            let resolved = resolve_type(&parameter.schema, 0)?;
            out.push(format!(
                "| {} | {} | {} | {} | {} |",
                parameter.name,
                parameter.location,
                resolved.display(),
                parameter.description.as_deref().unwrap_or(""),
                parameter.required
            ));
        }
        out.push("\n".to_string());
    }

    if let Some(body) = &op.request_body {
        let resolved = resolve_type(body, 0)?;
        out.push(format!("**Request body** {}\n", resolved.display()));
        if resolved.category == TypeCategory::Internal {
            out.push("| name | description | required | type |".to_string());
            out.push("| --- | --- | --- | --- |".to_string());
            for meta in flattened(doc, &resolved.name)? {
                out.push(format!(
                    "| {}{} | {} | {} | {} |",
                    "&nbsp;".repeat(meta.level * 2),
                    meta.name,
                    meta.description.as_deref().unwrap_or(""),
                    meta.required,
                    meta.resolved.display()
                ));
            }
            out.push("\n".to_string());
        }
        out.push(render_json_block(doc, body)?);
        out.push("\n".to_string());
    }

    if let Some(response) = &op.response {
        let resolved = resolve_type(response, 0)?;
        out.push(format!("**Response** {}\n", resolved.display()));
        if resolved.category == TypeCategory::Internal {
            out.push("| name | description | type |".to_string());
            out.push("| --- | --- | --- |".to_string());
            for meta in flattened(doc, &resolved.name)? {
                out.push(format!(
                    "| {}{} | {} | {} |",
                    "&nbsp;".repeat(meta.level * 4),
                    meta.name,
                    meta.description.as_deref().unwrap_or(""),
                    meta.resolved.display()
                ));
            }
            out.push("\n".to_string());
        }
        out.push(render_json_block(doc, response)?);
        out.push("\n".to_string());
    }

    Ok(())
}

fn render_json_block(
    doc: &Document,
    descriptor: &crate::types::TypeDescriptor,
) -> Result<String, ResolveError> {
    let value = example(doc, descriptor)?;
    let pretty = serde_json::to_string_pretty(&value).unwrap_or_default();
    Ok(format!("```json\n{pretty}\n```"))
}
