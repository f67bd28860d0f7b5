//! Field marker annotation

use crate::config::RegistryLayout;
use crate::error::SetterError;
use crate::types::{ResolvedField, SetterName};
use kset_doc::DocumentSet;

/// Write the marker of setter `name` on the line of every resolved field
///
/// Only the trailing comment of each annotated line changes. An existing
/// comment on that line is replaced. Returns the number of annotated fields.
///
/// # Errors
/// Returns `SetterError::UnsupportedLayout` if a field has no block-style
/// source line to annotate, or if the marker would change a document's
/// parsed content.
pub fn annotate(
    documents: &mut DocumentSet,
    resolved: &[ResolvedField],
    name: &SetterName,
    layout: &RegistryLayout,
) -> Result<usize, SetterError> {
    let marker = layout.marker(name.as_str());
    let mut annotated = 0;

    for field in resolved {
        let document = documents
            .get_mut(field.document)
            .ok_or_else(|| SetterError::not_found(format!("document {}", field.document)))?;
        let previous = document
            .set_line_comment(&field.path, &marker)
            .map_err(SetterError::UnsupportedLayout)?;

        match previous.as_deref().map(|comment| (comment, layout.parse_marker(comment))) {
            Some((_, Some(other))) if other != name.as_str() => {
                tracing::warn!(field = %field, previous = %other, "field was marked for another setter");
            }
            Some((comment, None)) => {
                tracing::warn!(field = %field, comment, "replaced comment on annotated line");
            }
            _ => {}
        }
        annotated += 1;
    }

    tracing::debug!(setter = %name, annotated, "annotated fields");
    Ok(annotated)
}
