//! The create-setter operation

use crate::annotate::annotate;
use crate::error::SetterError;
use crate::registry::{Registry, Upsert};
use crate::resolve::resolve;
use crate::schema::{synthesize, RegistryEntry};
use crate::types::{CreateSetterRequest, ResolvedField, SetterValue};
use crate::validate::validate;
use kset_doc::DocumentSet;

/// Result of a successful create-setter run
///
/// Inputs are never modified; callers persist `resources` and `registry`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    /// Resources with markers added
    pub resources: DocumentSet,
    /// Registry with the setter entry written
    pub registry: Registry,
    /// Annotated fields, in document order
    pub fields: Vec<ResolvedField>,
    /// Canonical value of the setter
    pub value: SetterValue,
    /// Entry written to the registry
    pub entry: RegistryEntry,
    /// Whether the entry was new or replaced one
    pub upsert: Upsert,
}

/// Create a setter over `resources`, registering it in `registry`
///
/// Runs resolution, validation, the collision check and schema synthesis
/// before touching anything; the edits then happen on copies, so any error
/// leaves both inputs as they were.
///
/// # Errors
/// Any [`SetterError`] from the stages above.
pub fn create_setter(
    request: &CreateSetterRequest,
    resources: &DocumentSet,
    registry: &Registry,
) -> Result<CreateOutcome, SetterError> {
    let name = &request.name;
    let literal = request.value.as_deref();

    let fields = resolve(resources, request.field.as_ref(), literal, request.setter_type)?;
    let value = validate(resources, &fields, request.setter_type, literal)?;
    registry.check_collision(name)?;

    let entry = synthesize(
        name,
        request.constraints.as_ref(),
        &request.description,
        &request.set_by,
        &value,
    );

    let mut registry = registry.clone();
    let upsert = registry.upsert_setter(name, &entry)?;

    let mut resources = resources.clone();
    annotate(&mut resources, &fields, name, registry.layout())?;

    tracing::info!(setter = %name, %value, fields = fields.len(), "created setter");
    Ok(CreateOutcome {
        resources,
        registry,
        fields,
        value,
        entry,
        upsert,
    })
}
