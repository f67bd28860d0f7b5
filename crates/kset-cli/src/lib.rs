//! kset command line
//!
//! `kset create-setter <RESOURCE> <NAME> [VALUE]` loads a resource file and
//! its registry, runs the create-setter pipeline and writes both files back
//! only if every step succeeded.
//!
//! # Architecture
//!
//! ```text
//! args → discover → read resource / registry / schema / layout
//!      → kset_setters::create_setter → stage(resource, registry) → commit(resource), commit(registry)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod discover;
pub mod persist;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use kset_doc::{DocumentSet, FieldPath};
use kset_setters::{
    create_setter, ConstraintFragment, CreateOutcome, CreateSetterRequest, Registry, RegistryLayout, SetterName,
    SetterType,
};
use std::fs;
use std::path::{Path, PathBuf};

pub use discover::{discover, Inputs, DEFAULT_REGISTRY};
pub use persist::{stage, Staged};

/// Command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("kset")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Create setters in multi-document YAML packages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create-setter")
                .about("Mark a field as a named setter and register its schema")
                .arg(
                    Arg::new("resource")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Resource file, or a directory holding a single resource file"),
                )
                .arg(Arg::new("name").required(true).help("Setter name"))
                .arg(
                    Arg::new("value")
                        .help("Current value of the field, used to find it when --field is not set"),
                )
                .arg(
                    Arg::new("value-flag")
                        .long("value")
                        .value_name("VALUE")
                        .conflicts_with("value")
                        .help("Same as the positional VALUE"),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .help("Setter description"),
                )
                .arg(
                    Arg::new("set-by")
                        .long("set-by")
                        .help("Who set the current value"),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("OpenAPI type of the field; `array` creates a list setter"),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .help("Field path, e.g. spec.containers[0].image or metadata.labels[\"app.kubernetes.io/name\"]"),
                )
                .arg(
                    Arg::new("schema-path")
                        .long("schema-path")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("JSON or YAML file with schema constraints for the setter"),
                )
                .arg(
                    Arg::new("registry")
                        .long("registry")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Registry file (default: Krmfile next to the resource)"),
                )
                .arg(
                    Arg::new("layout")
                        .long("layout")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("YAML file overriding the registry layout"),
                ),
        )
}

/// Arguments of `create-setter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSetterArgs {
    /// Resource file or directory
    pub resource: PathBuf,
    /// Setter name
    pub name: String,
    /// Literal value
    pub value: Option<String>,
    /// Description
    pub description: String,
    /// Provenance
    pub set_by: String,
    /// OpenAPI type name
    pub setter_type: String,
    /// Field path
    pub field: Option<String>,
    /// Constraint file
    pub schema_path: Option<PathBuf>,
    /// Registry file override
    pub registry: Option<PathBuf>,
    /// Registry layout file
    pub layout: Option<PathBuf>,
}

impl CreateSetterArgs {
    /// Read arguments from parsed `create-setter` matches
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned();
        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();
        Self {
            resource: path("resource").unwrap_or_default(),
            name: string("name").unwrap_or_default(),
            value: string("value").or_else(|| string("value-flag")),
            description: string("description").unwrap_or_default(),
            set_by: string("set-by").unwrap_or_default(),
            setter_type: string("type").unwrap_or_default(),
            field: string("field"),
            schema_path: path("schema-path"),
            registry: path("registry"),
            layout: path("layout"),
        }
    }

    /// Build the pipeline request, reading the constraint file if given
    ///
    /// # Errors
    /// Fails on an invalid name, field path or constraint file.
    pub fn request(&self) -> Result<CreateSetterRequest> {
        let mut request = CreateSetterRequest::new(SetterName::new(self.name.as_str())?)
            .with_description(self.description.as_str())
            .with_set_by(self.set_by.as_str())
            .with_type(SetterType::from_type_name(&self.setter_type));

        if let Some(value) = &self.value {
            request = request.with_value(value.as_str());
        }
        if let Some(field) = &self.field {
            let path: FieldPath = field.parse().map_err(kset_setters::SetterError::from)?;
            request = request.with_field(path);
        }
        if let Some(schema) = &self.schema_path {
            let text = read(schema)?;
            let fragment = ConstraintFragment::parse(&text)
                .with_context(|| format!("in schema file {}", schema.display()))?;
            request = request.with_constraints(fragment);
        }
        Ok(request)
    }
}

/// Dispatch parsed command line matches
///
/// # Errors
/// Any failure of the selected subcommand.
pub fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("create-setter", sub)) => {
            create(&CreateSetterArgs::from_matches(sub))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Run create-setter against files on disk
///
/// Nothing is written unless the whole pipeline succeeds. Both outputs are
/// staged next to their targets first; only then is the resource file
/// renamed into place, followed by the registry. A failing registry rename
/// is the one case that leaves the resource marked without its definition.
///
/// # Errors
/// I/O failures and every `SetterError` of the pipeline.
pub fn create(args: &CreateSetterArgs) -> Result<CreateOutcome> {
    let inputs = discover(&args.resource, args.registry.as_deref())?;
    let layout = match &args.layout {
        Some(path) => serde_yaml::from_str::<RegistryLayout>(&read(path)?)
            .with_context(|| format!("invalid layout file {}", path.display()))?,
        None => RegistryLayout::default(),
    };
    let request = args.request()?;

    let resources = DocumentSet::parse(&read(&inputs.resource)?)
        .with_context(|| format!("in resource file {}", inputs.resource.display()))?;
    let registry_text = if inputs.registry.exists() {
        read(&inputs.registry)?
    } else {
        tracing::info!(registry = %inputs.registry.display(), "registry file does not exist, starting empty");
        String::new()
    };
    let registry = Registry::parse(&registry_text, layout)
        .with_context(|| format!("in registry file {}", inputs.registry.display()))?;

    let outcome = create_setter(&request, &resources, &registry)?;

    let resource = stage(&inputs.resource, &outcome.resources.render())?;
    let registry = stage(&inputs.registry, &outcome.registry.render())?;
    resource.commit()?;
    registry.commit()?;
    Ok(outcome)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
