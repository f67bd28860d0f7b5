//! Input discovery
//!
//! Maps the RESOURCE argument onto a resource file and a registry file.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Registry file name looked up next to the resources
pub const DEFAULT_REGISTRY: &str = "Krmfile";

/// Files one invocation reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// Resource file
    pub resource: PathBuf,
    /// Registry file
    pub registry: PathBuf,
}

/// Resolve the resource and registry paths
///
/// - A directory holds exactly one `*.yaml`/`*.yml` resource file; its
///   registry defaults to `<dir>/Krmfile`.
/// - A file's registry defaults to `Krmfile` in the same directory.
/// - `registry` overrides either default.
///
/// # Errors
/// Fails if `resource` does not exist, or a directory holds no or several
/// candidate files.
pub fn discover(resource: &Path, registry: Option<&Path>) -> Result<Inputs> {
    let metadata = fs::metadata(resource).with_context(|| format!("cannot read {}", resource.display()))?;

    let (resource, dir) = if metadata.is_dir() {
        let file = single_resource(resource, registry)?;
        (file, resource.to_path_buf())
    } else {
        let dir = resource
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        (resource.to_path_buf(), dir)
    };

    let registry = registry.map_or_else(|| dir.join(DEFAULT_REGISTRY), Path::to_path_buf);
    tracing::debug!(resource = %resource.display(), registry = %registry.display(), "discovered inputs");
    Ok(Inputs { resource, registry })
}

fn single_resource(dir: &Path, registry: Option<&Path>) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("cannot list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && is_yaml(&path) && !same_file(&path, registry) {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => bail!("no YAML resource file found in {}", dir.display()),
        1 => Ok(candidates.remove(0)),
        _ => {
            let names: Vec<String> = candidates
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            bail!(
                "{} holds several YAML files ({}), pass the resource file explicitly",
                dir.display(),
                names.join(", ")
            )
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn same_file(path: &Path, other: Option<&Path>) -> bool {
    let Some(other) = other else {
        return false;
    };
    match (fs::canonicalize(path), fs::canonicalize(other)) {
        (Ok(a), Ok(b)) => a == b,
        _ => path == other,
    }
}
