//! Testing utilities for the kset workspace
//!
//! Shared fixtures and a throwaway package directory.

#![allow(missing_docs)]

use kset_doc::DocumentSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod fixtures {
    pub const DEPLOYMENT: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx-deployment
spec:
  replicas: 3
";

    pub const SHARED_LISTS: &str = "\
apiVersion: example.com/v1beta1
kind: Example1
spec:
  list:
  - \"a\"
  - \"b\"
  - \"c\"
---
apiVersion: example.com/v1beta1
kind: Example2
spec:
  list:
  - \"a\"
  - \"b\"
  - \"c\"
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx-deployment
  namespace: myspace
spec:
  replicas: 3
  template:
    spec:
      containers:
      - name: sidecar
        image: nginx:1.7.9
      - name: nginx
        image: otherspace/nginx:1.7.9
";

    pub const DIVERGENT_LISTS: &str = "\
apiVersion: example.com/v1beta1
kind: Example
spec:
  list:
  - \"a\"
  - \"b\"
  - \"c\"
---
apiVersion: example.com/v1beta1
kind: Example
spec:
  list:
  - \"c\"
  - \"d\"
";

    pub const EMPTY_REGISTRY: &str = "\
apiVersion: v1alpha1
kind: Example
";

    pub const SUBSTITUTION_REGISTRY: &str = "\
apiVersion: v1alpha1
kind: Example
openAPI:
  definitions:
    io.k8s.cli.substitutions.my-image:
      x-k8s-cli:
        substitution:
          name: my-image
          pattern: something/${my-image-setter}::${my-tag-setter}/nginxotherthing
          values:
          - marker: ${my-image-setter}
            ref: '#/definitions/io.k8s.cli.setters.my-image-setter'
          - marker: ${my-tag-setter}
            ref: '#/definitions/io.k8s.cli.setters.my-tag-setter'
";

    pub const SCHEMA_INTEGER: &str = r#"{"maximum": 10, "type": "integer"}"#;

    pub const SCHEMA_STRING_LIST: &str = r#"{"maxItems": 3, "type": "array", "items": {"type": "string"}}"#;
}

/// Parse a fixture, panicking on invalid YAML
pub fn documents(text: &str) -> DocumentSet {
    DocumentSet::parse(text).unwrap_or_else(|e| panic!("fixture does not parse: {e}"))
}

/// A package directory that is removed on drop
pub struct TempPackage {
    dir: TempDir,
}

impl TempPackage {
    pub fn new() -> io::Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name` and return its path
    pub fn write(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.file(name))
    }

    /// Package with `resources.yaml` and a `Krmfile` registry
    pub fn with_resources(resources: &str, registry: &str) -> io::Result<Self> {
        let package = Self::new()?;
        package.write("resources.yaml", resources)?;
        package.write("Krmfile", registry)?;
        Ok(package)
    }
}
