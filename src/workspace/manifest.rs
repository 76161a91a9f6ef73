use crate::domain::{DependencyKind, Package, VersionSpecifier};
use crate::error::{ChangelogError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "package.json";

/// The fields of `package.json` this tool reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
    pub workspaces: Option<WorkspacesField>,
}

/// `workspaces` is either a list of globs or `{ "packages": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WorkspacesField {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl WorkspacesField {
    pub fn patterns(&self) -> &[String] {
        match self {
            WorkspacesField::List(patterns) => patterns,
            WorkspacesField::Object { packages } => packages,
        }
    }
}

pub(crate) fn read_manifest_file(path: &Path) -> Result<PackageManifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        ChangelogError::manifest(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| ChangelogError::manifest(format!("{}: {}", path.display(), e)))
}

/// Read the member manifest in `dir` into a [Package]
pub fn read_package(dir: &Path, relative_path: &str) -> Result<Package> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = read_manifest_file(&manifest_path)?;

    let name = manifest.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
        ChangelogError::manifest(format!("{} has no package name", manifest_path.display()))
    })?;
    let version = manifest.version.unwrap_or_else(|| {
        tracing::debug!(package = %name, "manifest has no version, assuming 0.0.0");
        "0.0.0".to_string()
    });

    let mut package = Package::new(name, version, dir, relative_path);
    for (kind, table) in [
        (DependencyKind::Runtime, manifest.dependencies),
        (DependencyKind::Dev, manifest.dev_dependencies),
        (DependencyKind::Peer, manifest.peer_dependencies),
    ] {
        let target = package.dependency_table_mut(kind);
        for (dependency, raw) in table {
            target.insert(dependency, VersionSpecifier::parse(&raw));
        }
    }

    Ok(package)
}

/// Persists package records back into their manifests
pub trait ManifestStore {
    /// Write the package's version and the specifiers of its existing
    /// dependency entries; every other manifest field is left as it is.
    fn save(&self, package: &Package) -> Result<()>;
}

impl<T: ManifestStore + ?Sized> ManifestStore for &T {
    fn save(&self, package: &Package) -> Result<()> {
        (**self).save(package)
    }
}

/// [ManifestStore] editing `package.json` files in place
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestStore;

impl ManifestStore for JsonManifestStore {
    fn save(&self, package: &Package) -> Result<()> {
        let path = package.path.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            ChangelogError::manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut document: Value = serde_json::from_str(&content)
            .map_err(|e| ChangelogError::manifest(format!("{}: {}", path.display(), e)))?;

        let object = document.as_object_mut().ok_or_else(|| {
            ChangelogError::manifest(format!("{} is not a JSON object", path.display()))
        })?;

        object.insert("version".to_string(), Value::String(package.version.clone()));

        for kind in DependencyKind::ALL {
            let table = package.dependency_table(kind);
            if let Some(Value::Object(entries)) = object.get_mut(kind.manifest_key()) {
                for (dependency, specifier) in table {
                    if let Some(entry) = entries.get_mut(dependency) {
                        *entry = Value::String(specifier.to_string());
                    }
                }
            }
        }

        let mut rendered = render_json(&document, detect_indent(&content))?;
        if content.ends_with('\n') {
            rendered.push('\n');
        }

        fs::write(&path, rendered).map_err(|e| {
            ChangelogError::manifest(format!(
                "cannot write {} for '{}': {}",
                path.display(),
                package.name,
                e
            ))
        })?;

        tracing::debug!(package = %package.name, path = %path.display(), "manifest written");
        Ok(())
    }
}

/// Indentation of the first indented line, two spaces if there is none
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .find_map(|line| {
            let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            (!indent.is_empty()).then_some(indent)
        })
        .unwrap_or_else(|| "  ".to_string())
}

fn render_json(document: &Value, indent: String) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(document, &mut serializer)?;
    String::from_utf8(buffer).map_err(|e| ChangelogError::manifest(e.to_string()))
}
