//! Package manifest (`vcpkg.json`) access
//!
//! Manifests are kept as ordered JSON maps rather than typed structs so that
//! rewriting a file never drops or reorders keys this crate does not know about.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{PortError, Result};

/// Manifest file name, relative to the repository root
pub const MANIFEST_FILE: &str = "vcpkg.json";

/// Version keys accepted by vcpkg, in lookup priority order
pub const VERSION_FIELDS: &[&str] = &["version", "version-string", "version-semver"];

/// Read and parse a JSON document.
///
/// A missing file maps to [`PortError::NotFound`], a syntax error to
/// [`PortError::MalformedInput`].
pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PortError::NotFound(path.display().to_string()),
        _ => PortError::io(path, e),
    })?;

    serde_json::from_str(&raw).map_err(|e| PortError::malformed(path, e.to_string()))
}

/// Read a JSON document whose root must be an object.
pub fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        other => Err(PortError::malformed(
            path,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
    }
}

/// Write `value` as pretty JSON (2-space indent, non-ASCII left as-is).
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| PortError::io(path, e))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A parsed package manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    /// Load a manifest from disk
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let fields = read_json_object(&path)?;
        Ok(Self { path, fields })
    }

    /// Wrap an already-parsed object
    pub fn from_fields(path: impl Into<PathBuf>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Package name; required and non-empty
    pub fn name(&self) -> Result<&str> {
        match self.fields.get("name") {
            None => Err(PortError::missing_field(&self.path, "name")),
            Some(Value::String(name)) if name.is_empty() => {
                Err(PortError::missing_field(&self.path, "name"))
            }
            Some(Value::String(name)) => Ok(name),
            Some(other) => Err(PortError::malformed(
                &self.path,
                format!("'name' must be a string, found {}", json_kind(other)),
            )),
        }
    }

    /// Version string from the first present key of [`VERSION_FIELDS`]
    pub fn version(&self) -> Result<&str> {
        let Some((field, value)) = VERSION_FIELDS
            .iter()
            .find_map(|field| self.fields.get(*field).map(|v| (*field, v)))
        else {
            return Err(PortError::missing_field(&self.path, VERSION_FIELDS.join(" | ")));
        };

        match value {
            Value::String(version) if version.is_empty() => {
                Err(PortError::missing_field(&self.path, field))
            }
            Value::String(version) => Ok(version),
            other => Err(PortError::malformed(
                &self.path,
                format!("'{field}' must be a string, found {}", json_kind(other)),
            )),
        }
    }

    /// String field, `None` when absent or not a string
    pub fn optional_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Declared dependencies (strings or dependency objects), empty when absent
    pub fn dependencies(&self) -> &[Value] {
        self.fields
            .get("dependencies")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn manifest(value: Value) -> Manifest {
        match value {
            Value::Object(map) => Manifest::from_fields("vcpkg.json", map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_version_each_field() {
        for field in VERSION_FIELDS {
            let mut fields = Map::new();
            fields.insert("name".into(), json!("widget"));
            fields.insert((*field).into(), json!("2.4.1"));
            let m = Manifest::from_fields("vcpkg.json", fields);
            assert_eq!(m.version().unwrap(), "2.4.1");
        }
    }

    #[test]
    fn test_version_priority() {
        let m = manifest(json!({
            "version-semver": "3.0.0",
            "version-string": "2.0",
            "version": "1.0.0"
        }));
        assert_eq!(m.version().unwrap(), "1.0.0");

        let m = manifest(json!({ "version-semver": "3.0.0", "version-string": "2.0" }));
        assert_eq!(m.version().unwrap(), "2.0");
    }

    #[test]
    fn test_version_missing() {
        let m = manifest(json!({ "name": "widget", "version-date": "2024-01-01" }));
        assert!(matches!(m.version(), Err(PortError::MissingField { .. })));

        let m = manifest(json!({ "version": "" }));
        assert!(matches!(m.version(), Err(PortError::MissingField { .. })));
    }

    #[test]
    fn test_version_not_a_string() {
        let m = manifest(json!({ "version": 3 }));
        assert!(matches!(m.version(), Err(PortError::MalformedInput { .. })));
    }

    #[test]
    fn test_name_required() {
        assert_eq!(manifest(json!({ "name": "widget" })).name().unwrap(), "widget");
        assert!(matches!(
            manifest(json!({ "version": "1.0" })).name(),
            Err(PortError::MissingField { .. })
        ));
        assert!(matches!(
            manifest(json!({ "name": ["widget"] })).name(),
            Err(PortError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_dependencies_default_empty() {
        assert!(manifest(json!({ "name": "widget" })).dependencies().is_empty());
        let m = manifest(json!({ "dependencies": ["zlib", { "name": "fmt" }] }));
        assert_eq!(m.dependencies().len(), 2);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);

        assert!(matches!(Manifest::load(&path), Err(PortError::NotFound(_))));

        fs::write(&path, "{ \"name\": ").unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(PortError::MalformedInput { .. })
        ));

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(PortError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_write_preserves_key_order_and_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(&path, r#"{"name":"widget","zeta":1,"alpha":"Grüße"}"#).unwrap();

        let m = Manifest::load(&path).unwrap();
        assert_eq!(m.keys(), vec!["name", "zeta", "alpha"]);

        write_json_pretty(&path, m.fields()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"widget\",\n  \"zeta\": 1,\n  \"alpha\": \"Grüße\"\n}"
        );
    }
}
