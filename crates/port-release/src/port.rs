//! vcpkg port generation
//!
//! A port is the pair `portfile.cmake` + `vcpkg.json` placed under
//! `registry/ports/<name>/` of the private registry checkout.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::inputs::{PortInputs, RepositoryId};
use crate::manifest::{MANIFEST_FILE, Manifest, write_json_pretty};
use crate::version::{is_semver, strip_tag_prefix};
use crate::{PortError, Result};

/// Manifest of the extracted release source, relative to the root
pub const SOURCE_MANIFEST: &str = "source_extracted/vcpkg.json";

/// Directory holding one sub-directory per port, relative to the root
pub const PORTS_DIR: &str = "registry/ports";

pub const PORTFILE_NAME: &str = "portfile.cmake";

/// Build-system helpers every generated port depends on
pub const BOOTSTRAP_DEPENDENCIES: [&str; 2] = ["vcpkg-cmake", "vcpkg-cmake-config"];

/// The `vcpkg.json` written next to the portfile.
///
/// Field order here is the key order of the written file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub homepage: String,
    pub dependencies: Vec<Value>,
}

impl PortManifest {
    /// Derive the port manifest from the source manifest and release inputs
    pub fn build(source: &Manifest, inputs: &PortInputs) -> Result<Self> {
        let name = validate_package_name(source.name()?)?.to_string();

        let version = strip_tag_prefix(&inputs.tag_version).to_string();
        if !is_semver(&version) {
            warn!("Version '{version}' is not a semantic version; using it verbatim");
        }

        let description = source
            .optional_str("description")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name} library"));
        let homepage = source
            .optional_str("homepage")
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://github.com/{}", inputs.repository));

        Ok(Self {
            name,
            version,
            description,
            homepage,
            dependencies: merge_dependencies(source.dependencies()),
        })
    }
}

/// Bootstrap dependencies followed by the declared ones.
///
/// Declared string entries sharing the bootstrap prefix are dropped so they are
/// not listed twice; everything else keeps its original order.
pub fn merge_dependencies(declared: &[Value]) -> Vec<Value> {
    let prefix = BOOTSTRAP_DEPENDENCIES[0];

    BOOTSTRAP_DEPENDENCIES
        .iter()
        .map(|dep| Value::from(*dep))
        .chain(
            declared
                .iter()
                .filter(|dep| !dep.as_str().is_some_and(|s| s.starts_with(prefix)))
                .cloned(),
        )
        .collect()
}

/// Reject names that would not stay a single directory under [`PORTS_DIR`]
pub fn validate_package_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(name),
        _ => Err(PortError::InvalidInput(format!(
            "package name '{name}' is not a valid port directory name"
        ))),
    }
}

/// Instantiate the portfile template
pub fn render_portfile(repository: &RepositoryId, hash: &str, package_name: &str) -> String {
    format!(
        r#"# Check for required authorization token for private repository
if(NOT DEFINED ENV{{AUTHORIZATION_TOKEN}} OR "$ENV{{AUTHORIZATION_TOKEN}}" STREQUAL "")
    message(FATAL_ERROR "Error: AUTHORIZATION_TOKEN not found in environment variables. Set AUTHORIZATION_TOKEN for private repository access.")
endif()

vcpkg_from_github(
    OUT_SOURCE_PATH SOURCE_PATH
    REPO {owner}/{repo}
    REF "v${{VERSION}}"
    SHA512 {hash}
    HEAD_REF main
    AUTHORIZATION_TOKEN "$ENV{{AUTHORIZATION_TOKEN}}"
)

vcpkg_cmake_configure(
    SOURCE_PATH "${{SOURCE_PATH}}"
    OPTIONS
        -DBUILD_TESTING=OFF
)

vcpkg_cmake_install()

# Fix cmake config path
vcpkg_cmake_config_fixup(
    PACKAGE_NAME {package_name}
    CONFIG_PATH lib/cmake/{package_name}
)

# Remove debug includes
file(REMOVE_RECURSE "${{CURRENT_PACKAGES_DIR}}/debug/include")

# Handle copyright - only if LICENSE file exists
if(EXISTS "${{SOURCE_PATH}}/LICENSE")
    vcpkg_install_copyright(FILE_LIST "${{SOURCE_PATH}}/LICENSE")
endif()
"#,
        owner = repository.owner,
        repo = repository.repo,
    )
}

/// Files produced by [`PortGenerator::generate`]
#[derive(Debug, Clone)]
pub struct GeneratedPort {
    pub dir: PathBuf,
    pub portfile: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: PortManifest,
}

/// Generates port files below a root directory
#[derive(Debug, Clone)]
pub struct PortGenerator {
    root: PathBuf,
}

impl PortGenerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn source_manifest_path(&self) -> PathBuf {
        self.root.join(SOURCE_MANIFEST)
    }

    pub fn port_dir(&self, package_name: &str) -> PathBuf {
        self.root.join(PORTS_DIR).join(package_name)
    }

    /// Package name declared by the source manifest
    pub fn package_name(&self) -> Result<String> {
        let source = Manifest::load(self.source_manifest_path())?;
        Ok(validate_package_name(source.name()?)?.to_string())
    }

    /// Write `portfile.cmake` and `vcpkg.json` for the release described by `inputs`
    pub fn generate(&self, inputs: &PortInputs) -> Result<GeneratedPort> {
        let source_path = self.source_manifest_path();
        info!("Reading source manifest: {}", source_path.display());
        let source = Manifest::load(&source_path)?;
        info!("Source manifest keys: {:?}", source.keys());

        let manifest = PortManifest::build(&source, inputs)?;
        info!("Using package name from source: {}", manifest.name);
        info!("Source dependencies: {}", Value::from(source.dependencies()));
        info!("Final dependencies: {}", Value::from(manifest.dependencies.as_slice()));

        let dir = self.port_dir(&manifest.name);
        info!("Creating port directory: {}", dir.display());
        fs::create_dir_all(&dir).map_err(|e| PortError::io(&dir, e))?;

        let portfile = dir.join(PORTFILE_NAME);
        let content = render_portfile(&inputs.repository, &inputs.hash, &manifest.name);
        fs::write(&portfile, &content).map_err(|e| PortError::io(&portfile, e))?;
        info!(
            "Wrote {} ({} characters)",
            portfile.display(),
            content.chars().count()
        );

        let manifest_path = dir.join(MANIFEST_FILE);
        write_json_pretty(&manifest_path, &manifest)?;
        info!("Wrote {}", manifest_path.display());

        Ok(GeneratedPort {
            dir,
            portfile,
            manifest_path,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn inputs(tag: &str) -> PortInputs {
        PortInputs {
            repo_name: "widget".into(),
            tag_version: tag.into(),
            hash: "ab".repeat(64),
            repository: "acme/widget".parse().unwrap(),
        }
    }

    fn source(value: Value) -> Manifest {
        match value {
            Value::Object(map) => Manifest::from_fields(SOURCE_MANIFEST, map),
            _ => panic!("fixture must be an object"),
        }
    }

    fn write_source(root: &Path, value: &Value) {
        let path = root.join(SOURCE_MANIFEST);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    #[test]
    fn test_merge_dependencies_drops_bootstrap_prefix() {
        let merged = merge_dependencies(&[json!("vcpkg-cmake-fix"), json!("zlib")]);
        assert_eq!(merged, vec![json!("vcpkg-cmake"), json!("vcpkg-cmake-config"), json!("zlib")]);
    }

    #[test]
    fn test_merge_dependencies_keeps_order_and_objects() {
        let merged = merge_dependencies(&[
            json!("openssl"),
            json!("vcpkg-cmake"),
            json!({ "name": "fmt", "features": ["std"] }),
            json!("Vcpkg-cmake-extra"),
            json!("zlib"),
        ]);
        assert_eq!(
            merged,
            vec![
                json!("vcpkg-cmake"),
                json!("vcpkg-cmake-config"),
                json!("openssl"),
                json!({ "name": "fmt", "features": ["std"] }),
                json!("Vcpkg-cmake-extra"),
                json!("zlib"),
            ]
        );
    }

    #[test]
    fn test_build_manifest_defaults() {
        let port = PortManifest::build(&source(json!({ "name": "widget" })), &inputs("v1.2.3")).unwrap();
        assert_eq!(port.version, "1.2.3");
        assert_eq!(port.description, "widget library");
        assert_eq!(port.homepage, "https://github.com/acme/widget");
        assert_eq!(port.dependencies, vec![json!("vcpkg-cmake"), json!("vcpkg-cmake-config")]);
    }

    #[test]
    fn test_build_manifest_uses_source_fields() {
        let src = source(json!({
            "name": "widget",
            "description": "Widgets for everyone",
            "homepage": "https://widgets.example"
        }));
        let port = PortManifest::build(&src, &inputs("2.0.0")).unwrap();
        assert_eq!(port.version, "2.0.0");
        assert_eq!(port.description, "Widgets for everyone");
        assert_eq!(port.homepage, "https://widgets.example");
    }

    #[test]
    fn test_build_manifest_strips_single_v() {
        let port = PortManifest::build(&source(json!({ "name": "widget" })), &inputs("vv3")).unwrap();
        assert_eq!(port.version, "v3");
    }

    #[test]
    fn test_build_manifest_requires_name() {
        let err = PortManifest::build(&source(json!({ "version": "1.0" })), &inputs("v1.0.0"));
        assert!(matches!(err, Err(PortError::MissingField { .. })));
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("widget").is_ok());
        assert!(validate_package_name("widget-core").is_ok());
        for bad in ["", ".", "..", "../widget", "a/b", "a\\b", "/abs"] {
            assert!(validate_package_name(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_render_portfile() {
        let repo: RepositoryId = "acme/widget".parse().unwrap();
        let text = render_portfile(&repo, "f00d", "widget");

        assert!(text.contains("    REPO acme/widget\n"));
        assert!(text.contains("    REF \"v${VERSION}\"\n"));
        assert!(text.contains("    SHA512 f00d\n"));
        assert!(text.contains("if(NOT DEFINED ENV{AUTHORIZATION_TOKEN} OR \"$ENV{AUTHORIZATION_TOKEN}\" STREQUAL \"\")"));
        assert!(text.contains("    PACKAGE_NAME widget\n    CONFIG_PATH lib/cmake/widget\n"));
        assert!(text.contains("-DBUILD_TESTING=OFF"));
        assert!(text.contains("file(REMOVE_RECURSE \"${CURRENT_PACKAGES_DIR}/debug/include\")"));
        assert!(text.ends_with("    vcpkg_install_copyright(FILE_LIST \"${SOURCE_PATH}/LICENSE\")\nendif()\n"));
    }

    #[test]
    fn test_generate_writes_port() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            &json!({ "name": "widget", "dependencies": ["vcpkg-cmake-fix", "zlib"] }),
        );

        let generated = PortGenerator::new(dir.path()).generate(&inputs("v1.2.3")).unwrap();
        assert_eq!(generated.dir, dir.path().join("registry/ports/widget"));

        let portfile = fs::read_to_string(&generated.portfile).unwrap();
        assert!(portfile.contains("REPO acme/widget"));

        let written: Value =
            serde_json::from_str(&fs::read_to_string(&generated.manifest_path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "name": "widget",
                "version": "1.2.3",
                "description": "widget library",
                "homepage": "https://github.com/acme/widget",
                "dependencies": ["vcpkg-cmake", "vcpkg-cmake-config", "zlib"]
            })
        );
    }

    #[test]
    fn test_generate_into_existing_dir() {
        let dir = tempdir().unwrap();
        write_source(dir.path(), &json!({ "name": "widget" }));
        let generator = PortGenerator::new(dir.path());
        fs::create_dir_all(generator.port_dir("widget")).unwrap();

        assert!(generator.generate(&inputs("v1.0.0")).is_ok());
        assert!(generator.generate(&inputs("v1.0.1")).is_ok());
    }

    #[test]
    fn test_generate_missing_source() {
        let dir = tempdir().unwrap();
        let err = PortGenerator::new(dir.path()).generate(&inputs("v1.0.0"));
        assert!(matches!(err, Err(PortError::NotFound(_))));
        assert!(!dir.path().join(PORTS_DIR).exists());
    }

    #[test]
    fn test_package_name() {
        let dir = tempdir().unwrap();
        let generator = PortGenerator::new(dir.path());
        assert!(matches!(generator.package_name(), Err(PortError::NotFound(_))));

        write_source(dir.path(), &json!({ "version": "1.0" }));
        assert!(matches!(generator.package_name(), Err(PortError::MissingField { .. })));

        write_source(dir.path(), &json!({ "name": "widget" }));
        assert_eq!(generator.package_name().unwrap(), "widget");
    }
}
