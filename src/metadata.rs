// ==============================================================================
// Manifest Metadata: [package.metadata.sbe]
// ==============================================================================
//
// The structured options block. A consuming project keeps its generation
// options next to its other package data:
//
//     [package.metadata.sbe]
//     namespace = "com.example.car"
//     generate-ir = true
//     resources = ["schemas/car.xml"]
//
// Keys are kebab-case, unknown keys are rejected, and `resources` must list
// at least one file. Relative paths resolve against the manifest's directory,
// so the table reads the same from any working directory.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Context;
use serde::Deserialize;

use crate::config::{Config, Language};

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    metadata: Option<PackageMetadata>,
}

#[derive(Deserialize)]
struct PackageMetadata {
    sbe: Option<SbeTable>,
}

/// The `[package.metadata.sbe]` table. Every option is optional except the
/// resource list; absent options keep the builder defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SbeTable {
    namespace: Option<String>,
    generate_stubs: Option<bool>,
    generate_ir: Option<bool>,
    output_dir: Option<PathBuf>,
    target_language: Option<String>,
    keyword_append_token: Option<String>,
    deny_unknown_resources: Option<bool>,
    resources: Vec<PathBuf>,
}

pub(crate) fn from_manifest(path: &Path) -> miette::Result<Config> {
    let text = fs::read_to_string(path)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err_with(|| format!("read {}", path.display()))?;
    let manifest: Manifest = toml::from_str(&text)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err_with(|| format!("parse {}", path.display()))?;

    let table = manifest
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.sbe)
        .ok_or_else(|| {
            miette::miette!("no [package.metadata.sbe] table in {}", path.display())
        })?;

    if table.resources.is_empty() {
        return Err(miette::miette!(
            "[package.metadata.sbe] in {} lists no resources",
            path.display()
        ));
    }

    let mut config = Config::new();

    let manifest_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    config.base_dir(manifest_dir);

    if let Some(namespace) = table.namespace {
        config.namespace(namespace);
    }
    if let Some(enabled) = table.generate_stubs {
        config.generate_stubs(enabled);
    }
    if let Some(enabled) = table.generate_ir {
        config.generate_ir(enabled);
    }
    if let Some(dir) = table.output_dir {
        config.output_dir(dir);
    }
    if let Some(language) = table.target_language {
        config.target_language(language.parse::<Language>().map_err(miette::Report::new)?);
    }
    if let Some(token) = table.keyword_append_token {
        config.keyword_append_token(token);
    }
    if let Some(enabled) = table.deny_unknown_resources {
        config.deny_unknown_resources(enabled);
    }
    config.resources(table.resources);

    Ok(config)
}
