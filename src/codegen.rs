// ==============================================================================
// Generate-Sources Orchestration
// ==============================================================================
//
// The single run loop: resolve directories, then process each configured
// resource strictly in order. A `.xml` schema is handed to the external
// generator for IR compilation; a `.sbeir` file is loaded as a pre-compiled
// IR cache; anything else is skipped with a notice (or fails the run under
// `deny_unknown_resources`). Every obtained IR then optionally produces stubs
// and/or a cache file in the output directory.
//
// The first failure aborts the run; output already on disk is left as is.
// Whatever happened per resource, the run ends by enumerating the output
// directory and assembling the Cargo directives that register it -- exactly
// once, even when nothing was generated.
//
// The generator is located lazily, on the first resource that needs it, so a
// run that only decodes caches (or skips everything) works without one
// installed.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use miette::Context;
use walkdir::WalkDir;

use crate::cargo;
use crate::config::Config;
use crate::ir::{IR_EXTENSION, Ir};
use crate::tool::{Generator, Invocation};

// ==============================================================================
// Resource Dispatch
// ==============================================================================

/// What a resource path is, judged purely by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    /// An SBE message schema (`.xml`).
    Schema,
    /// A serialized intermediate representation (`.sbeir`).
    IrCache,
    /// Neither; skipped unless unknown resources are denied.
    Unknown,
}

pub(crate) fn classify(path: &Path) -> ResourceKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => ResourceKind::Schema,
        Some(ext) if ext == IR_EXTENSION => ResourceKind::IrCache,
        _ => ResourceKind::Unknown,
    }
}

// ==============================================================================
// Run Outcome
// ==============================================================================

/// Result of a code-generation run.
#[derive(Debug)]
pub struct Outcome {
    /// Absolute output directory, registered as the generated-sources root.
    pub output_dir: PathBuf,
    /// Every file now present under the output directory, in deterministic
    /// (name-sorted) order. Includes files from earlier runs that were not
    /// overwritten; nothing is rolled back or cleaned.
    pub generated_files: Vec<PathBuf>,
    /// IR cache files this run wrote, in write order.
    pub ir_cache_files: Vec<PathBuf>,
    /// Number of schemas compiled through the external generator.
    pub compiled: usize,
    /// Number of IR caches decoded instead of compiled.
    pub decoded: usize,
    /// Resources skipped for an unrecognized extension.
    pub skipped: Vec<PathBuf>,
    directives: Vec<String>,
}

impl Outcome {
    /// The `cargo:` directives for this run: one `rerun-if-changed` per
    /// processed resource, a `warning` per skipped resource, and exactly one
    /// `rustc-env` line exporting the output directory as
    /// `SBE_GENERATED_DIR`.
    pub fn cargo_directives(&self) -> &[String] {
        &self.directives
    }

    /// Print the directives to stdout for Cargo to pick up. Call this from
    /// `build.rs` after a successful compile.
    pub fn emit_cargo_directives(&self) {
        for line in &self.directives {
            println!("{line}");
        }
    }
}

// ==============================================================================
// Lazy Generator Handle
// ==============================================================================

struct LazyGenerator<'a> {
    explicit: Option<&'a Path>,
    located: Option<Generator>,
}

impl<'a> LazyGenerator<'a> {
    fn new(explicit: Option<&'a Path>) -> Self {
        LazyGenerator {
            explicit,
            located: None,
        }
    }

    fn get(&mut self) -> miette::Result<&Generator> {
        if self.located.is_none() {
            self.located = Some(Generator::locate(self.explicit)?);
        }
        match &self.located {
            Some(generator) => Ok(generator),
            None => unreachable!("populated above"),
        }
    }
}

// ==============================================================================
// The Run Loop
// ==============================================================================

pub(crate) fn run(config: &Config) -> miette::Result<Outcome> {
    if config.resources.is_empty() {
        return Err(miette::miette!(
            "no resources configured; add at least one .xml schema or .sbeir cache file"
        ));
    }

    let base = config.resolved_base_dir()?;
    let output_dir = config.resolved_output_dir(&base);
    fs::create_dir_all(&output_dir)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err_with(|| format!("create output directory {}", output_dir.display()))?;

    tracing::info!(
        "SBE code generation: {} resource(s), target language {}",
        config.resources.len(),
        config.target_language
    );
    tracing::debug!("base directory: {}", base.display());
    tracing::info!("output directory: {}", output_dir.display());
    if !config.keyword_append_token.is_empty() {
        tracing::debug!(
            "keyword collisions will append `{}`",
            config.keyword_append_token
        );
    }

    let mut generator = LazyGenerator::new(config.tool.as_deref());
    let mut processed: Vec<PathBuf> = Vec::new();
    let mut skipped: Vec<PathBuf> = Vec::new();
    let mut ir_caches: IndexSet<PathBuf> = IndexSet::new();
    let mut compiled = 0usize;
    let mut decoded = 0usize;

    for resource in &config.resources {
        let path = if resource.is_absolute() {
            resource.clone()
        } else {
            base.join(resource)
        };

        let ir = match classify(&path) {
            ResourceKind::Schema => {
                tracing::debug!("compiling schema {}", path.display());
                let ir = compile_schema(generator.get()?, &path, config)
                    .wrap_err_with(|| format!("process resource {}", path.display()))?;
                compiled += 1;
                ir
            }
            ResourceKind::IrCache => {
                tracing::debug!("decoding IR cache {}", path.display());
                let ir = Ir::read_cache(&path)
                    .wrap_err_with(|| format!("process resource {}", path.display()))?;
                decoded += 1;
                ir
            }
            ResourceKind::Unknown => {
                if config.deny_unknown_resources {
                    return Err(miette::miette!(
                        "unsupported resource type: {} (expected .xml or .{IR_EXTENSION})",
                        path.display()
                    ));
                }
                tracing::warn!("file format not supported, skipping {}", path.display());
                skipped.push(path);
                continue;
            }
        };

        if config.generate_stubs {
            tracing::debug!(
                "generating {} stubs from IR `{}`",
                config.target_language,
                ir.name()
            );
            emit_stubs(generator.get()?, &ir, &output_dir, config)
                .wrap_err_with(|| format!("generate stubs for {}", path.display()))?;
        }
        if config.generate_ir {
            let cache = ir
                .write_cache(&output_dir)
                .wrap_err_with(|| format!("encode IR for {}", path.display()))?;
            tracing::info!("wrote IR cache {}", cache.display());
            ir_caches.insert(cache);
        }

        processed.push(path);
    }

    let generated_files = enumerate_generated(&output_dir)?;
    for file in &generated_files {
        tracing::info!("generated file {}", file.display());
    }
    tracing::info!(
        "done: {compiled} schema(s) compiled, {decoded} cache(s) decoded, {} skipped",
        skipped.len()
    );

    let directives = cargo::directives(&processed, &skipped, &output_dir);
    Ok(Outcome {
        output_dir,
        generated_files,
        ir_cache_files: ir_caches.into_iter().collect(),
        compiled,
        decoded,
        skipped,
        directives,
    })
}

// ==============================================================================
// External Operations
// ==============================================================================

/// Compile a schema to its intermediate representation.
///
/// The generator writes `<stem>.sbeir` into a scratch directory scoped to
/// this call; the bytes are read back as the in-memory IR.
fn compile_schema(generator: &Generator, schema: &Path, config: &Config) -> miette::Result<Ir> {
    let scratch = tempfile::tempdir()
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("create scratch directory")?;

    generator.run(
        &Invocation {
            generate_ir: true,
            generate_stubs: false,
            output_dir: scratch.path(),
            target_language: config.target_language,
            target_namespace: config.namespace.as_deref(),
            keyword_append_token: &config.keyword_append_token,
        },
        schema,
    )?;

    let stem = schema
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cache = scratch.path().join(format!("{stem}.{IR_EXTENSION}"));
    Ir::read_cache(&cache).wrap_err("generator reported success but produced no readable IR")
}

/// Emit source stubs from an IR into the output directory.
///
/// The generator consumes IR from disk, so the in-memory bytes are
/// materialized into a scratch file scoped to this call.
fn emit_stubs(
    generator: &Generator,
    ir: &Ir,
    output_dir: &Path,
    config: &Config,
) -> miette::Result<()> {
    let scratch = tempfile::tempdir()
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("create scratch directory")?;
    let input = ir.write_cache(scratch.path())?;

    generator.run(
        &Invocation {
            generate_ir: false,
            generate_stubs: true,
            output_dir,
            target_language: config.target_language,
            target_namespace: config.namespace.as_deref(),
            keyword_append_token: &config.keyword_append_token,
        },
        &input,
    )
}

/// List every file under the output directory, name-sorted, for logging and
/// the [`Outcome`]. An enumeration failure is fatal.
fn enumerate_generated(output_dir: &Path) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry
            .map_err(|e| miette::miette!("{e}"))
            .wrap_err_with(|| {
                format!("enumerate generated output under {}", output_dir.display())
            })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
