// ==============================================================================
// Configuration: the Options Record Behind a Code-Generation Run
// ==============================================================================
//
// `Config` is a non-consuming builder (like `std::process::Command`): option
// methods and the terminal `compile()` can be chained, and the same builder can
// be reused across multiple runs. It carries exactly the options a generation
// run needs -- namespace override, output directory, target language, the two
// output flags, the keyword-collision token, and the ordered resource list --
// plus the base directory against which relative paths resolve and an optional
// explicit generator path.
//
// `compile()` delegates to the orchestrator in `codegen`.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::codegen::{self, Outcome};
use crate::error::UnknownLanguage;
use crate::metadata;

// ==============================================================================
// Target Language
// ==============================================================================

/// Output language for generated stubs.
///
/// The variants mirror the names the external generator accepts for its
/// `sbe.target.language` option. The default is [`Language::Rust`]: the
/// primary consumer of this crate is a Cargo build script wiring generated
/// sources into the same crate. The other targets remain available for CLI
/// use in polyglot repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Rust,
    Java,
    Cpp,
    Golang,
    CSharp,
}

impl Language {
    /// The spelling the external generator expects.
    pub(crate) fn generator_name(self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Java => "Java",
            Language::Cpp => "Cpp",
            Language::Golang => "Golang",
            Language::CSharp => "CSharp",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.generator_name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rust" => Ok(Language::Rust),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            "golang" | "go" => Ok(Language::Golang),
            "csharp" | "c#" => Ok(Language::CSharp),
            _ => Err(UnknownLanguage {
                name: s.to_string(),
            }),
        }
    }
}

// ==============================================================================
// `Config` Builder
// ==============================================================================

/// Builder for a code-generation run over a list of schema resources.
///
/// Each resource is dispatched by filename suffix: `.xml` files are compiled
/// to the generator's intermediate representation, `.sbeir` files are loaded
/// as pre-compiled IR caches, and anything else is logged and skipped. Every
/// obtained IR then produces source stubs (on by default) and/or an IR cache
/// file in the output directory (off by default).
///
/// # Examples
///
/// From a `build.rs`:
///
/// ```no_run
/// let outcome = sbe_build::Config::new()
///     .namespace("com.example.car")
///     .generate_ir(true)
///     .resource("schemas/car.xml")
///     .compile()?;
/// outcome.emit_cargo_directives();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Multi-step configuration:
///
/// ```no_run
/// use sbe_build::{Config, Language};
///
/// let mut config = Config::new();
/// config.target_language(Language::Java);
/// config.output_dir("generated/java");
/// for schema in ["schemas/car.xml", "schemas/truck.xml"] {
///     config.resource(schema);
/// }
/// let outcome = config.compile()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Config {
    pub(crate) namespace: Option<String>,
    pub(crate) generate_stubs: bool,
    pub(crate) generate_ir: bool,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) target_language: Language,
    pub(crate) keyword_append_token: String,
    pub(crate) deny_unknown_resources: bool,
    pub(crate) tool: Option<PathBuf>,
    pub(crate) base_dir: Option<PathBuf>,
    pub(crate) resources: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a builder with the default options: stubs on, IR cache files
    /// off, Rust output, no namespace override, empty resource list.
    pub fn new() -> Self {
        Config {
            namespace: None,
            generate_stubs: true,
            generate_ir: false,
            output_dir: None,
            target_language: Language::default(),
            keyword_append_token: String::new(),
            deny_unknown_resources: false,
            tool: None,
            base_dir: None,
            resources: Vec::new(),
        }
    }

    /// Load options from the `[package.metadata.sbe]` table of a `Cargo.toml`.
    ///
    /// Relative resource and output paths in the table resolve against the
    /// manifest's directory. The table must list at least one resource.
    pub fn from_manifest(path: impl AsRef<Path>) -> miette::Result<Config> {
        metadata::from_manifest(path.as_ref())
    }

    /// Override the schema's package namespace in generated code.
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Whether to emit source stubs for each IR. Defaults to `true`.
    pub fn generate_stubs(&mut self, enabled: bool) -> &mut Self {
        self.generate_stubs = enabled;
        self
    }

    /// Whether to write each schema's IR to a `<name>.sbeir` cache file in the
    /// output directory. Defaults to `false`.
    pub fn generate_ir(&mut self, enabled: bool) -> &mut Self {
        self.generate_ir = enabled;
        self
    }

    /// Directory that receives generated sources and IR cache files.
    ///
    /// Defaults to `$OUT_DIR/sbe` inside a build script and
    /// `target/generated/sbe` elsewhere. Relative paths resolve against the
    /// base directory.
    pub fn output_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Target language for generated stubs. Defaults to [`Language::Rust`].
    pub fn target_language(&mut self, language: Language) -> &mut Self {
        self.target_language = language;
        self
    }

    /// Suffix appended by the generator to identifiers that collide with a
    /// target-language keyword. Empty (the default) leaves collisions to the
    /// generator's own policy. Passed to each generator invocation explicitly,
    /// never through this process's environment.
    pub fn keyword_append_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.keyword_append_token = token.into();
        self
    }

    /// Treat resources with unrecognized extensions as fatal errors instead
    /// of skipping them. Defaults to `false`.
    pub fn deny_unknown_resources(&mut self, enabled: bool) -> &mut Self {
        self.deny_unknown_resources = enabled;
        self
    }

    /// Explicit path to the external generator, bypassing `SBE_TOOL`,
    /// `SBE_JAR`, and `PATH` discovery. A `.jar` path is run through `java`.
    pub fn tool(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.tool = Some(path.into());
        self
    }

    /// Base directory for relative resource and output paths.
    ///
    /// Defaults to `$CARGO_MANIFEST_DIR` when set (the consuming project's
    /// root, inside a build script) and the current directory otherwise.
    pub fn base_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Append one resource file (`.xml` schema or `.sbeir` IR cache) to the
    /// processing list. Resources are processed in the order added.
    pub fn resource(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.resources.push(path.into());
        self
    }

    /// Append several resource files. Order is preserved.
    pub fn resources<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.resources.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Run code generation over the configured resources.
    ///
    /// Processes resources strictly in order; the first generator, decode, or
    /// I/O failure aborts the run (output already written stays on disk). On
    /// success the returned [`Outcome`] lists everything now present under
    /// the output directory and the Cargo directives for the run.
    pub fn compile(&self) -> miette::Result<Outcome> {
        codegen::run(self)
    }

    /// Base directory after applying defaults.
    pub(crate) fn resolved_base_dir(&self) -> miette::Result<PathBuf> {
        if let Some(dir) = &self.base_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = env::var_os("CARGO_MANIFEST_DIR") {
            return Ok(PathBuf::from(dir));
        }
        env::current_dir()
            .map_err(|e| miette::miette!("determine current directory: {e}"))
    }

    /// Output directory after applying defaults, absolute or base-relative.
    pub(crate) fn resolved_output_dir(&self, base: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => match env::var_os("OUT_DIR") {
                Some(out) => PathBuf::from(out).join("sbe"),
                None => base.join("target").join("generated").join("sbe"),
            },
        }
    }
}

/// Compile a list of resources with all-default options.
///
/// Convenience for the common single-call `build.rs` case; equivalent to
/// `Config::new().resources(paths).compile()`.
pub fn compile<I, P>(paths: I) -> miette::Result<Outcome>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Config::new().resources(paths).compile()
}
