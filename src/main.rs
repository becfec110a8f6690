// ==============================================================================
// CLI for SBE Code Generation
// ==============================================================================
//
// One task: feed schema resources to the external generator and wire the
// output directory up. Flags mirror the library options one to one;
// `--metadata` loads a [package.metadata.sbe] table first, then flags
// override it and positional resources append to its list.

use std::path::PathBuf;

use clap::Parser;

use sbe_build::{Config, Language};

// ==============================================================================
// CLI Argument Definitions
// ==============================================================================

#[derive(Parser)]
#[command(
    name = "sbe-build",
    version,
    about = "Generate sources from Simple Binary Encoding schemas"
)]
struct Cli {
    /// Schema (.xml) or IR cache (.sbeir) files, processed in order.
    #[arg(value_name = "RESOURCE", required_unless_present = "metadata")]
    resources: Vec<PathBuf>,

    /// Read options from the [package.metadata.sbe] table of this Cargo.toml.
    #[arg(long, value_name = "CARGO_TOML")]
    metadata: Option<PathBuf>,

    /// Override the schema's package namespace in generated code.
    #[arg(long, value_name = "NAMESPACE")]
    namespace: Option<String>,

    /// Skip source stub generation.
    #[arg(long)]
    no_stubs: bool,

    /// Write a <schema>.sbeir IR cache file per schema into the output directory.
    #[arg(long)]
    ir: bool,

    /// Directory for generated sources and IR caches.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Target language: rust, java, cpp, golang, or csharp.
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    /// Suffix appended to identifiers that collide with a target-language
    /// keyword.
    #[arg(long, value_name = "TOKEN")]
    keyword_append_token: Option<String>,

    /// Fail on resources with unrecognized extensions instead of skipping
    /// them.
    #[arg(long)]
    deny_unknown: bool,

    /// Path to the generator executable or jar, overriding SBE_TOOL/SBE_JAR
    /// discovery.
    #[arg(long, value_name = "PATH")]
    tool: Option<PathBuf>,

    /// Base directory for relative resource and output paths. Defaults to
    /// the project root when run by Cargo, else the current directory.
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Print cargo build-script directives for the run to stdout.
    #[arg(long)]
    cargo: bool,
}

// ==============================================================================
// Entry Point
// ==============================================================================

fn main() -> miette::Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))?;

    // Log to stderr so `--cargo` directives on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.metadata {
        Some(manifest) => Config::from_manifest(manifest)?,
        None => Config::new(),
    };

    if let Some(namespace) = cli.namespace {
        config.namespace(namespace);
    }
    if cli.no_stubs {
        config.generate_stubs(false);
    }
    if cli.ir {
        config.generate_ir(true);
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir(dir);
    }
    if let Some(language) = &cli.language {
        let language = language
            .parse::<Language>()
            .map_err(miette::Report::new)?;
        config.target_language(language);
    }
    if let Some(token) = cli.keyword_append_token {
        config.keyword_append_token(token);
    }
    if cli.deny_unknown {
        config.deny_unknown_resources(true);
    }
    if let Some(tool) = cli.tool {
        config.tool(tool);
    }
    if let Some(dir) = cli.base_dir {
        config.base_dir(dir);
    }
    config.resources(cli.resources);

    let outcome = config.compile()?;

    if cli.cargo {
        outcome.emit_cargo_directives();
    }

    Ok(())
}
