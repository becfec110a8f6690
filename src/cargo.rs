// ==============================================================================
// Cargo Build-Script Integration
// ==============================================================================
//
// Registering the output directory as a compile root, translated to Cargo
// terms: the build script exports the directory through `cargo:rustc-env`, so
// the consuming crate can pull generated sources in with
//
//     include!(concat!(env!("SBE_GENERATED_DIR"), "/car_codec.rs"));
//
// Alongside the registration line, each processed resource gets a
// `cargo:rerun-if-changed` line and each skipped resource a `cargo:warning`.
// The registration line is emitted exactly once per run, whether or not any
// resource produced output.

use std::path::{Path, PathBuf};

/// Environment variable through which the consuming crate sees the generated
/// sources directory.
pub(crate) const GENERATED_DIR_ENV: &str = "SBE_GENERATED_DIR";

/// Assemble the build-script directives for one run.
pub(crate) fn directives(
    processed: &[PathBuf],
    skipped: &[PathBuf],
    output_dir: &Path,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(processed.len() + skipped.len() + 1);
    for resource in processed {
        lines.push(format!("cargo:rerun-if-changed={}", resource.display()));
    }
    for resource in skipped {
        lines.push(format!(
            "cargo:warning=skipping resource with unsupported extension: {}",
            resource.display()
        ));
    }
    lines.push(format!(
        "cargo:rustc-env={GENERATED_DIR_ENV}={}",
        output_dir.display()
    ));
    lines
}
