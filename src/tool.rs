// ==============================================================================
// External Generator: Discovery and Invocation
// ==============================================================================
//
// All substantive work (schema parsing, IR construction, stub emission) lives
// in the external SBE generator. This module finds it and runs it, the same
// way `prost-build` treats `protoc`:
//
//   1. an explicit path from the configuration,
//   2. the `SBE_TOOL` environment variable (an executable or wrapper script),
//   3. the `SBE_JAR` environment variable (the `sbe-all` jar, run via `java`),
//   4. `sbe-tool` on `PATH`.
//
// Jar invocations receive options as the generator's own system properties
// (`-Dsbe.output.dir=...`); executable invocations receive the equivalent
// environment variables (`SBE_OUTPUT_DIR=...`) on the child process. Options
// are never written to this process's environment.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use miette::Context;

use crate::config::Language;
use crate::error::{ToolFailure, ToolNotFound};

pub(crate) const TOOL_ENV: &str = "SBE_TOOL";
pub(crate) const JAR_ENV: &str = "SBE_JAR";
const PATH_CANDIDATES: &[&str] = &["sbe-tool", "sbe-tool.exe"];

/// Maximum stderr carried into a [`ToolFailure`] diagnostic.
const STDERR_TAIL_LIMIT: usize = 400;

// ==============================================================================
// Discovery
// ==============================================================================

/// A located external generator and how to launch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Generator {
    /// Native executable or wrapper script; options pass as environment
    /// variables on the child.
    Executable(PathBuf),
    /// The generator jar; options pass as `-D` system properties to `java`.
    Jar(PathBuf),
}

impl Generator {
    /// Wrap an explicit path, choosing the launch mode by extension.
    fn from_path(path: &Path) -> Generator {
        if path.extension().is_some_and(|ext| ext == "jar") {
            Generator::Jar(path.to_path_buf())
        } else {
            Generator::Executable(path.to_path_buf())
        }
    }

    /// Find the generator, trying the explicit override first and falling
    /// back through the environment and `PATH`.
    pub(crate) fn locate(explicit: Option<&Path>) -> Result<Generator, ToolNotFound> {
        if let Some(path) = explicit {
            return Ok(Generator::from_path(path));
        }

        let mut attempted = Vec::new();

        match env::var_os(TOOL_ENV) {
            Some(tool) => return Ok(Generator::from_path(Path::new(&tool))),
            None => attempted.push(format!("{TOOL_ENV} (unset)")),
        }

        match env::var_os(JAR_ENV) {
            Some(jar) => return Ok(Generator::Jar(PathBuf::from(jar))),
            None => attempted.push(format!("{JAR_ENV} (unset)")),
        }

        if let Some(found) = search_path() {
            return Ok(Generator::Executable(found));
        }
        attempted.push("`sbe-tool` on PATH".to_string());

        Err(ToolNotFound { attempted })
    }
}

/// Look for the conventional generator name on `PATH`.
fn search_path() -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        for name in PATH_CANDIDATES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

// ==============================================================================
// Invocation
// ==============================================================================

/// Options for a single generator run. One run processes one input file in
/// one mode; a resource that needs both IR and stubs gets two runs.
#[derive(Debug)]
pub(crate) struct Invocation<'a> {
    pub generate_ir: bool,
    pub generate_stubs: bool,
    pub output_dir: &'a Path,
    pub target_language: Language,
    pub target_namespace: Option<&'a str>,
    pub keyword_append_token: &'a str,
}

impl Generator {
    /// Run the generator on `input` with the given options, capturing output.
    ///
    /// A non-zero exit becomes a [`ToolFailure`] carrying the rendered command
    /// line and a stderr tail. The child's stdout is forwarded at debug level.
    pub(crate) fn run(&self, options: &Invocation<'_>, input: &Path) -> miette::Result<()> {
        let mut command = self.command(options, input);
        let rendered = render(&command);
        tracing::debug!("running generator: {rendered}");

        let output = command
            .output()
            .map_err(|e| miette::miette!("{e}"))
            .wrap_err_with(|| format!("launch external generator: {rendered}"))?;

        if !output.stdout.is_empty() {
            tracing::debug!(
                "generator stdout: {}",
                String::from_utf8_lossy(&output.stdout).trim_end()
            );
        }

        if !output.status.success() {
            return Err(ToolFailure {
                command: rendered,
                status: output.status.code(),
                stderr_tail: stderr_tail(&output.stderr),
            }
            .into());
        }
        Ok(())
    }

    /// Assemble the child command for one invocation.
    fn command(&self, options: &Invocation<'_>, input: &Path) -> Command {
        match self {
            Generator::Executable(path) => {
                let mut command = Command::new(path);
                command
                    .env("SBE_OUTPUT_DIR", options.output_dir)
                    .env("SBE_TARGET_LANGUAGE", options.target_language.generator_name())
                    .env("SBE_GENERATE_IR", bool_str(options.generate_ir))
                    .env("SBE_GENERATE_STUBS", bool_str(options.generate_stubs));
                if let Some(namespace) = options.target_namespace {
                    command.env("SBE_TARGET_NAMESPACE", namespace);
                }
                if !options.keyword_append_token.is_empty() {
                    command.env("SBE_KEYWORD_APPEND_TOKEN", options.keyword_append_token);
                }
                command.arg(input);
                command
            }
            Generator::Jar(jar) => {
                let mut command = Command::new("java");
                command
                    .arg(property("sbe.output.dir", options.output_dir.display()))
                    .arg(property(
                        "sbe.target.language",
                        options.target_language.generator_name(),
                    ))
                    .arg(property("sbe.generate.ir", bool_str(options.generate_ir)))
                    .arg(property(
                        "sbe.generate.stubs",
                        bool_str(options.generate_stubs),
                    ));
                if let Some(namespace) = options.target_namespace {
                    command.arg(property("sbe.target.namespace", namespace));
                }
                if !options.keyword_append_token.is_empty() {
                    command.arg(property(
                        "sbe.keyword.append.token",
                        options.keyword_append_token,
                    ));
                }
                command.arg("-jar").arg(jar).arg(input);
                command
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn property(key: &str, value: impl std::fmt::Display) -> String {
    format!("-D{key}={value}")
}

/// Render a command for diagnostics: explicit child env, program, arguments.
fn render(command: &Command) -> String {
    let mut parts = Vec::new();
    for (key, value) in command.get_envs() {
        if let Some(value) = value {
            parts.push(format!(
                "{}={}",
                key.to_string_lossy(),
                value.to_string_lossy()
            ));
        }
    }
    parts.push(command.get_program().to_string_lossy().into_owned());
    parts.extend(
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned()),
    );
    parts.join(" ")
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL_LIMIT {
        return trimmed.to_string();
    }
    // Keep the end: generators print the actual failure last.
    let cut = trimmed.len() - STDERR_TAIL_LIMIT;
    let boundary = trimmed
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= cut)
        .unwrap_or(cut);
    format!("...{}", &trimmed[boundary..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(output_dir: &Path) -> Invocation<'_> {
        Invocation {
            generate_ir: true,
            generate_stubs: false,
            output_dir,
            target_language: Language::Rust,
            target_namespace: Some("com.example"),
            keyword_append_token: "_",
        }
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn explicit_jar_path_selects_java_launch() {
        let located = Generator::locate(Some(Path::new("/opt/sbe/sbe-all.jar"))).unwrap();
        assert_eq!(located, Generator::Jar(PathBuf::from("/opt/sbe/sbe-all.jar")));
    }

    #[test]
    fn explicit_executable_path_is_used_directly() {
        let located = Generator::locate(Some(Path::new("/usr/local/bin/sbe-tool"))).unwrap();
        assert_eq!(
            located,
            Generator::Executable(PathBuf::from("/usr/local/bin/sbe-tool"))
        );
    }

    // =========================================================================
    // Command assembly
    // =========================================================================

    #[test]
    fn executable_mode_passes_options_as_child_env() {
        let generator = Generator::Executable(PathBuf::from("/bin/sbe-tool"));
        let out = PathBuf::from("/tmp/out");
        let command = generator.command(&invocation(&out), Path::new("car.xml"));

        let envs: Vec<(String, String)> = command
            .get_envs()
            .filter_map(|(k, v)| {
                v.map(|v| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
            })
            .collect();
        assert!(envs.contains(&("SBE_OUTPUT_DIR".into(), "/tmp/out".into())));
        assert!(envs.contains(&("SBE_TARGET_LANGUAGE".into(), "Rust".into())));
        assert!(envs.contains(&("SBE_GENERATE_IR".into(), "true".into())));
        assert!(envs.contains(&("SBE_GENERATE_STUBS".into(), "false".into())));
        assert!(envs.contains(&("SBE_TARGET_NAMESPACE".into(), "com.example".into())));
        assert!(envs.contains(&("SBE_KEYWORD_APPEND_TOKEN".into(), "_".into())));

        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["car.xml"]);
    }

    #[test]
    fn jar_mode_passes_options_as_system_properties() {
        let generator = Generator::Jar(PathBuf::from("/opt/sbe-all.jar"));
        let out = PathBuf::from("/tmp/out");
        let command = generator.command(&invocation(&out), Path::new("car.xml"));

        assert_eq!(command.get_program(), "java");
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"-Dsbe.output.dir=/tmp/out".to_string()));
        assert!(args.contains(&"-Dsbe.target.language=Rust".to_string()));
        assert!(args.contains(&"-Dsbe.generate.ir=true".to_string()));
        assert!(args.contains(&"-Dsbe.generate.stubs=false".to_string()));
        assert!(args.contains(&"-Dsbe.target.namespace=com.example".to_string()));
        assert!(args.contains(&"-Dsbe.keyword.append.token=_".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("car.xml"));
        let jar_flag = args.iter().position(|a| a == "-jar").unwrap();
        assert_eq!(args[jar_flag + 1], "/opt/sbe-all.jar");
    }

    #[test]
    fn empty_token_and_missing_namespace_are_omitted() {
        let generator = Generator::Executable(PathBuf::from("/bin/sbe-tool"));
        let out = PathBuf::from("/tmp/out");
        let options = Invocation {
            generate_ir: false,
            generate_stubs: true,
            output_dir: &out,
            target_language: Language::Java,
            target_namespace: None,
            keyword_append_token: "",
        };
        let command = generator.command(&options, Path::new("car.xml"));
        let keys: Vec<String> = command
            .get_envs()
            .map(|(k, _)| k.to_string_lossy().into_owned())
            .collect();
        assert!(!keys.contains(&"SBE_TARGET_NAMESPACE".to_string()));
        assert!(!keys.contains(&"SBE_KEYWORD_APPEND_TOKEN".to_string()));
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    #[test]
    fn render_shows_env_program_and_args() {
        let generator = Generator::Executable(PathBuf::from("/bin/sbe-tool"));
        let out = PathBuf::from("/tmp/out");
        let command = generator.command(&invocation(&out), Path::new("car.xml"));
        let rendered = render(&command);
        assert!(rendered.contains("SBE_GENERATE_IR=true"));
        assert!(rendered.contains("/bin/sbe-tool"));
        assert!(rendered.ends_with("car.xml"));
    }

    #[test]
    fn long_stderr_keeps_the_tail() {
        let noise = "x".repeat(1000);
        let stderr = format!("{noise}\nactual failure here");
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("..."));
        assert!(tail.ends_with("actual failure here"));
        assert!(tail.len() <= STDERR_TAIL_LIMIT + 3);
    }
}
