use std::path::PathBuf;

/// The external SBE generator could not be located.
///
/// Carries the discovery attempts so the rendered diagnostic tells the user
/// exactly what was tried and in which order.
#[derive(Debug)]
pub struct ToolNotFound {
    /// Human-readable description of each discovery step, in order tried.
    pub attempted: Vec<String>,
}

impl std::fmt::Display for ToolNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no SBE generator found (tried: {})",
            self.attempted.join(", ")
        )
    }
}

impl std::error::Error for ToolNotFound {}

impl miette::Diagnostic for ToolNotFound {
    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(
            "set SBE_TOOL to the generator executable, SBE_JAR to the sbe-all jar, \
             or install `sbe-tool` on PATH",
        ))
    }
}

/// The external generator ran and exited with a failure status.
#[derive(Debug)]
pub struct ToolFailure {
    /// Rendered command line, including the option environment for
    /// executable-style invocations.
    pub command: String,
    /// Child exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Tail of the child's stderr, trimmed to a few lines.
    pub stderr_tail: String,
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "external generator exited with status {code}"),
            None => write!(f, "external generator was terminated by a signal"),
        }?;
        if !self.stderr_tail.is_empty() {
            write!(f, ": {}", self.stderr_tail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolFailure {}

impl miette::Diagnostic for ToolFailure {
    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(format!("command was: {}", self.command)))
    }
}

/// An IR cache file was readable but empty, which no generator run produces.
#[derive(Debug)]
pub struct EmptyIrCache {
    pub path: PathBuf,
}

impl std::fmt::Display for EmptyIrCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IR cache file {} is empty", self.path.display())
    }
}

impl std::error::Error for EmptyIrCache {}

impl miette::Diagnostic for EmptyIrCache {
    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(
            "regenerate the cache from its source schema (enable IR generation \
             and pass the .xml schema instead)",
        ))
    }
}

/// A target-language name that the generator does not recognize.
#[derive(Debug)]
pub struct UnknownLanguage {
    pub name: String,
}

impl std::fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown target language `{}`", self.name)
    }
}

impl std::error::Error for UnknownLanguage {}

impl miette::Diagnostic for UnknownLanguage {
    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(
            "recognized languages: rust, java, cpp, golang, csharp",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_includes_status_and_stderr() {
        let err = ToolFailure {
            command: "sbe-tool car.xml".to_string(),
            status: Some(3),
            stderr_tail: "schema validation failed".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("status 3"));
        assert!(rendered.contains("schema validation failed"));
    }

    #[test]
    fn tool_failure_signal_death_has_no_status() {
        let err = ToolFailure {
            command: "sbe-tool car.xml".to_string(),
            status: None,
            stderr_tail: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn tool_not_found_lists_attempts() {
        let err = ToolNotFound {
            attempted: vec!["SBE_TOOL (unset)".to_string(), "PATH".to_string()],
        };
        assert!(err.to_string().contains("SBE_TOOL (unset)"));
        assert!(err.to_string().contains("PATH"));
    }
}
