// ==============================================================================
// Shared Test Harness: Fake External Generator
// ==============================================================================
//
// The crate under test delegates all real work to an external generator, so
// the tests install a fake one: a shell script that appends one line per
// invocation to a log file and fabricates the outputs the real generator
// would produce (a `<stem>.sbeir` cache in IR mode, a `<stem>_codec.rs` stub
// in stub mode). A failure stem can be baked in to simulate a generator
// crash on a specific schema.
//
// The script-based fake is Unix-only; tests that need it are gated.

#![allow(dead_code)] // each test binary uses its own subset of helpers

use std::fs;
use std::path::{Path, PathBuf};

/// Minimal schema file content. The fake generator never reads it; only the
/// filename matters for dispatch.
const SCHEMA_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbe:messageSchema xmlns:sbe="http://fixprotocol.io/2016/sbe" package="test" id="1" version="0">
</sbe:messageSchema>
"#;

/// Write `<name>.xml` under `dir` and return its path.
pub fn write_schema(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{name}.xml"));
    fs::write(&path, SCHEMA_XML).expect("write schema fixture");
    path
}

/// Write `<name>.sbeir` under `dir` with the same bytes the fake generator
/// produces for that stem, and return its path.
pub fn write_ir_cache(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{name}.sbeir"));
    fs::write(&path, format!("fake-ir:{name}")).expect("write IR cache fixture");
    path
}

#[cfg(unix)]
const SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
set -eu
input="$1"
name=$(basename "$input")
stem="${name%.*}"
printf 'ir=%s stubs=%s lang=%s ns=%s token=%s input=%s\n' \
    "$SBE_GENERATE_IR" "$SBE_GENERATE_STUBS" "$SBE_TARGET_LANGUAGE" \
    "${SBE_TARGET_NAMESPACE-}" "${SBE_KEYWORD_APPEND_TOKEN-}" "$name" >> '@LOG@'
if [ "$stem" = '@FAIL@' ]; then
    echo "fake generator refusing $stem" >&2
    exit 3
fi
if [ "$SBE_GENERATE_IR" = 'true' ]; then
    printf 'fake-ir:%s' "$stem" > "$SBE_OUTPUT_DIR/$stem.sbeir"
fi
if [ "$SBE_GENERATE_STUBS" = 'true' ]; then
    printf '// fake stub for %s\n' "$stem" > "$SBE_OUTPUT_DIR/${stem}_codec.rs"
fi
"#;

/// A fake generator installation: the script plus its invocation log.
#[cfg(unix)]
pub struct FakeTool {
    dir: tempfile::TempDir,
}

#[cfg(unix)]
impl FakeTool {
    /// Install a fake generator that succeeds on every input.
    pub fn install() -> FakeTool {
        Self::with_failure_stem("__never__")
    }

    /// Install a fake generator that exits non-zero when handed an input
    /// whose stem equals `stem`.
    pub fn failing_on(stem: &str) -> FakeTool {
        Self::with_failure_stem(stem)
    }

    fn with_failure_stem(stem: &str) -> FakeTool {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("create fake tool directory");
        let log = dir.path().join("invocations.log");
        let script = SCRIPT_TEMPLATE
            .replace("@LOG@", &log.display().to_string())
            .replace("@FAIL@", stem);

        let path = dir.path().join("sbe-tool");
        fs::write(&path, script).expect("write fake tool script");
        let mut perms = fs::metadata(&path)
            .expect("stat fake tool script")
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("mark fake tool executable");

        FakeTool { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("sbe-tool")
    }

    /// One line per generator invocation, oldest first. Empty if the
    /// generator was never run.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(self.dir.path().join("invocations.log")) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}
