//! Shared fixtures: fake tools written as shell scripts

#![allow(dead_code)]

use genotask_core::application::PlinkTasks;
use genotask_core::domain::{FileSet, Toolset};
use genotask_core::port::time_provider::SystemTimeProvider;
use genotask_infra_system::subprocess_backend::DEFAULT_ENV_ALLOWLIST;
use genotask_infra_system::SubprocessBackend;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes the full triple for the stem passed with `--out`
pub const FULL_OUTPUT_TOOL: &str = r#"#!/bin/sh
out=""
list=""
while [ $# -gt 0 ]; do
  case "$1" in
    --out) out="$2"; shift ;;
    --list) list="$2"; shift ;;
  esac
  shift
done
if [ -n "$list" ]; then cat "$list"; fi
echo "writing $out"
touch "$out.bed" "$out.bim" "$out.fam"
"#;

/// Writes only the .bed of the triple
pub const BED_ONLY_TOOL: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --out) out="$2"; shift ;;
  esac
  shift
done
touch "$out.bed"
exit 3
"#;

/// Prints its arguments and succeeds without touching anything
pub const ECHO_TOOL: &str = "#!/bin/sh\necho \"$@\"\n";

pub fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn touch_fileset(stem: &Path) {
    for p in FileSet::from_stem(stem).into_paths() {
        std::fs::write(&p, b"").unwrap();
    }
}

/// Tool directory plus a service whose tools are all `body`
pub fn service_with(tool_dir: &Path, body: &str) -> PlinkTasks {
    let tool = write_tool(tool_dir, "tool.sh", body)
        .to_string_lossy()
        .into_owned();
    let echo = write_tool(tool_dir, "echo.sh", ECHO_TOOL)
        .to_string_lossy()
        .into_owned();
    service_with_tools(Toolset {
        plink: tool.clone(),
        plink_merge: tool,
        update_annotation: echo,
    })
}

pub fn service_with_tools(tools: Toolset) -> PlinkTasks {
    let backend = SubprocessBackend::new(
        Arc::new(SystemTimeProvider),
        DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
    );
    PlinkTasks::new(Arc::new(backend), tools)
}
