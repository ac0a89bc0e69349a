//! Toolchain version probe.
//!
//! Runs `<binary> version` to learn which toolchain a build will use. The
//! resolver feeds the parsed version into its deprecation gates.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from probing the toolchain binary.
#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The binary could not be spawned at all.
  #[error("failed to run {binary}: {source}")]
  Spawn {
    binary: String,
    #[source]
    source: std::io::Error,
  },

  /// The binary ran but exited non-zero.
  #[error("{binary} version exited with {}: {stderr}", exit_label(.code))]
  Exited {
    binary: String,
    code: Option<i32>,
    stderr: String,
  },
}

fn exit_label(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("code {code}"),
    None => "a signal".to_string(),
  }
}

/// A probed toolchain version, ordered by (major, minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolchainVersion {
  pub major: u32,
  pub minor: u32,
}

impl ToolchainVersion {
  pub const fn new(major: u32, minor: u32) -> Self {
    Self { major, minor }
  }
}

impl std::fmt::Display for ToolchainVersion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}.{}", self.major, self.minor)
  }
}

/// Run `<binary> version` and return its raw stdout, trimmed.
///
/// `work_dir` becomes the subprocess working directory only when it is
/// accessible, so relative toolchain paths resolve against the project being
/// built; otherwise the subprocess inherits the caller's working directory.
pub async fn probe(binary: &Path, work_dir: &Path) -> Result<String, ToolchainError> {
  let mut command = Command::new(binary);
  command.arg("version");
  if std::fs::metadata(work_dir).is_ok() {
    command.current_dir(work_dir);
  }

  debug!(binary = %binary.display(), "probing toolchain version");

  let output = command.output().await.map_err(|e| ToolchainError::Spawn {
    binary: binary.display().to_string(),
    source: e,
  })?;

  if !output.status.success() {
    return Err(ToolchainError::Exited {
      binary: binary.display().to_string(),
      code: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract the toolchain version from raw `go version` output.
///
/// Accepts strings like `go version go1.16.5 linux/amd64` and pre-release
/// forms like `go1.21rc1`. Returns `None` for devel builds or anything else
/// that carries no `goX.Y` token.
pub fn parse_version(raw: &str) -> Option<ToolchainVersion> {
  let token = raw.split_whitespace().find(|t| {
    t.strip_prefix("go")
      .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
  })?;
  let rest = token.strip_prefix("go")?;
  let mut parts = rest.split('.');
  let major = leading_number(parts.next()?)?;
  let minor = match parts.next() {
    Some(part) => leading_number(part)?,
    None => 0,
  };
  Some(ToolchainVersion::new(major, minor))
}

fn leading_number(s: &str) -> Option<u32> {
  let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
  digits.parse().ok()
}
