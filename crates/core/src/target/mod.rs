//! Build target matrix.
//!
//! A [`Target`] is one resolved (OS, architecture, optional variant)
//! cross-compilation unit. [`resolve`] expands a [`BuildSpec`] into the
//! ordered list of targets a run will build for, after validating every
//! field, dropping unsupported OS/arch combinations and targets gated on the
//! probed toolchain version, and applying user ignore rules.

pub mod resolve;
pub mod tables;

pub use resolve::{ResolveError, resolve, resolve_for_version};

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One cross-compilation target.
///
/// Exactly one of `goarm`, `gomips` and `goamd64` is populated, chosen by
/// `goarch`: `goarm` for `arm`, `gomips` for the `mips*` family, `goamd64`
/// for `amd64`. Every other architecture carries no variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
  pub goos: String,
  pub goarch: String,
  #[serde(default)]
  pub goarm: String,
  #[serde(default)]
  pub gomips: String,
  #[serde(default)]
  pub goamd64: String,
}

impl Target {
  pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
    Self {
      goos: goos.into(),
      goarch: goarch.into(),
      ..Self::default()
    }
  }

  pub fn with_goarm(mut self, goarm: impl Into<String>) -> Self {
    self.goarm = goarm.into();
    self
  }

  pub fn with_gomips(mut self, gomips: impl Into<String>) -> Self {
    self.gomips = gomips.into();
    self
  }

  pub fn with_goamd64(mut self, goamd64: impl Into<String>) -> Self {
    self.goamd64 = goamd64.into();
    self
  }

  /// Returns the variant field for this target's architecture, or the empty
  /// string for architectures without one.
  pub fn variant(&self) -> &str {
    if !self.goarm.is_empty() {
      &self.goarm
    } else if !self.gomips.is_empty() {
      &self.gomips
    } else {
      &self.goamd64
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}", self.goos, self.goarch)?;
    let variant = self.variant();
    if !variant.is_empty() {
      write!(f, "_{}", variant)?;
    }
    Ok(())
  }
}

/// A validated build specification, produced by the (out of scope)
/// configuration layer.
///
/// The variant lists (`goarm`, `gomips`, `goamd64`) only multiply the matrix
/// for the architectures that use them; an empty variant list yields no
/// targets for those architectures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSpec {
  pub goos: Vec<String>,
  pub goarch: Vec<String>,
  #[serde(default)]
  pub goarm: Vec<String>,
  #[serde(default)]
  pub gomips: Vec<String>,
  #[serde(default)]
  pub goamd64: Vec<String>,
  #[serde(default)]
  pub ignore: Vec<IgnoreRule>,
  /// Path to the toolchain binary used for the version probe.
  pub toolchain: PathBuf,
  /// Working directory for the version probe, so relative toolchain paths
  /// resolve against the project being built.
  pub work_dir: PathBuf,
}

/// A user exclusion applied to the resolved target matrix.
///
/// Unset fields are wildcards: a rule matches a target when every field it
/// sets equals the target's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
  #[serde(default)]
  pub goos: Option<String>,
  #[serde(default)]
  pub goarch: Option<String>,
  #[serde(default)]
  pub goarm: Option<String>,
  #[serde(default)]
  pub gomips: Option<String>,
  #[serde(default)]
  pub goamd64: Option<String>,
}

impl IgnoreRule {
  pub fn matches(&self, target: &Target) -> bool {
    self.goos.as_ref().is_none_or(|v| *v == target.goos)
      && self.goarch.as_ref().is_none_or(|v| *v == target.goarch)
      && self.goarm.as_ref().is_none_or(|v| *v == target.goarm)
      && self.gomips.as_ref().is_none_or(|v| *v == target.gomips)
      && self.goamd64.as_ref().is_none_or(|v| *v == target.goamd64)
  }
}
