//! Target matrix resolution.
//!
//! Expansion walks goos, then goarch, then the arch-specific variant list, so
//! the output order is fully determined by the spec's list order. Validation
//! is fail-fast: the first invalid field value anywhere aborts the whole call
//! with no partial result. Unsupported OS/arch combinations are dropped
//! without a diagnostic, while toolchain-version gates drop with a warning;
//! the asymmetry is deliberate and matched by the documented behavior table.

use thiserror::Error;
use tracing::{debug, warn};

use crate::toolchain::{self, ToolchainError, ToolchainVersion};

use super::tables;
use super::{BuildSpec, Target};

/// Minimum toolchain version able to build darwin/arm64.
const MIN_DARWIN_ARM64: ToolchainVersion = ToolchainVersion::new(1, 16);
/// Minimum toolchain version able to build windows/arm64.
const MIN_WINDOWS_ARM64: ToolchainVersion = ToolchainVersion::new(1, 17);

/// Errors from resolving a build spec into targets.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("invalid goos: {0}")]
  InvalidGoos(String),

  #[error("invalid goarch: {0}")]
  InvalidGoarch(String),

  #[error("invalid goarm: {0}")]
  InvalidGoarm(String),

  #[error("invalid gomips: {0}")]
  InvalidGomips(String),

  #[error("probing toolchain version: {0}")]
  Probe(#[from] ToolchainError),
}

/// Resolve the target matrix for a build spec.
///
/// Probes the toolchain named by the spec, then delegates to
/// [`resolve_for_version`]. A probe failure aborts resolution.
pub async fn resolve(spec: &BuildSpec) -> Result<Vec<Target>, ResolveError> {
  let raw = toolchain::probe(&spec.toolchain, &spec.work_dir).await?;
  let version = toolchain::parse_version(&raw);
  if version.is_none() {
    debug!(output = %raw, "unparseable toolchain version, version gates disabled");
  }
  resolve_for_version(spec, version)
}

/// Resolve the target matrix for a build spec and an already-probed toolchain
/// version.
///
/// Pure: identical (spec, version) inputs produce identical output. A
/// `version` of `None` (devel toolchains) disables the version gates.
pub fn resolve_for_version(
  spec: &BuildSpec,
  version: Option<ToolchainVersion>,
) -> Result<Vec<Target>, ResolveError> {
  let mut targets = Vec::new();
  for target in expand(spec) {
    validate(&target)?;
    if !tables::supported(&target.goos, &target.goarch) {
      continue;
    }
    if gated(&target, version) {
      continue;
    }
    if spec.ignore.iter().any(|rule| rule.matches(&target)) {
      debug!(target = %target, "skipping ignored target");
      continue;
    }
    targets.push(target);
  }
  Ok(targets)
}

/// Expand the full goos x goarch x variant matrix, in spec list order.
fn expand(spec: &BuildSpec) -> Vec<Target> {
  let mut targets = Vec::new();
  for goos in &spec.goos {
    let goos = goos.as_str();
    for goarch in &spec.goarch {
      let goarch = goarch.as_str();
      match goarch {
        "arm" => {
          for goarm in &spec.goarm {
            targets.push(Target::new(goos, goarch).with_goarm(goarm.as_str()));
          }
        }
        "amd64" => {
          for goamd64 in &spec.goamd64 {
            targets.push(Target::new(goos, goarch).with_goamd64(goamd64.as_str()));
          }
        }
        arch if arch.starts_with("mips") => {
          for gomips in &spec.gomips {
            targets.push(Target::new(goos, goarch).with_gomips(gomips.as_str()));
          }
        }
        _ => targets.push(Target::new(goos, goarch)),
      }
    }
  }
  targets
}

fn validate(target: &Target) -> Result<(), ResolveError> {
  if !tables::VALID_GOOS.contains(&target.goos.as_str()) {
    return Err(ResolveError::InvalidGoos(target.goos.clone()));
  }
  if !tables::VALID_GOARCH.contains(&target.goarch.as_str()) {
    return Err(ResolveError::InvalidGoarch(target.goarch.clone()));
  }
  if !target.goarm.is_empty() && !tables::VALID_GOARM.contains(&target.goarm.as_str()) {
    return Err(ResolveError::InvalidGoarm(target.goarm.clone()));
  }
  if !target.gomips.is_empty() && !tables::VALID_GOMIPS.contains(&target.gomips.as_str()) {
    return Err(ResolveError::InvalidGomips(target.gomips.clone()));
  }
  Ok(())
}

/// Whether a target is gated behind a newer toolchain than the probed one.
///
/// An unknown version keeps every gate open.
fn gated(target: &Target, version: Option<ToolchainVersion>) -> bool {
  let Some(version) = version else {
    return false;
  };
  let minimum = match (target.goos.as_str(), target.goarch.as_str()) {
    ("darwin", "arm64") => MIN_DARWIN_ARM64,
    ("windows", "arm64") => MIN_WINDOWS_ARM64,
    _ => return false,
  };
  if version < minimum {
    warn!(
      target = %target,
      toolchain = %version,
      required = %minimum,
      "toolchain too old for target, skipping"
    );
    return true;
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::target::IgnoreRule;
  use tracing_test::traced_test;

  fn spec(goos: &[&str], goarch: &[&str]) -> BuildSpec {
    BuildSpec {
      goos: goos.iter().map(|s| s.to_string()).collect(),
      goarch: goarch.iter().map(|s| s.to_string()).collect(),
      ..BuildSpec::default()
    }
  }

  fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  fn rendered(targets: &[Target]) -> Vec<String> {
    targets.iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn resolves_in_goos_goarch_variant_order() {
    let mut spec = spec(&["linux", "darwin"], &["amd64", "arm"]);
    spec.goamd64 = strings(&["v1"]);
    spec.goarm = strings(&["6", "7"]);
    let targets = resolve_for_version(&spec, None).unwrap();
    // darwin/arm is not a buildable combination, so it is absent.
    assert_eq!(
      rendered(&targets),
      vec!["linux_amd64_v1", "linux_arm_6", "linux_arm_7", "darwin_amd64_v1"]
    );
  }

  #[test]
  fn resolution_is_deterministic() {
    let mut spec = spec(&["linux", "windows"], &["amd64", "arm", "mips"]);
    spec.goamd64 = strings(&["v1", "v2"]);
    spec.goarm = strings(&["5", "6", "7"]);
    spec.gomips = strings(&["hardfloat", "softfloat"]);
    let first = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 20))).unwrap();
    let second = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 20))).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn invalid_goos_aborts_with_no_partial_result() {
    let spec = spec(&["bogus"], &["arm64"]);
    let err = resolve_for_version(&spec, None).unwrap_err();
    assert_eq!(err.to_string(), "invalid goos: bogus");
  }

  #[test]
  fn invalid_goarch_aborts() {
    let err = resolve_for_version(&spec(&["linux"], &["pdp11"]), None).unwrap_err();
    assert_eq!(err.to_string(), "invalid goarch: pdp11");
  }

  #[test]
  fn invalid_goarm_aborts() {
    let mut spec = spec(&["linux"], &["arm"]);
    spec.goarm = strings(&["4"]);
    let err = resolve_for_version(&spec, None).unwrap_err();
    assert_eq!(err.to_string(), "invalid goarm: 4");
  }

  #[test]
  fn invalid_gomips_aborts() {
    let mut spec = spec(&["linux"], &["mips64le"]);
    spec.gomips = strings(&["emulated"]);
    let err = resolve_for_version(&spec, None).unwrap_err();
    assert_eq!(err.to_string(), "invalid gomips: emulated");
  }

  #[test]
  fn validation_runs_before_supported_combination_check() {
    // freebsd/mips is not buildable, but the bad gomips value must still
    // fail the whole call rather than being dropped with the combination.
    let mut spec = spec(&["freebsd"], &["mips"]);
    spec.gomips = strings(&["emulated"]);
    assert!(resolve_for_version(&spec, None).is_err());
  }

  #[test]
  fn unsupported_combinations_are_dropped_silently() {
    let targets = resolve_for_version(&spec(&["windows"], &["riscv64"]), None).unwrap();
    assert!(targets.is_empty());
  }

  #[test]
  fn ignore_rule_with_variant_removes_only_that_variant() {
    let mut spec = spec(&["linux"], &["arm"]);
    spec.goarm = strings(&["6", "7"]);
    spec.ignore = vec![IgnoreRule {
      goos: Some("linux".to_string()),
      goarch: Some("arm".to_string()),
      goarm: Some("7".to_string()),
      ..IgnoreRule::default()
    }];
    let targets = resolve_for_version(&spec, None).unwrap();
    assert_eq!(rendered(&targets), vec!["linux_arm_6"]);
  }

  #[test]
  fn wildcard_ignore_rule_removes_whole_goos() {
    let mut spec = spec(&["linux", "darwin"], &["arm64"]);
    spec.ignore = vec![IgnoreRule {
      goos: Some("darwin".to_string()),
      ..IgnoreRule::default()
    }];
    let targets = resolve_for_version(&spec, None).unwrap();
    assert_eq!(rendered(&targets), vec!["linux_arm64"]);
  }

  #[test]
  fn darwin_arm64_needs_go_1_16() {
    let spec = spec(&["darwin"], &["arm64"]);
    let old = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 15))).unwrap();
    assert!(old.is_empty());
    let new = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 16))).unwrap();
    assert_eq!(rendered(&new), vec!["darwin_arm64"]);
  }

  #[test]
  fn windows_arm64_needs_go_1_17() {
    let spec = spec(&["windows"], &["arm64"]);
    let old = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 16))).unwrap();
    assert!(old.is_empty());
    let new = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 17))).unwrap();
    assert_eq!(rendered(&new), vec!["windows_arm64"]);
  }

  #[traced_test]
  #[test]
  fn version_gate_drop_is_warned() {
    let spec = spec(&["darwin"], &["arm64"]);
    let targets = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 15))).unwrap();
    assert!(targets.is_empty());
    assert!(logs_contain("toolchain too old for target"));
  }

  #[test]
  fn unknown_version_keeps_gates_open() {
    let spec = spec(&["darwin", "windows"], &["arm64"]);
    let targets = resolve_for_version(&spec, None).unwrap();
    assert_eq!(rendered(&targets), vec!["darwin_arm64", "windows_arm64"]);
  }

  #[test]
  fn gates_apply_before_ignore_rules() {
    // The ignore rule would also drop darwin/arm64; the gate sees it first
    // and the result is the same either way.
    let mut spec = spec(&["darwin"], &["arm64"]);
    spec.ignore = vec![IgnoreRule {
      goos: Some("darwin".to_string()),
      ..IgnoreRule::default()
    }];
    let targets = resolve_for_version(&spec, Some(ToolchainVersion::new(1, 15))).unwrap();
    assert!(targets.is_empty());
  }

  #[test]
  fn empty_variant_list_yields_no_targets_for_that_arch() {
    let targets = resolve_for_version(&spec(&["linux"], &["amd64"]), None).unwrap();
    assert!(targets.is_empty());
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn resolve_probes_the_spec_toolchain() {
    // `echo version` stands in for a toolchain; its output parses to no
    // version, so the gates stay open.
    let mut spec = spec(&["darwin"], &["arm64"]);
    spec.toolchain = "/bin/echo".into();
    spec.work_dir = ".".into();
    let targets = resolve(&spec).await.unwrap();
    assert_eq!(rendered(&targets), vec!["darwin_arm64"]);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn resolve_fails_when_the_probe_fails() {
    let mut spec = spec(&["linux"], &["arm64"]);
    spec.toolchain = "/no/such/toolchain".into();
    let err = resolve(&spec).await.unwrap_err();
    assert!(matches!(err, ResolveError::Probe(_)));
    assert!(err.to_string().contains("/no/such/toolchain"), "got: {err}");
  }

  #[test]
  fn mips_family_multiplies_by_gomips() {
    let mut spec = spec(&["linux"], &["mips", "mipsle", "mips64", "mips64le"]);
    spec.gomips = strings(&["hardfloat", "softfloat"]);
    let targets = resolve_for_version(&spec, None).unwrap();
    assert_eq!(targets.len(), 8);
    assert_eq!(targets[0].to_string(), "linux_mips_hardfloat");
    assert_eq!(targets[7].to_string(), "linux_mips64le_softfloat");
  }
}
