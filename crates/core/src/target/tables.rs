//! Compiled-in platform tables.
//!
//! Field whitelists and the supported OS/arch combination table are process
//! constants. Lists follow <https://go.dev/doc/install/source#environment>.

pub static VALID_GOOS: &[&str] = &[
  "aix", "android", "darwin", "dragonfly", "freebsd", "illumos", "ios", "js", "linux", "netbsd",
  "openbsd", "plan9", "solaris", "windows", "wasip1",
];

pub static VALID_GOARCH: &[&str] = &[
  "386", "amd64", "arm", "arm64", "mips", "mips64", "mips64le", "mipsle", "ppc64", "ppc64le",
  "s390x", "wasm", "riscv64", "loong64",
];

pub static VALID_GOARM: &[&str] = &["5", "6", "7"];

pub static VALID_GOMIPS: &[&str] = &["hardfloat", "softfloat"];

/// Supported (goos, goarch) combinations. Pairs outside this table are
/// dropped from the resolved matrix without a diagnostic.
static SUPPORTED: &[(&str, &str)] = &[
  ("aix", "ppc64"),
  ("android", "386"),
  ("android", "amd64"),
  ("android", "arm"),
  ("android", "arm64"),
  ("darwin", "amd64"),
  ("darwin", "arm64"),
  ("dragonfly", "amd64"),
  ("freebsd", "386"),
  ("freebsd", "amd64"),
  ("freebsd", "arm"),
  ("freebsd", "arm64"),
  ("illumos", "amd64"),
  ("ios", "arm64"),
  ("js", "wasm"),
  ("wasip1", "wasm"),
  ("linux", "386"),
  ("linux", "amd64"),
  ("linux", "arm"),
  ("linux", "arm64"),
  ("linux", "ppc64"),
  ("linux", "ppc64le"),
  ("linux", "mips"),
  ("linux", "mipsle"),
  ("linux", "mips64"),
  ("linux", "mips64le"),
  ("linux", "s390x"),
  ("linux", "riscv64"),
  ("linux", "loong64"),
  ("netbsd", "386"),
  ("netbsd", "amd64"),
  ("netbsd", "arm"),
  ("netbsd", "arm64"),
  ("openbsd", "386"),
  ("openbsd", "amd64"),
  ("openbsd", "arm"),
  ("openbsd", "arm64"),
  ("plan9", "386"),
  ("plan9", "amd64"),
  ("plan9", "arm"),
  ("solaris", "amd64"),
  ("windows", "arm"),
  ("windows", "arm64"),
  ("windows", "386"),
  ("windows", "amd64"),
];

/// Whether the (goos, goarch) pair is a buildable combination.
pub fn supported(goos: &str, goarch: &str) -> bool {
  SUPPORTED.contains(&(goos, goarch))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn common_combinations_are_supported() {
    assert!(supported("linux", "amd64"));
    assert!(supported("darwin", "arm64"));
    assert!(supported("windows", "386"));
  }

  #[test]
  fn nonsense_combinations_are_not() {
    assert!(supported("linux", "riscv64"));
    assert!(!supported("windows", "riscv64"));
    assert!(!supported("darwin", "arm"));
    assert!(!supported("js", "amd64"));
  }

  #[test]
  fn every_supported_pair_uses_whitelisted_fields() {
    for (goos, goarch) in SUPPORTED {
      assert!(VALID_GOOS.contains(goos), "unknown goos {goos}");
      assert!(VALID_GOARCH.contains(goarch), "unknown goarch {goarch}");
    }
  }
}
