//! Filter predicate algebra over artifacts.
//!
//! Every packaging integration selects its inputs by building a filter tree
//! out of attribute atoms and the `And`/`Or`/`Not` combinators, then handing
//! it to the registry. The algebra is one recursive enum with one recursive
//! matcher, so its laws hold independently of any registry state:
//! `And([])` is always true, `Or([])` is always false, and `Not` is a strict
//! complement.
//!
//! Atoms compare exactly, including against the empty string. A
//! `by_goarm("")` atom therefore selects artifacts *without* an arm variant,
//! unlike ignore rules, whose unset fields are wildcards.

use super::{Artifact, ArtifactType};

/// A predicate over artifacts.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  And(Vec<Filter>),
  Or(Vec<Filter>),
  Not(Box<Filter>),
  ByGoos(String),
  ByGoarch(String),
  ByGoarm(String),
  ByGomips(String),
  ByGoamd64(String),
  ByType(ArtifactType),
  ByIDs(Vec<String>),
  ByFormats(Vec<String>),
  ByBinaryName(String),
}

impl Filter {
  pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
    Self::And(filters.into_iter().collect())
  }

  pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
    Self::Or(filters.into_iter().collect())
  }

  pub fn not(filter: Filter) -> Self {
    Self::Not(Box::new(filter))
  }

  pub fn by_goos(goos: impl Into<String>) -> Self {
    Self::ByGoos(goos.into())
  }

  pub fn by_goarch(goarch: impl Into<String>) -> Self {
    Self::ByGoarch(goarch.into())
  }

  pub fn by_goarm(goarm: impl Into<String>) -> Self {
    Self::ByGoarm(goarm.into())
  }

  pub fn by_gomips(gomips: impl Into<String>) -> Self {
    Self::ByGomips(gomips.into())
  }

  pub fn by_goamd64(goamd64: impl Into<String>) -> Self {
    Self::ByGoamd64(goamd64.into())
  }

  pub fn by_type(kind: ArtifactType) -> Self {
    Self::ByType(kind)
  }

  pub fn by_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self::ByIDs(ids.into_iter().map(Into::into).collect())
  }

  pub fn by_formats(formats: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self::ByFormats(formats.into_iter().map(Into::into).collect())
  }

  pub fn by_binary_name(name: impl Into<String>) -> Self {
    Self::ByBinaryName(name.into())
  }

  /// Evaluate this predicate against one artifact.
  pub fn matches(&self, artifact: &Artifact) -> bool {
    match self {
      Self::And(filters) => filters.iter().all(|f| f.matches(artifact)),
      Self::Or(filters) => filters.iter().any(|f| f.matches(artifact)),
      Self::Not(filter) => !filter.matches(artifact),
      Self::ByGoos(goos) => artifact.goos == *goos,
      Self::ByGoarch(goarch) => artifact.goarch == *goarch,
      Self::ByGoarm(goarm) => artifact.goarm == *goarm,
      Self::ByGomips(gomips) => artifact.gomips == *gomips,
      Self::ByGoamd64(goamd64) => artifact.goamd64 == *goamd64,
      Self::ByType(kind) => artifact.kind == *kind,
      Self::ByIDs(ids) => artifact.id().is_some_and(|id| ids.contains(&id)),
      Self::ByFormats(formats) => artifact.format().is_some_and(|f| formats.contains(&f)),
      Self::ByBinaryName(name) => artifact.binary().is_some_and(|b| b == *name),
    }
  }
}
