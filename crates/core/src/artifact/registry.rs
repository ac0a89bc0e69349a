//! Concurrency-safe artifact registry.
//!
//! One registry instance is shared process-wide per run. Parallel build
//! workers append to it as they finish, so insertion order is completion
//! order, not target order; downstream stages query it through filter views
//! that preserve insertion order and never mutate the base log.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::util::hash::{self, HashAlgorithm, HashError};

use super::filter::Filter;
use super::Artifact;

/// The append-only artifact log plus its checksum cache.
///
/// The log and the cache are guarded independently: checksum file reads
/// never block producers appending new artifacts, and filter evaluation
/// happens on a snapshot taken under a short lock hold.
#[derive(Debug, Default)]
pub struct Registry {
  items: Mutex<Vec<Arc<Artifact>>>,
  checksums: Mutex<HashMap<(PathBuf, HashAlgorithm), String>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an artifact to the log. Safe under concurrent calls from
  /// parallel build workers. Returns the shared handle so the producer can
  /// keep annotating it.
  pub fn add(&self, artifact: Artifact) -> Arc<Artifact> {
    debug!(artifact = %artifact, "registering artifact");
    let artifact = Arc::new(artifact);
    let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
    items.push(Arc::clone(&artifact));
    artifact
  }

  /// Snapshot of the current log contents, in insertion order.
  pub fn list(&self) -> Vec<Arc<Artifact>> {
    self.items.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Artifacts for which the predicate holds, in insertion order.
  ///
  /// The lock is released before the predicate runs, so expensive filter
  /// trees never block concurrent producers.
  pub fn filter(&self, filter: &Filter) -> ArtifactView {
    ArtifactView(self.list()).filter(filter)
  }

  /// Group artifacts by their attached build id. Artifacts without an id
  /// belong to no logical package and are omitted.
  pub fn group_by_id(&self) -> BTreeMap<String, Vec<Arc<Artifact>>> {
    group_by_id(&self.list())
  }

  /// The digest of the artifact's file under the given algorithm.
  ///
  /// Computed from file contents on the first call per (path, algorithm) and
  /// cached for the lifetime of the registry. The cache lock is held across
  /// the read, so concurrent callers wait for the digest instead of reading
  /// the same file twice. Failures are returned to the caller and not
  /// cached.
  pub fn checksum(&self, artifact: &Artifact, algorithm: HashAlgorithm) -> Result<String, HashError> {
    let key = (artifact.path.clone(), algorithm);
    let mut cache = self.checksums.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(digest) = cache.get(&key) {
      return Ok(digest.clone());
    }
    let digest = hash::hash_file(&artifact.path, algorithm)?;
    cache.insert(key, digest.clone());
    Ok(digest)
  }
}

/// A non-mutating, insertion-ordered view over registered artifacts.
///
/// Views are cheap (shared handles), chainable, and detached from the
/// registry: artifacts added after the view was taken are not part of it.
#[derive(Debug, Clone, Default)]
pub struct ArtifactView(Vec<Arc<Artifact>>);

impl ArtifactView {
  /// Narrow the view to artifacts matching the predicate.
  pub fn filter(&self, filter: &Filter) -> ArtifactView {
    ArtifactView(
      self
        .0
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect(),
    )
  }

  pub fn list(&self) -> &[Arc<Artifact>] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn group_by_id(&self) -> BTreeMap<String, Vec<Arc<Artifact>>> {
    group_by_id(&self.0)
  }
}

impl IntoIterator for ArtifactView {
  type Item = Arc<Artifact>;
  type IntoIter = std::vec::IntoIter<Arc<Artifact>>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

fn group_by_id(items: &[Arc<Artifact>]) -> BTreeMap<String, Vec<Arc<Artifact>>> {
  let mut groups: BTreeMap<String, Vec<Arc<Artifact>>> = BTreeMap::new();
  for artifact in items {
    if let Some(id) = artifact.id() {
      groups.entry(id).or_default().push(Arc::clone(artifact));
    }
  }
  groups
}
