//! Artifacts produced by a run and shared with packaging integrations.
//!
//! An [`Artifact`] is any tracked output file: a binary, an archive, a Linux
//! package, a checksum file, a package manifest. Artifacts are created once,
//! when the producing step completes, and are immutable afterwards except for
//! extra attachment. The `extra` map is the hand-off contract between
//! pipeline stages: each integration attaches its own private value under a
//! package-scoped key and reads it back, strongly typed, during publish.

pub mod filter;
pub mod registry;

pub use filter::Filter;
pub use registry::{ArtifactView, Registry};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extra key carrying the id of the build an artifact belongs to, used to
/// correlate multiple files of one logical package.
pub const EXTRA_ID: &str = "ID";
/// Extra key carrying the archive format of an artifact.
pub const EXTRA_FORMAT: &str = "Format";
/// Extra key carrying the name of the binary inside an artifact.
pub const EXTRA_BINARY: &str = "Binary";

/// The closed set of artifact kinds tracked by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactType {
  /// A compiled binary, before any packaging.
  #[default]
  Binary,
  /// A standalone binary to be uploaded as-is.
  UploadableBinary,
  /// A tar.gz/zip archive to be uploaded.
  UploadableArchive,
  /// A source archive to be uploaded.
  UploadableSourceArchive,
  /// A deb/rpm/apk package.
  LinuxPackage,
  /// A file of checksums covering other artifacts.
  ChecksumFile,
  /// A generated package manifest (formula, scoop manifest, ...).
  PackageManifest,
}

impl ArtifactType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Binary => "binary",
      Self::UploadableBinary => "uploadable-binary",
      Self::UploadableArchive => "uploadable-archive",
      Self::UploadableSourceArchive => "uploadable-source-archive",
      Self::LinuxPackage => "linux-package",
      Self::ChecksumFile => "checksum-file",
      Self::PackageManifest => "package-manifest",
    }
  }
}

impl fmt::Display for ArtifactType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Errors from typed extra access.
#[derive(Debug, Error)]
pub enum ExtraError {
  #[error("artifact {artifact} has no extra value under key {key}")]
  Missing { artifact: String, key: String },

  #[error("extra value {key} on artifact {artifact} has the wrong shape: {source}")]
  Decode {
    artifact: String,
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("extra value {key} is not serializable: {source}")]
  Encode {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Type-erased per-artifact side-channel storage.
///
/// Values are stored as JSON trees and retrieved through a generic,
/// type-checked accessor, so the registry stays type-agnostic while each
/// consumer gets a strongly-typed value or a clear failure. Interior locking
/// lets a later pipeline stage attach values to artifacts it matched through
/// a filter, without mutable access to the registry.
#[derive(Default)]
pub struct ExtraMap(RwLock<BTreeMap<String, serde_json::Value>>);

impl ExtraMap {
  fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
    self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn get(&self, key: &str) -> Option<serde_json::Value> {
    self.0.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
  }

  fn set(&self, key: String, value: serde_json::Value) {
    self.0.write().unwrap_or_else(PoisonError::into_inner).insert(key, value);
  }
}

impl Clone for ExtraMap {
  fn clone(&self) -> Self {
    Self(RwLock::new(self.snapshot()))
  }
}

impl fmt::Debug for ExtraMap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.snapshot().fmt(f)
  }
}

/// One tracked output file.
///
/// The platform fields mirror the target the artifact was built for and stay
/// empty for platform-independent artifacts (checksum files, manifests).
#[derive(Debug, Clone, Default)]
pub struct Artifact {
  pub name: String,
  pub path: PathBuf,
  pub kind: ArtifactType,
  pub goos: String,
  pub goarch: String,
  pub goarm: String,
  pub gomips: String,
  pub goamd64: String,
  pub extra: ExtraMap,
}

impl Artifact {
  pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: ArtifactType) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
      kind,
      ..Self::default()
    }
  }

  /// Copy the platform fields from a resolved target.
  pub fn for_target(mut self, target: &crate::target::Target) -> Self {
    self.goos = target.goos.clone();
    self.goarch = target.goarch.clone();
    self.goarm = target.goarm.clone();
    self.gomips = target.gomips.clone();
    self.goamd64 = target.goamd64.clone();
    self
  }

  /// Attach a typed extra value under `key`.
  pub fn set_extra<T: Serialize>(&self, key: &str, value: T) -> Result<(), ExtraError> {
    let value = serde_json::to_value(value).map_err(|e| ExtraError::Encode {
      key: key.to_string(),
      source: e,
    })?;
    self.extra.set(key.to_string(), value);
    Ok(())
  }

  /// Builder form of [`set_extra`](Self::set_extra) for artifact creation.
  pub fn with_extra<T: Serialize>(self, key: &str, value: T) -> Result<Self, ExtraError> {
    self.set_extra(key, value)?;
    Ok(self)
  }

  /// Typed retrieval of an extra value set earlier by a producer stage.
  pub fn extra<T: DeserializeOwned>(&self, key: &str) -> Result<T, ExtraError> {
    let value = self.extra.get(key).ok_or_else(|| ExtraError::Missing {
      artifact: self.name.clone(),
      key: key.to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| ExtraError::Decode {
      artifact: self.name.clone(),
      key: key.to_string(),
      source: e,
    })
  }

  /// Like [`extra`](Self::extra), for call sites where absence or a type
  /// mismatch is a programming error.
  ///
  /// # Panics
  ///
  /// Panics if the key is missing or the value does not deserialize to `T`.
  #[track_caller]
  pub fn must_extra<T: DeserializeOwned>(&self, key: &str) -> T {
    match self.extra(key) {
      Ok(value) => value,
      Err(e) => panic!("{e}"),
    }
  }

  /// The build id this artifact belongs to, if one was attached.
  pub fn id(&self) -> Option<String> {
    self.extra(EXTRA_ID).ok()
  }

  /// The archive format of this artifact, if one was attached.
  pub fn format(&self) -> Option<String> {
    self.extra(EXTRA_FORMAT).ok()
  }

  /// The binary name inside this artifact, if one was attached.
  pub fn binary(&self) -> Option<String> {
    self.extra(EXTRA_BINARY).ok()
  }
}

impl fmt::Display for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.kind)
  }
}
