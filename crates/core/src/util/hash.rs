//! File hashing behind the registry checksum cache.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

/// Digest algorithms available for artifact checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
  Sha224,
  Sha256,
  Sha384,
  Sha512,
}

impl HashAlgorithm {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sha224 => "sha224",
      Self::Sha256 => "sha256",
      Self::Sha384 => "sha384",
      Self::Sha512 => "sha512",
    }
  }
}

impl std::fmt::Display for HashAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for HashAlgorithm {
  type Err = HashError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sha224" => Ok(Self::Sha224),
      "sha256" => Ok(Self::Sha256),
      "sha384" => Ok(Self::Sha384),
      "sha512" => Ok(Self::Sha512),
      other => Err(HashError::UnknownAlgorithm(other.to_string())),
    }
  }
}

/// Error during checksum computation.
#[derive(Debug, Error)]
pub enum HashError {
  #[error("failed to read {path}: {message}")]
  ReadFile { path: String, message: String },

  #[error("unknown hash algorithm: {0}")]
  UnknownAlgorithm(String),
}

/// Hash a file's contents, returning the lowercase hex digest.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String, HashError> {
  match algorithm {
    HashAlgorithm::Sha224 => digest_file::<Sha224>(path),
    HashAlgorithm::Sha256 => digest_file::<Sha256>(path),
    HashAlgorithm::Sha384 => digest_file::<Sha384>(path),
    HashAlgorithm::Sha512 => digest_file::<Sha512>(path),
  }
}

fn digest_file<D: Digest>(path: &Path) -> Result<String, HashError> {
  let read_err = |e: std::io::Error| HashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = D::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(hex::encode(hasher.finalize()))
}
