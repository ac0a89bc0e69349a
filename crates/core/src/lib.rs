//! slipway-core: the shared core of the slipway release pipeline.
//!
//! This crate provides the pieces every packaging integration depends on:
//! - `target`: the build target matrix resolver (goos/goarch expansion,
//!   whitelist validation, version gates, ignore rules)
//! - `toolchain`: the toolchain version probe
//! - `artifact`: the concurrency-safe artifact registry and its filter algebra
//! - `pipeline`: the bounded, fail-fast-but-drain task group used to run one
//!   build task per resolved target
//! - `util`: shared hashing utilities backing the registry checksum cache

pub mod artifact;
pub mod pipeline;
pub mod target;
pub mod toolchain;
pub mod util;
