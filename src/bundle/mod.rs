// src/bundle/mod.rs

//! Bundle discovery and payload loading.
//!
//! - [`layout`] finds the bundle root and checks the assets directory, the
//!   ICU data file and the AOT payload are where the engine expects them.
//! - [`payload`] loads the AOT payload behind the [`PayloadLoader`] trait.

pub mod layout;
pub mod payload;

pub use layout::{BUNDLE_ENV_VAR, BundleLayout, TargetPlatform, resolve_bundle_root};
pub use payload::{AotPayload, PayloadFormat, PayloadLoader, REQUIRED_SYMBOLS, SnapshotPayloadLoader};
