//! Configuration subsystem
//!
//! The settings schema, its generic validation routine, the immutable
//! [`Settings`] snapshot, secret wrapping, and the single-slot cache.
//!
//! Data flow: env-style overrides → [`schema::resolve`] (coerce + per-field
//! bounds) → [`Settings::load`] (cross-field weight sums) → validated
//! snapshot, optionally memoized in a [`SettingsCache`].

pub mod cache;
pub mod schema;
pub mod secret;
pub mod settings;

pub use cache::SettingsCache;
pub use secret::{SecretString, SECRET_MASK};
pub use settings::{Environment, LogLevel, Settings, PARAMETER_VERSION, WEIGHT_SUM_TOLERANCE};
