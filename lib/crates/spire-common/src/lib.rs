//! Document schemas shared by the SPIRE supply step.
//!
//! Everything here is plain serde data: the platform service binding
//! (`VCAP_SERVICES`), the user override document (`buildpack.yml`) and the
//! buildpack manifest (`manifest.yml`).

pub mod binding;
pub mod config;

pub use binding::{BindingError, ServiceBinding, UserProvided, VCAP_SERVICES};
pub use config::{BuildpackConfig, BuildpackManifest, SpireAgentConfig};
