//! Core of the heading-sync backend.
//!
//! Events delivered by the host editor are routed to plugin sessions; the
//! heading-sync plugin reads the triggering note, extracts its first level-1
//! heading and, when warranted, asks the host to rename the file.

pub mod host;
pub mod ignore;
pub mod input;
pub mod plugin;
pub mod service;

pub use self::host::{Host, HostError};
pub use self::plugin::{HeadingSync, Plugin, PluginError, PluginId};
pub use self::service::ServiceManager;
