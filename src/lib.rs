pub mod cli;
pub mod commands;

pub use ordo_core as core;
pub use ordo_core::config;
pub use ordo_core::model;
pub use ordo_core::AppConfig;

pub use ordo_engine as engine;
pub use ordo_engine::{EngineOptions, SyncEngine};

pub use ordo_remote as remote;
