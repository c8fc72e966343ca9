//! Configuration management
//!
//! Node settings are read from an optional TOML file, overridden by
//! command-line flags, then validated once into an immutable [`Config`]
//! that every component borrows.

pub mod distribution;
pub mod settings;

pub use distribution::DISTRIBUTION_ADDRESSES;
pub use settings::{
    Config, DaemonConfig, DistributionParams, GatewayConfig, GenesisParams, NodeConfig, NodeMode,
    PexConfig, VisorConfig,
};
