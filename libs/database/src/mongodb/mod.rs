//! MongoDB connection management

mod config;
mod connector;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{MongoError, connect_from_config, connect_from_config_with_retry, ping};

pub use mongodb::{Client, Collection, Database};
