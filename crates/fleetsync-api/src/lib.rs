// fleetsync-api: Async Rust client for the Zabbix JSON-RPC API

pub mod client;
pub mod error;
pub mod groups;
pub mod hosts;
pub mod models;
pub mod templates;
pub mod transport;
pub mod usermacros;

pub use client::RpcClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
