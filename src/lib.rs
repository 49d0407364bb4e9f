//! Email-to-link lookup service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod store;
pub mod table;

pub use config::LookupConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use reload::Reloader;
pub use store::{LookupStore, Snapshot};
pub use table::{LoadError, LoadInfo, Table, TableLoader};
