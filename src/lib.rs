pub mod auth;
pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use blob::BlobStore;
pub use db::PortalStorage;
pub use error::SnowgateError;
