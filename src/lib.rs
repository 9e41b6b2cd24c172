pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;

pub use auth::CredentialStore;
pub use server::Server;
