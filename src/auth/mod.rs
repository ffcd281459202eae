pub mod credentials;
pub mod service;
pub mod token;

pub use credentials::{CredentialStore, FileCredentialStore};
pub use service::AuthService;

#[cfg(test)]
pub use credentials::MemoryCredentialStore;
