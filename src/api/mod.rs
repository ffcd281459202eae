pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod services;
pub mod types;

pub use cached_client::CachedDashboardClient;
pub use client::ApiClient;
pub use error::RequestError;
pub use services::DashboardApi;
