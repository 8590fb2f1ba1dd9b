pub mod auth;
pub mod client;
pub mod model;

pub use auth::AuthService;
pub use client::TrustlistService;
pub use model::TrustlistEntry;
