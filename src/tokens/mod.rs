pub mod credentials;
pub mod generator;
mod service;

pub use generator::generate_secret;
pub use service::TokenService;
