pub mod app_config;
pub mod http_gateway;
pub mod session_store;

pub use http_gateway::HttpGateway;
pub use session_store::FileSessionStore;
