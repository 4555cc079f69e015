pub mod auth;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod mapper;
pub mod request;
pub mod router;
pub mod service;
pub mod signature;
pub mod store;
pub mod template;
