pub mod explanation_service;

pub use explanation_service::*;
