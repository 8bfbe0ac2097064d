pub mod auth_service;
pub mod query_service;
pub mod recommendation_service;
