pub mod auth;
pub mod health;
pub mod queries;
pub mod recommendations;
pub mod swagger;
