//! JWT authentication: token signing, middleware, and auth routes

pub mod middleware;
pub mod routes;
pub mod service;
pub mod token;
