// # Routes Module
//
// HTTP route handlers, grouped by resource. Handlers only parse requests and
// call into the stores; token and ownership checks are layered on in
// `server::app`.

/// Health check and monitoring endpoints
pub mod health;

/// Password login
pub mod auth;

/// User account endpoints
pub mod user;

/// Meal endpoints
pub mod meal;
