//! # Authentication Module
//!
//! Login, token issuance and verification, and the ownership checks that gate
//! user and meal mutations.
//!
//! Tokens are stateless: there is no session table and no revocation list, so
//! a token stays valid until it expires even if its account is deleted or its
//! password changes.

pub mod errors;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
