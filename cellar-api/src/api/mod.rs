//! HTTP endpoint handlers (everything outside /graphql)

pub mod health;
pub mod media;
pub mod sse;
pub mod transfer;
pub mod upload;
