//! jsondns Infrastructure Layer
pub mod dns;
pub mod gateway;
pub mod jobs;
