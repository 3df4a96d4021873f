//! Library surface of the minter node, split out so integration tests can
//! exercise configuration loading directly.
#![forbid(unsafe_code)]

pub mod config;
