//! Contract bindings for the token

pub mod token;

pub use token::*;
