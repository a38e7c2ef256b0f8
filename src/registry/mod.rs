//! File Registry
//!
//! Maps unguessable tokens to canonical filesystem paths. The registry is the
//! allow-list the daemon consults: only paths registered here are ever served.

mod error;
mod store;
#[cfg(test)]
mod tests;

pub use self::error::RegistryError;
pub use self::store::{FileRegistry, Token, TOKEN_BYTES};
