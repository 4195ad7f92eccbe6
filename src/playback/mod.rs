pub mod backend;
pub mod error;
pub mod local_player;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;
