pub mod cli;
pub mod config;
pub mod cover;
pub mod embed;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod loudness;
pub mod resolver;
pub mod sources;
pub mod tags;
pub mod walker;

#[cfg(test)]
pub(crate) mod fixtures;
