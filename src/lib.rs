//! SwipeSense: pick the right credit card for today's spend.

pub mod cli;
pub mod config;
pub mod error;
pub mod recommend;
pub mod store;
pub mod wizard;
