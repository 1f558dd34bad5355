//! Route modules, one per concern.

pub mod events;
pub mod health;
pub mod index;
pub mod refresh;
pub mod sources;
pub mod stats;
