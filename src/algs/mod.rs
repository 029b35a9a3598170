//! Algorithms: transport, halo exchange, collectives, relaxation sweeps.

pub mod collective;
pub mod communicator;
pub mod halo;
pub mod sweep;
pub mod wire;

pub use halo::refresh_ghosts;
pub use sweep::{sweep_color, Color};
