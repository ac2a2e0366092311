//! Gridgen builds initial conditions for a structured, rectilinear
//! hydrodynamics code. It partitions a domain into nodes (uniform, or as a
//! stack of material layers with constant or geometrically growing cell
//! widths), pads the mesh with the ghost cells required by the engine's
//! reconstruction scheme, paints primitive fields onto the cells, and writes
//! the result to the container the engine reads at start up.

pub mod container;
pub mod error;
pub mod grid;
pub mod index_space;
pub mod layer;
pub mod partition;
pub mod scheme;
pub mod units;

pub use error::{ConfigurationError, Error, Result};
