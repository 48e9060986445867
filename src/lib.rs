//! ORDNET
//!
//! ORDNET recovers the symmetry-breaking order parameters that connect a high-symmetry
//! reference crystal structure to a lower-symmetry distorted structure. The per-atom
//! displacements between the two structures are regressed by a graph message-passing
//! network whose input features carry a small learnable order-parameter block, and the
//! network weights and the order-parameter values are optimized jointly. The recovered
//! order parameter is validated by rebuilding the distorted structure from the network
//! prediction and detecting its space group.

pub mod common;
pub mod io;
pub mod matrix;
pub mod structure;
pub mod graph;
pub mod features;
pub mod nn;
pub mod reconstruct;
pub mod symmetry;
