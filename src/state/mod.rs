//! State representation for the physiological model.
//!
//! Contains the fixed-size state vector and the sampled trajectory a run
//! produces from it.

mod trajectory;
mod vector;

pub use trajectory::{Trajectory, TrajectorySample};
pub use vector::{StateVector, Variable, STATE_DIM};
