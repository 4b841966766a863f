#![allow(clippy::too_many_arguments)]

pub mod defaults;
mod density;
mod integrals;
mod matrix;
mod orbitals;
mod perturber;
mod symmetry;

pub use density::*;
pub use integrals::*;
pub use matrix::*;
pub use orbitals::*;
pub use perturber::*;
pub use symmetry::*;
