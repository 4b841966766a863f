pub use fock::{FockBlocks, FockContractions};
pub use helpers::PairWeights;
pub use layout::{ExcitationCase, VectorLayout, NUM_CASES};
pub use operator::{Caspt2, PerturberEngine};
pub use overlap::OverlapBlocks;
pub use rhs::build_rhs;

mod fock;
mod helpers;
mod layout;
mod operator;
mod overlap;
mod rhs;
mod verify;
