use ndarray::prelude::*;
use ndarray::{Array4, Array6};

/// Spin-summed reduced density matrices of the reference wavefunction over
/// the active orbitals, together with the externally precomputed
/// Fock-contracted 4-RDM. All tensors are addressed with global active
/// indices (see [`crate::OrbitalSpace::act_offset`]).
///
/// Index pairing conventions (creation/annihilation pairs):
/// * `one_rdm[[p, q]]`                 pairs (p, q)
/// * `two_rdm[[p, q, r, s]]`           pairs (p, r), (q, s)
/// * `three_rdm[[p, q, r, s, t, u]]`   pairs (p, s), (q, t), (r, u)
/// * `f_dot_4dm[[p, q, r, s, t, u]]`   the 4-RDM with one pair already
///   traced against the active-active Fock block, same pairing as the 3-RDM
///   for the remaining indices.
///
/// The tensors are invariant under simultaneous permutation of their
/// creation/annihilation pairs and, for a real reference, under exchanging
/// the creation with the annihilation index set.
#[derive(Clone, Debug)]
pub struct DensityMatrices {
    pub one_rdm: Array2<f64>,
    pub two_rdm: Array4<f64>,
    pub three_rdm: Array6<f64>,
    pub f_dot_4dm: Array6<f64>,
}

impl DensityMatrices {
    /// Bundle the reference density matrices. Every tensor must be shaped
    /// over the same number of active orbitals; a mismatch is a wiring
    /// fault in the caller and aborts.
    pub fn new(
        one_rdm: Array2<f64>,
        two_rdm: Array4<f64>,
        three_rdm: Array6<f64>,
        f_dot_4dm: Array6<f64>,
    ) -> Self {
        let las = one_rdm.nrows();
        assert_eq!(one_rdm.shape(), &[las, las], "1-RDM must be square");
        assert_eq!(
            two_rdm.shape(),
            &[las, las, las, las],
            "2-RDM shape does not match the 1-RDM active dimension {}",
            las
        );
        assert_eq!(
            three_rdm.shape(),
            &[las, las, las, las, las, las],
            "3-RDM shape does not match the 1-RDM active dimension {}",
            las
        );
        assert_eq!(
            f_dot_4dm.shape(),
            &[las, las, las, las, las, las],
            "contracted 4-RDM shape does not match the 1-RDM active dimension {}",
            las
        );
        DensityMatrices {
            one_rdm,
            two_rdm,
            three_rdm,
            f_dot_4dm,
        }
    }

    /// Number of active orbitals the tensors are defined over.
    pub fn n_act_total(&self) -> usize {
        self.one_rdm.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_are_validated() {
        let las = 2;
        let dm = DensityMatrices::new(
            Array2::zeros((las, las)),
            Array4::zeros((las, las, las, las)),
            Array6::zeros((las, las, las, las, las, las)),
            Array6::zeros((las, las, las, las, las, las)),
        );
        assert_eq!(dm.n_act_total(), las);
    }

    #[test]
    #[should_panic]
    fn mismatched_shapes_abort() {
        DensityMatrices::new(
            Array2::zeros((2, 2)),
            Array4::zeros((3, 3, 3, 3)),
            Array6::zeros((2, 2, 2, 2, 2, 2)),
            Array6::zeros((2, 2, 2, 2, 2, 2)),
        );
    }
}
