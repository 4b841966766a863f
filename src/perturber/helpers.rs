use crate::orbitals::OrbitalSpace;
use crate::perturber::layout::tri;

/// Double-counting correction factors for triangularly packed orbital
/// pairs of the trivial excitation irrep (where both pair members live in
/// the same irrep): a diagonal pair `i = j` counts twice, an off-diagonal
/// pair once. One table over the concatenated occupied `i <= j` pairs of
/// all irreps and one over the virtual `a <= b` pairs.
#[derive(Clone, Debug)]
pub struct PairWeights {
    pub occ: Vec<f64>,
    pub virt: Vec<f64>,
}

impl PairWeights {
    pub fn build(space: &OrbitalSpace) -> Self {
        let mut occ = Vec::new();
        for irrep_ij in 0..space.num_irreps() {
            let n_occ = space.n_occ(irrep_ij);
            let base = occ.len();
            occ.resize(base + (n_occ * (n_occ + 1)) / 2, 0.0);
            for i in 0..n_occ {
                for j in i..n_occ {
                    occ[base + tri(i, j)] = if i == j { 2.0 } else { 1.0 };
                }
            }
        }

        let mut virt = Vec::new();
        for irrep_ab in 0..space.num_irreps() {
            let n_virt = space.n_virt(irrep_ab);
            let base = virt.len();
            virt.resize(base + (n_virt * (n_virt + 1)) / 2, 0.0);
            for a in 0..n_virt {
                for b in a..n_virt {
                    virt[base + tri(a, b)] = if a == b { 2.0 } else { 1.0 };
                }
            }
        }

        PairWeights { occ, virt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::PointGroup;

    #[test]
    fn diagonal_pairs_count_twice() {
        let space = OrbitalSpace::new(PointGroup::C2, vec![2, 1], vec![1, 0], vec![0, 2]);
        let weights = PairWeights::build(&space);
        // irrep 0: pairs (0,0), (0,1), (1,1); irrep 1: pair (0,0)
        assert_eq!(weights.occ, vec![2.0, 1.0, 2.0, 2.0]);
        // virtuals only in irrep 1: pairs (0,0), (0,1), (1,1)
        assert_eq!(weights.virt, vec![2.0, 1.0, 2.0]);
    }
}
