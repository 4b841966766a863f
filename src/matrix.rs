use ndarray::prelude::*;

use crate::orbitals::OrbitalSpace;
use crate::symmetry::Irrep;

/// Symmetry-blocked square matrix: one owned dense block per irrep, with
/// the block dimension equal to the number of orbitals in that irrep.
/// Used for the one-electron integrals and for the generalized Fock
/// matrix, both of which are symmetric and carry no matrix elements
/// between different irreps.
#[derive(Clone, Debug)]
pub struct BlockMatrix {
    blocks: Vec<Array2<f64>>,
}

impl BlockMatrix {
    /// A zero matrix shaped after the orbital partition.
    pub fn zeros(space: &OrbitalSpace) -> Self {
        let blocks = (0..space.num_irreps())
            .map(|h| Array2::zeros((space.n_orb(h), space.n_orb(h))))
            .collect();
        BlockMatrix { blocks }
    }

    /// Take ownership of per-irrep blocks. Every block must be square.
    pub fn from_blocks(blocks: Vec<Array2<f64>>) -> Self {
        for (h, block) in blocks.iter().enumerate() {
            assert_eq!(
                block.nrows(),
                block.ncols(),
                "block of irrep {} is not square",
                h
            );
        }
        BlockMatrix { blocks }
    }

    #[inline]
    pub fn get(&self, h: Irrep, row: usize, col: usize) -> f64 {
        self.blocks[h][[row, col]]
    }

    #[inline]
    pub fn set(&mut self, h: Irrep, row: usize, col: usize, value: f64) {
        self.blocks[h][[row, col]] = value;
    }

    pub fn block(&self, h: Irrep) -> ArrayView2<f64> {
        self.blocks[h].view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::PointGroup;

    #[test]
    fn blocks_follow_orbital_counts() {
        let space = OrbitalSpace::new(PointGroup::C2, vec![1, 2], vec![2, 0], vec![3, 1]);
        let mut mat = BlockMatrix::zeros(&space);
        assert_eq!(mat.block(0).nrows(), 6);
        assert_eq!(mat.block(1).nrows(), 3);
        mat.set(1, 2, 0, -0.25);
        assert_eq!(mat.get(1, 2, 0), -0.25);
    }
}
