use itertools::iproduct;
use log::info;

use crate::orbitals::OrbitalSpace;
use crate::symmetry::{Irrep, PointGroup};

/// Number of excitation cases the perturber vector is partitioned into.
pub const NUM_CASES: usize = 13;

/// The excitation classes spanning the first-order interacting space.
/// Each case tags one family of internally contracted double excitations
/// out of the reference wavefunction (i, j occupied; t, u, v active; a, b
/// virtual):
///
/// * `A`          `E_ti E_uv |0>`
/// * `BSinglet`   `(E_ti E_uj + E_tj E_ui) |0>` with `i <= j`, `t <= u`
/// * `BTriplet`   `(E_ti E_uj - E_tj E_ui) |0>` with `i < j`, `t < u`
/// * `C`          `E_at E_uv |0>`
/// * `D`          `E_ai E_tu |0>` (D1) and `E_ti E_au |0>` (D2), stored as
///   the two halves of one case with the D2 half at offset `size_d / 2`
/// * `ESinglet`/`ETriplet`   `(E_ti E_aj ± E_tj E_ai) |0>`
/// * `FSinglet`/`FTriplet`   `(E_at E_bu ± E_bt E_au) |0>`
/// * `GSinglet`/`GTriplet`   `(E_ai E_bt ± E_bi E_at) |0>`
/// * `HSinglet`/`HTriplet`   `(E_ai E_bj ± E_bi E_aj) |0>`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExcitationCase {
    A,
    BSinglet,
    BTriplet,
    C,
    D,
    ESinglet,
    ETriplet,
    FSinglet,
    FTriplet,
    GSinglet,
    GTriplet,
    HSinglet,
    HTriplet,
}

impl ExcitationCase {
    /// All cases in their fixed enumeration order inside the flat vector.
    pub const ALL: [ExcitationCase; NUM_CASES] = [
        ExcitationCase::A,
        ExcitationCase::BSinglet,
        ExcitationCase::BTriplet,
        ExcitationCase::C,
        ExcitationCase::D,
        ExcitationCase::ESinglet,
        ExcitationCase::ETriplet,
        ExcitationCase::FSinglet,
        ExcitationCase::FTriplet,
        ExcitationCase::GSinglet,
        ExcitationCase::GTriplet,
        ExcitationCase::HSinglet,
        ExcitationCase::HTriplet,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Packed index of the pair `i <= j`: `i + j (j + 1) / 2`.
#[inline]
pub(crate) fn tri(i: usize, j: usize) -> usize {
    i + (j * (j + 1)) / 2
}

/// Packed index of the strict pair `i < j`: `i + j (j - 1) / 2`.
#[inline]
pub(crate) fn tri_strict(i: usize, j: usize) -> usize {
    i + (j * j - j) / 2
}

/// Number of occupied orbital pairs coupled to overall irrep `h`:
/// triangular within one irrep (`i <= j` inclusive, `i < j` strict),
/// rectangular with the tie-break `irrep_i < irrep_j` across two irreps.
pub(crate) fn occ_pair_count(space: &OrbitalSpace, h: Irrep, strict: bool) -> usize {
    let mut total = 0;
    for irrep_i in 0..space.num_irreps() {
        let irrep_j = PointGroup::direct_product(h, irrep_i);
        let n_i = space.n_occ(irrep_i);
        if irrep_i == irrep_j {
            total += if strict {
                (n_i * n_i.saturating_sub(1)) / 2
            } else {
                (n_i * (n_i + 1)) / 2
            };
        } else if irrep_i < irrep_j {
            total += n_i * space.n_occ(irrep_j);
        }
    }
    total
}

/// Number of virtual orbital pairs coupled to overall irrep `h`; packing
/// as in [`occ_pair_count`].
pub(crate) fn virt_pair_count(space: &OrbitalSpace, h: Irrep, strict: bool) -> usize {
    let mut total = 0;
    for irrep_a in 0..space.num_irreps() {
        let irrep_b = PointGroup::direct_product(h, irrep_a);
        let n_a = space.n_virt(irrep_a);
        if irrep_a == irrep_b {
            total += if strict {
                (n_a * n_a.saturating_sub(1)) / 2
            } else {
                (n_a * (n_a + 1)) / 2
            };
        } else if irrep_a < irrep_b {
            total += n_a * space.n_virt(irrep_b);
        }
    }
    total
}

/// Number of occupied-virtual index pairs `(i, a)` with
/// `irrep_i x irrep_a = h`.
pub(crate) fn occ_virt_count(space: &OrbitalSpace, h: Irrep) -> usize {
    let mut total = 0;
    for irrep_i in 0..space.num_irreps() {
        let irrep_a = PointGroup::direct_product(h, irrep_i);
        total += space.n_occ(irrep_i) * space.n_virt(irrep_a);
    }
    total
}

/// Block layout of the flat perturber amplitude vector: one contiguous
/// segment per (excitation case, irrep) pair, in the fixed case-major
/// enumeration order of [`ExcitationCase::ALL`].
///
/// The layout also keeps the per-irrep inner dimensions of the metric
/// blocks (`size_ac`, `size_d`, `size_bf_*`), which downstream builders
/// share. The incrementally summed total is cross-checked against an
/// independent closed-form enumeration over ordered irrep quadruples;
/// any disagreement is an internal counting fault and aborts.
#[derive(Clone, Debug)]
pub struct VectorLayout {
    num_irreps: usize,
    /// dimension of the active-triple space `t u v` per irrep (classes A, C)
    pub size_ac: Vec<usize>,
    /// dimension of the stacked D1/D2 active-pair space per irrep
    pub size_d: Vec<usize>,
    /// dimension of the `t <= u` active-pair space per irrep (B, F singlet)
    pub size_bf_singlet: Vec<usize>,
    /// dimension of the `t < u` active-pair space per irrep (B, F triplet)
    pub size_bf_triplet: Vec<usize>,
    jump: Vec<usize>,
    total_size: usize,
}

impl VectorLayout {
    pub fn new(space: &OrbitalSpace) -> Self {
        let num_irreps = space.num_irreps();
        let mut helper = vec![0; NUM_CASES * num_irreps];

        // Classes A and C share the active-triple dimension: for every
        // irrep of the excitation, count all (t, u, v) with
        // irrep_t x irrep_u x irrep_v = h.
        let mut size_ac = vec![0; num_irreps];
        for h in 0..num_irreps {
            let mut linsize = 0;
            for irrep_t in 0..num_irreps {
                for irrep_u in 0..num_irreps {
                    let irrep_v =
                        PointGroup::direct_product(PointGroup::direct_product(h, irrep_t), irrep_u);
                    linsize += space.n_act(irrep_t) * space.n_act(irrep_u) * space.n_act(irrep_v);
                }
            }
            size_ac[h] = linsize;
            helper[ExcitationCase::A.index() * num_irreps + h] = space.n_occ(h) * linsize;
            helper[ExcitationCase::C.index() * num_irreps + h] = space.n_virt(h) * linsize;
        }

        // Class D: both sub-blocks run over the rectangular active pair
        // (t, u) with irrep_t x irrep_u = h, stacked D1 then D2, and over
        // all occupied-virtual pairs (i, a) of the same overall irrep.
        let mut size_d = vec![0; num_irreps];
        for h in 0..num_irreps {
            let mut jump_tu = 0;
            for irrep_t in 0..num_irreps {
                let irrep_u = PointGroup::direct_product(h, irrep_t);
                jump_tu += space.n_act(irrep_t) * space.n_act(irrep_u);
            }
            size_d[h] = 2 * jump_tu;
            helper[ExcitationCase::D.index() * num_irreps + h] =
                occ_virt_count(space, h) * size_d[h];
        }

        // Classes B and F: active pairs packed triangularly for the
        // trivial overall irrep (where irrep_t == irrep_u) and
        // rectangularly with the irrep tie-break otherwise.
        let mut size_bf_singlet = vec![0; num_irreps];
        let mut size_bf_triplet = vec![0; num_irreps];
        for h in 0..num_irreps {
            let mut tu_singlet = 0;
            let mut tu_triplet = 0;
            if h == 0 {
                for irrep_tu in 0..num_irreps {
                    let n_tu = space.n_act(irrep_tu);
                    tu_singlet += (n_tu * (n_tu + 1)) / 2;
                    tu_triplet += (n_tu * n_tu.saturating_sub(1)) / 2;
                }
            } else {
                for irrep_t in 0..num_irreps {
                    let irrep_u = PointGroup::direct_product(h, irrep_t);
                    if irrep_t < irrep_u {
                        let n_pair = space.n_act(irrep_t) * space.n_act(irrep_u);
                        tu_singlet += n_pair;
                        tu_triplet += n_pair;
                    }
                }
            }
            size_bf_singlet[h] = tu_singlet;
            size_bf_triplet[h] = tu_triplet;

            helper[ExcitationCase::BSinglet.index() * num_irreps + h] =
                occ_pair_count(space, h, false) * tu_singlet;
            helper[ExcitationCase::BTriplet.index() * num_irreps + h] =
                occ_pair_count(space, h, true) * tu_triplet;
            helper[ExcitationCase::FSinglet.index() * num_irreps + h] =
                virt_pair_count(space, h, false) * tu_singlet;
            helper[ExcitationCase::FTriplet.index() * num_irreps + h] =
                virt_pair_count(space, h, true) * tu_triplet;
        }

        // Class E: one active index of irrep h times all (a, i <= j) /
        // (a, i < j) combinations whose total irrep matches.
        for h in 0..num_irreps {
            let mut e_singlet = 0;
            let mut e_triplet = 0;
            for irrep_a in 0..num_irreps {
                let n_a = space.n_virt(irrep_a);
                let irrep_occ = PointGroup::direct_product(h, irrep_a);
                e_singlet += n_a * occ_pair_count(space, irrep_occ, false);
                e_triplet += n_a * occ_pair_count(space, irrep_occ, true);
            }
            helper[ExcitationCase::ESinglet.index() * num_irreps + h] = e_singlet * space.n_act(h);
            helper[ExcitationCase::ETriplet.index() * num_irreps + h] = e_triplet * space.n_act(h);
        }

        // Class G: mirror of E with the roles of occupied and virtual
        // orbitals exchanged.
        for h in 0..num_irreps {
            let mut g_singlet = 0;
            let mut g_triplet = 0;
            for irrep_i in 0..num_irreps {
                let n_i = space.n_occ(irrep_i);
                let irrep_virt = PointGroup::direct_product(h, irrep_i);
                g_singlet += n_i * virt_pair_count(space, irrep_virt, false);
                g_triplet += n_i * virt_pair_count(space, irrep_virt, true);
            }
            helper[ExcitationCase::GSinglet.index() * num_irreps + h] = g_singlet * space.n_act(h);
            helper[ExcitationCase::GTriplet.index() * num_irreps + h] = g_triplet * space.n_act(h);
        }

        // Class H: purely external, the segment is the plain product of
        // the packed occupied-pair and virtual-pair counts. For the
        // trivial irrep both pair sets are triangular per irrep and the
        // product is taken blockwise.
        for h in 0..num_irreps {
            let (h_singlet, h_triplet) = if h == 0 {
                let mut ij_singlet = 0;
                let mut ij_triplet = 0;
                for irrep_ij in 0..num_irreps {
                    let n_ij = space.n_occ(irrep_ij);
                    ij_singlet += (n_ij * (n_ij + 1)) / 2;
                    ij_triplet += (n_ij * n_ij.saturating_sub(1)) / 2;
                }
                let mut ab_singlet = 0;
                let mut ab_triplet = 0;
                for irrep_ab in 0..num_irreps {
                    let n_ab = space.n_virt(irrep_ab);
                    ab_singlet += (n_ab * (n_ab + 1)) / 2;
                    ab_triplet += (n_ab * n_ab.saturating_sub(1)) / 2;
                }
                (ij_singlet * ab_singlet, ij_triplet * ab_triplet)
            } else {
                let pairs = occ_pair_count(space, h, false) * virt_pair_count(space, h, false);
                (pairs, pairs)
            };
            helper[ExcitationCase::HSinglet.index() * num_irreps + h] = h_singlet;
            helper[ExcitationCase::HTriplet.index() * num_irreps + h] = h_triplet;
        }

        let mut jump = vec![0; NUM_CASES * num_irreps + 1];
        for cnt in 0..NUM_CASES * num_irreps {
            jump[cnt + 1] = jump[cnt] + helper[cnt];
        }
        let total_size = jump[NUM_CASES * num_irreps];

        info!(
            "Dimension of the first-order interacting space: {}",
            total_size
        );

        let check = direct_enumeration_length(space);
        assert_eq!(
            check, total_size,
            "perturber space dimension mismatch: direct enumeration gives {}, \
             blockwise summation gives {}",
            check, total_size
        );

        VectorLayout {
            num_irreps,
            size_ac,
            size_d,
            size_bf_singlet,
            size_bf_triplet,
            jump,
            total_size,
        }
    }

    /// Offset of the (case, irrep) segment inside the flat vector.
    #[inline]
    pub fn jump(&self, case: ExcitationCase, h: Irrep) -> usize {
        self.jump[case.index() * self.num_irreps + h]
    }

    /// Length of the (case, irrep) segment.
    #[inline]
    pub fn block_len(&self, case: ExcitationCase, h: Irrep) -> usize {
        let idx = case.index() * self.num_irreps + h;
        self.jump[idx + 1] - self.jump[idx]
    }

    /// Dimension of the full flat amplitude/right-hand-side vector.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }
}

/// Independent closed-form count of the perturber space dimension by
/// direct enumeration over ordered irrep quadruples. Serves as the
/// integrity cross-check for the blockwise summation in
/// [`VectorLayout::new`].
pub(crate) fn direct_enumeration_length(space: &OrbitalSpace) -> usize {
    let num_irreps = space.num_irreps();
    let mut length = 0usize;
    for (i1, i2, i3) in iproduct!(0..num_irreps, 0..num_irreps, 0..num_irreps) {
        let i4 = PointGroup::direct_product(PointGroup::direct_product(i1, i2), i3);
        // A: E_ti E_uv | 0 >
        length += space.n_occ(i1) * space.n_act(i2) * space.n_act(i3) * space.n_act(i4);
        // C: E_at E_uv | 0 >
        length += space.n_act(i1) * space.n_act(i2) * space.n_act(i3) * space.n_virt(i4);
        // D: E_ai E_tu | 0 >  and  E_ti E_au | 0 >
        length += 2 * space.n_occ(i1) * space.n_act(i2) * space.n_act(i3) * space.n_virt(i4);
        // E: E_ti E_aj | 0 >
        length += space.n_occ(i1) * space.n_occ(i2) * space.n_act(i3) * space.n_virt(i4);
        // G: E_ai E_bt | 0 >
        length += space.n_occ(i1) * space.n_act(i2) * space.n_virt(i3) * space.n_virt(i4);
        if i2 < i4 {
            // B: E_ti E_uj | 0 >
            length += space.n_act(i1) * space.n_act(i3) * space.n_occ(i2) * space.n_occ(i4);
            // H: E_ai E_bj | 0 >
            length += space.n_virt(i1) * space.n_virt(i3) * space.n_occ(i2) * space.n_occ(i4);
            // F: E_at E_bu | 0 >
            length += space.n_virt(i1) * space.n_virt(i3) * space.n_act(i2) * space.n_act(i4);
        }
        if i2 == i4 {
            // i2 == i4 implies i1 == i3; the orbital pairs split into a
            // strict rectangle over distinct orbitals and the packed
            // triangle over the rest
            length += (space.n_act(i1)
                * space.n_act(i3)
                * space.n_occ(i2)
                * space.n_occ(i2).saturating_sub(1))
                / 2;
            length += (space.n_virt(i1)
                * space.n_virt(i3)
                * space.n_occ(i2)
                * space.n_occ(i2).saturating_sub(1))
                / 2;
            length += (space.n_virt(i1)
                * space.n_virt(i3)
                * space.n_act(i2)
                * space.n_act(i2).saturating_sub(1))
                / 2;
            length += (space.n_act(i1) * (space.n_act(i3) + 1) * space.n_occ(i2)) / 2;
            length += (space.n_virt(i1) * (space.n_virt(i3) + 1) * space.n_act(i2)) / 2;
            length += (space.n_virt(i1) * (space.n_virt(i3) + 1) * space.n_occ(i2)) / 2;
        }
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_for(space: &OrbitalSpace) -> VectorLayout {
        VectorLayout::new(space)
    }

    #[test]
    fn jump_is_an_exclusive_prefix_sum() {
        let space = OrbitalSpace::new(
            PointGroup::C2v,
            vec![2, 1, 1, 0],
            vec![1, 1, 1, 1],
            vec![2, 2, 1, 1],
        );
        let layout = layout_for(&space);
        assert_eq!(layout.jump(ExcitationCase::A, 0), 0);
        let mut previous = 0;
        for case in ExcitationCase::ALL.iter() {
            for h in 0..space.num_irreps() {
                let jump = layout.jump(*case, h);
                assert!(jump >= previous, "jump[] must be non-decreasing");
                previous = jump;
            }
        }
        let last = ExcitationCase::HTriplet;
        let h_last = space.num_irreps() - 1;
        assert_eq!(
            layout.jump(last, h_last) + layout.block_len(last, h_last),
            layout.total_size()
        );
    }

    #[test]
    fn two_counting_paths_agree_across_groups() {
        let partitions = [
            OrbitalSpace::new(PointGroup::C1, vec![1], vec![1], vec![1]),
            OrbitalSpace::new(PointGroup::C1, vec![3], vec![2], vec![4]),
            OrbitalSpace::new(PointGroup::C2, vec![2, 1], vec![2, 0], vec![3, 2]),
            OrbitalSpace::new(
                PointGroup::C2v,
                vec![2, 0, 1, 1],
                vec![2, 1, 0, 1],
                vec![3, 2, 2, 1],
            ),
            OrbitalSpace::new(
                PointGroup::D2h,
                vec![2, 1, 0, 0, 1, 0, 1, 0],
                vec![1, 1, 1, 0, 0, 1, 0, 0],
                vec![2, 1, 1, 1, 0, 1, 1, 2],
            ),
        ];
        for space in partitions.iter() {
            // VectorLayout::new asserts the agreement internally; reassert
            // here so a failure names the offending partition.
            let layout = layout_for(space);
            assert_eq!(
                layout.total_size(),
                direct_enumeration_length(space),
                "mismatch for {:?}",
                space.group()
            );
        }
    }

    #[test]
    fn trivial_group_dimensions_by_hand() {
        // one occupied, one active, one virtual orbital in C1
        let space = OrbitalSpace::new(PointGroup::C1, vec![1], vec![1], vec![1]);
        let layout = layout_for(&space);
        assert_eq!(layout.size_ac[0], 1);
        assert_eq!(layout.block_len(ExcitationCase::A, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::C, 0), 1);
        // D stacks D1 and D2 over the single (i, a) pair
        assert_eq!(layout.size_d[0], 2);
        assert_eq!(layout.block_len(ExcitationCase::D, 0), 2);
        // one i <= j pair, one t <= u pair
        assert_eq!(layout.block_len(ExcitationCase::BSinglet, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::BTriplet, 0), 0);
        assert_eq!(layout.block_len(ExcitationCase::ESinglet, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::ETriplet, 0), 0);
        assert_eq!(layout.block_len(ExcitationCase::FSinglet, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::GSinglet, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::HSinglet, 0), 1);
        assert_eq!(layout.block_len(ExcitationCase::HTriplet, 0), 0);
        assert_eq!(layout.total_size(), 9);
    }

    #[test]
    fn mixed_irrep_blocks_vanish_without_active_partners() {
        // no active orbitals in the non-trivial irrep: every pair-type
        // block of the non-trivial excitation irrep must be empty
        let space = OrbitalSpace::new(PointGroup::Ci, vec![2, 1], vec![2, 0], vec![2, 2]);
        let layout = layout_for(&space);
        assert_eq!(layout.size_bf_singlet[1], 0);
        assert_eq!(layout.size_bf_triplet[1], 0);
        assert_eq!(layout.block_len(ExcitationCase::BSinglet, 1), 0);
        assert_eq!(layout.block_len(ExcitationCase::BTriplet, 1), 0);
        assert_eq!(layout.block_len(ExcitationCase::FSinglet, 1), 0);
        assert_eq!(layout.block_len(ExcitationCase::FTriplet, 1), 0);
        assert_eq!(layout.block_len(ExcitationCase::ESinglet, 1), 0);
        assert_eq!(layout.block_len(ExcitationCase::GSinglet, 1), 0);
    }
}
