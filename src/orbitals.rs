use crate::symmetry::{Irrep, PointGroup};

/// Partition of the molecular orbitals into doubly occupied, active and
/// virtual orbitals, resolved per irrep. Within one irrep the orbitals are
/// ordered occupied first, then active, then virtual; accessors therefore
/// address an orbital as (irrep, index within the irrep).
///
/// The partition is immutable after construction and is borrowed, not
/// owned, by the perturber machinery built on top of it.
#[derive(Clone, Debug)]
pub struct OrbitalSpace {
    group: PointGroup,
    n_occ: Vec<usize>,
    n_act: Vec<usize>,
    n_virt: Vec<usize>,
    // cumulative number of active orbitals before each irrep; the last
    // entry is the total active count
    act_offsets: Vec<usize>,
}

impl OrbitalSpace {
    pub fn new(group: PointGroup, n_occ: Vec<usize>, n_act: Vec<usize>, n_virt: Vec<usize>) -> Self {
        let n = group.num_irreps();
        assert_eq!(n_occ.len(), n, "occupied counts must cover all {} irreps", n);
        assert_eq!(n_act.len(), n, "active counts must cover all {} irreps", n);
        assert_eq!(n_virt.len(), n, "virtual counts must cover all {} irreps", n);
        let mut act_offsets = vec![0; n + 1];
        for h in 0..n {
            act_offsets[h + 1] = act_offsets[h] + n_act[h];
        }
        OrbitalSpace {
            group,
            n_occ,
            n_act,
            n_virt,
            act_offsets,
        }
    }

    pub fn group(&self) -> PointGroup {
        self.group
    }

    pub fn num_irreps(&self) -> usize {
        self.group.num_irreps()
    }

    /// Number of doubly occupied (inactive) orbitals in `h`.
    #[inline]
    pub fn n_occ(&self, h: Irrep) -> usize {
        self.n_occ[h]
    }

    /// Number of active orbitals in `h`.
    #[inline]
    pub fn n_act(&self, h: Irrep) -> usize {
        self.n_act[h]
    }

    /// Number of virtual orbitals in `h`.
    #[inline]
    pub fn n_virt(&self, h: Irrep) -> usize {
        self.n_virt[h]
    }

    /// Total number of orbitals in `h`.
    #[inline]
    pub fn n_orb(&self, h: Irrep) -> usize {
        self.n_occ[h] + self.n_act[h] + self.n_virt[h]
    }

    /// Number of active orbitals in irreps before `h`; converts a
    /// within-irrep active index into a global active index.
    #[inline]
    pub fn act_offset(&self, h: Irrep) -> usize {
        self.act_offsets[h]
    }

    /// Total number of active orbitals over all irreps.
    #[inline]
    pub fn n_act_total(&self) -> usize {
        self.act_offsets[self.group.num_irreps()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_offsets_are_cumulative() {
        let space = OrbitalSpace::new(
            PointGroup::C2v,
            vec![2, 0, 1, 1],
            vec![2, 1, 0, 3],
            vec![4, 2, 2, 1],
        );
        assert_eq!(space.act_offset(0), 0);
        assert_eq!(space.act_offset(1), 2);
        assert_eq!(space.act_offset(2), 3);
        assert_eq!(space.act_offset(3), 3);
        assert_eq!(space.n_act_total(), 6);
        assert_eq!(space.n_orb(0), 8);
        assert_eq!(space.n_orb(3), 5);
    }
}
