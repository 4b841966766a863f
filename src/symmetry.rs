/// Index of an irreducible representation inside the irrep list of a
/// [`PointGroup`]. The trivial (fully symmetric) irrep is always 0.
pub type Irrep = usize;

/// The real abelian point groups. All of their irreps are one-dimensional
/// and self-inverse under the direct product, which reduces the product
/// table to a bitwise XOR of the irrep indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointGroup {
    C1,
    Ci,
    C2,
    Cs,
    D2,
    C2v,
    C2h,
    D2h,
}

impl PointGroup {
    /// Number of irreducible representations of the group.
    pub fn num_irreps(&self) -> usize {
        match self {
            PointGroup::C1 => 1,
            PointGroup::Ci | PointGroup::C2 | PointGroup::Cs => 2,
            PointGroup::D2 | PointGroup::C2v | PointGroup::C2h => 4,
            PointGroup::D2h => 8,
        }
    }

    /// Direct product of two irreps. The product is its own inverse and
    /// the trivial irrep is the identity.
    #[inline]
    pub fn direct_product(a: Irrep, b: Irrep) -> Irrep {
        a ^ b
    }

    /// Conventional names of the irreps, in the same order as their indices.
    pub fn irrep_names(&self) -> &'static [&'static str] {
        match self {
            PointGroup::C1 => &["A"],
            PointGroup::Ci => &["Ag", "Au"],
            PointGroup::C2 => &["A", "B"],
            PointGroup::Cs => &["A'", "A''"],
            PointGroup::D2 => &["A", "B1", "B2", "B3"],
            PointGroup::C2v => &["A1", "A2", "B1", "B2"],
            PointGroup::C2h => &["Ag", "Bg", "Au", "Bu"],
            PointGroup::D2h => &["Ag", "B1g", "B2g", "B3g", "Au", "B1u", "B2u", "B3u"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_product_group_axioms() {
        let group = PointGroup::D2h;
        let n = group.num_irreps();
        for a in 0..n {
            // identity and self-inverse
            assert_eq!(PointGroup::direct_product(a, 0), a);
            assert_eq!(PointGroup::direct_product(a, a), 0);
            for b in 0..n {
                // closure and commutativity
                assert!(PointGroup::direct_product(a, b) < n);
                assert_eq!(
                    PointGroup::direct_product(a, b),
                    PointGroup::direct_product(b, a)
                );
            }
        }
    }

    #[test]
    fn irrep_names_match_order() {
        for group in [
            PointGroup::C1,
            PointGroup::Ci,
            PointGroup::C2,
            PointGroup::Cs,
            PointGroup::D2,
            PointGroup::C2v,
            PointGroup::C2h,
            PointGroup::D2h,
        ]
        .iter()
        {
            assert_eq!(group.irrep_names().len(), group.num_irreps());
        }
    }
}
