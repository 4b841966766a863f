use ndarray::Array4;

use crate::orbitals::OrbitalSpace;
use crate::symmetry::Irrep;

/// Read access to the transformed two-electron repulsion integrals.
///
/// Orbital indices are within-irrep indices over the full orbital range of
/// their irrep (occupied, active and virtual orbitals counted together, in
/// that order). Two storage orderings are exposed because transformed
/// integral stores usually keep them in separate classes:
///
/// * [`coulomb`](TwoElectronIntegrals::coulomb) returns `(pq|rs)` in
///   chemist notation, for integrals whose bra pair `(p, q)` carries at
///   most occupied/active indices;
/// * [`exchange`](TwoElectronIntegrals::exchange) returns `(ax|by)` for
///   integrals whose outer indices `a`, `b` are virtual.
///
/// The irrep quadruple must multiply to the trivial irrep; queries outside
/// that set are never issued by this crate.
pub trait TwoElectronIntegrals {
    /// `(pq|rs)` in chemist notation.
    fn coulomb(
        &self,
        ip: Irrep,
        iq: Irrep,
        ir: Irrep,
        is: Irrep,
        p: usize,
        q: usize,
        r: usize,
        s: usize,
    ) -> f64;

    /// `(ax|by)` in chemist notation, with `a` and `b` virtual orbitals of
    /// irreps `ia` and `ib`.
    fn exchange(
        &self,
        ix: Irrep,
        iy: Irrep,
        ia: Irrep,
        ib: Irrep,
        x: usize,
        y: usize,
        a: usize,
        b: usize,
    ) -> f64;
}

/// Dense reference implementation holding the full 4-index tensor over all
/// orbitals. Quadratic in memory along every axis, so only suitable for
/// small systems and tests; production callers are expected to wire in
/// their own transformed-integral store through the trait.
#[derive(Clone, Debug)]
pub struct DenseTwoElectron {
    // global orbital offset of each irrep
    offsets: Vec<usize>,
    eri: Array4<f64>,
}

impl DenseTwoElectron {
    /// An all-zero integral tensor shaped after the orbital partition.
    pub fn zeros(space: &OrbitalSpace) -> Self {
        let n = space.num_irreps();
        let mut offsets = vec![0; n + 1];
        for h in 0..n {
            offsets[h + 1] = offsets[h] + space.n_orb(h);
        }
        let total = offsets[n];
        DenseTwoElectron {
            offsets,
            eri: Array4::zeros((total, total, total, total)),
        }
    }

    /// Wrap an existing full 4-index tensor over the global orbital range.
    /// The tensor is expected to carry the eightfold permutational
    /// symmetry of real integrals; the accessors do not symmetrize.
    pub fn from_tensor(space: &OrbitalSpace, eri: Array4<f64>) -> Self {
        let n = space.num_irreps();
        let mut offsets = vec![0; n + 1];
        for h in 0..n {
            offsets[h + 1] = offsets[h] + space.n_orb(h);
        }
        let total = offsets[n];
        assert_eq!(
            eri.shape(),
            &[total, total, total, total],
            "integral tensor does not match the orbital partition"
        );
        DenseTwoElectron { offsets, eri }
    }

    #[inline]
    fn global(&self, h: Irrep, orb: usize) -> usize {
        self.offsets[h] + orb
    }

    /// Store `(pq|rs)` together with its eightfold permutational images.
    pub fn set(
        &mut self,
        ip: Irrep,
        iq: Irrep,
        ir: Irrep,
        is: Irrep,
        p: usize,
        q: usize,
        r: usize,
        s: usize,
        value: f64,
    ) {
        let (p, q, r, s) = (
            self.global(ip, p),
            self.global(iq, q),
            self.global(ir, r),
            self.global(is, s),
        );
        for &(a, b, c, d) in &[
            (p, q, r, s),
            (q, p, r, s),
            (p, q, s, r),
            (q, p, s, r),
            (r, s, p, q),
            (s, r, p, q),
            (r, s, q, p),
            (s, r, q, p),
        ] {
            self.eri[[a, b, c, d]] = value;
        }
    }
}

impl TwoElectronIntegrals for DenseTwoElectron {
    fn coulomb(
        &self,
        ip: Irrep,
        iq: Irrep,
        ir: Irrep,
        is: Irrep,
        p: usize,
        q: usize,
        r: usize,
        s: usize,
    ) -> f64 {
        self.eri[[
            self.global(ip, p),
            self.global(iq, q),
            self.global(ir, r),
            self.global(is, s),
        ]]
    }

    fn exchange(
        &self,
        ix: Irrep,
        iy: Irrep,
        ia: Irrep,
        ib: Irrep,
        x: usize,
        y: usize,
        a: usize,
        b: usize,
    ) -> f64 {
        // (ax|by): same physical tensor, different argument ordering
        self.eri[[
            self.global(ia, a),
            self.global(ix, x),
            self.global(ib, b),
            self.global(iy, y),
        ]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::PointGroup;

    #[test]
    fn coulomb_and_exchange_address_the_same_tensor() {
        let space = OrbitalSpace::new(PointGroup::C1, vec![1], vec![1], vec![1]);
        let mut ints = DenseTwoElectron::zeros(&space);
        // (pq|rs) with p = virtual orbital 2, q = active orbital 1
        ints.set(0, 0, 0, 0, 2, 1, 2, 1, 0.625);
        assert_eq!(ints.coulomb(0, 0, 0, 0, 2, 1, 2, 1), 0.625);
        // exchange ordering: (ax|by) with a = b = the virtual orbital
        assert_eq!(ints.exchange(0, 0, 0, 0, 1, 1, 2, 2), 0.625);
        // permutational images
        assert_eq!(ints.coulomb(0, 0, 0, 0, 1, 2, 1, 2), 0.625);
    }
}
