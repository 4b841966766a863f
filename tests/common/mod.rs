#![allow(dead_code)]

use caspt2::{BlockMatrix, DenseTwoElectron, DensityMatrices, OrbitalSpace};
use ndarray::prelude::*;
use ndarray::{Array4, Array6};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Spin-summed reduced density matrices of a closed-shell determinant in
/// which every active orbital is doubly occupied:
///
/// ```text
/// G1_pq      = 2 d_pq
/// G2_pq,rs   = 4 d_pr d_qs - 2 d_ps d_qr
/// G3_pqr,stu = 8 d_ps d_qt d_ru
///            - 4 ( d_ps d_qu d_rt + d_pu d_qt d_rs + d_pt d_qs d_ru )
///            + 2 ( d_pt d_qu d_rs + d_pu d_qs d_rt )
/// ```
///
/// The Fock-contracted 4-RDM is set to zero, which is exact for a single
/// doubly occupied active orbital (a two-electron reference has no 3- or
/// 4-body density) and a formal placeholder otherwise.
pub fn closed_shell_rdms(las: usize) -> DensityMatrices {
    let d = |a: usize, b: usize| if a == b { 1.0 } else { 0.0 };

    let mut g1: Array2<f64> = Array2::zeros((las, las));
    for p in 0..las {
        g1[[p, p]] = 2.0;
    }

    let mut g2: Array4<f64> = Array4::zeros((las, las, las, las));
    for p in 0..las {
        for q in 0..las {
            for r in 0..las {
                for s in 0..las {
                    g2[[p, q, r, s]] = 4.0 * d(p, r) * d(q, s) - 2.0 * d(p, s) * d(q, r);
                }
            }
        }
    }

    let mut g3: Array6<f64> = Array6::zeros((las, las, las, las, las, las));
    for p in 0..las {
        for q in 0..las {
            for r in 0..las {
                for s in 0..las {
                    for t in 0..las {
                        for u in 0..las {
                            g3[[p, q, r, s, t, u]] = 8.0 * d(p, s) * d(q, t) * d(r, u)
                                - 4.0
                                    * (d(p, s) * d(q, u) * d(r, t)
                                        + d(p, u) * d(q, t) * d(r, s)
                                        + d(p, t) * d(q, s) * d(r, u))
                                + 2.0 * (d(p, t) * d(q, u) * d(r, s)
                                    + d(p, u) * d(q, s) * d(r, t));
                        }
                    }
                }
            }
        }
    }

    let f4: Array6<f64> = Array6::zeros((las, las, las, las, las, las));
    DensityMatrices::new(g1, g2, g3, f4)
}

/// Symmetrize a 4-index tensor to the invariances of a spin-summed 2-RDM
/// with index pairs (0, 2) and (1, 3): pair permutation and exchange of
/// the creation with the annihilation set.
pub fn symmetrize_two_body(raw: &Array4<f64>) -> Array4<f64> {
    let n = raw.shape()[0];
    let mut out = Array4::zeros((n, n, n, n));
    for p in 0..n {
        for q in 0..n {
            for r in 0..n {
                for s in 0..n {
                    out[[p, q, r, s]] = 0.25
                        * (raw[[p, q, r, s]]
                            + raw[[q, p, s, r]]
                            + raw[[r, s, p, q]]
                            + raw[[s, r, q, p]]);
                }
            }
        }
    }
    out
}

/// Symmetrize a 6-index tensor to the invariances of a spin-summed 3-RDM
/// with index pairs (0, 3), (1, 4), (2, 5): all pair permutations and the
/// creation/annihilation exchange.
pub fn symmetrize_three_body(raw: &Array6<f64>) -> Array6<f64> {
    const PERMS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let n = raw.shape()[0];
    let mut out = Array6::zeros((n, n, n, n, n, n));
    for p in 0..n {
        for q in 0..n {
            for r in 0..n {
                for s in 0..n {
                    for t in 0..n {
                        for u in 0..n {
                            let upper = [p, q, r];
                            let lower = [s, t, u];
                            let mut value = 0.0;
                            for perm in PERMS.iter() {
                                let up = [upper[perm[0]], upper[perm[1]], upper[perm[2]]];
                                let lo = [lower[perm[0]], lower[perm[1]], lower[perm[2]]];
                                value += raw[[up[0], up[1], up[2], lo[0], lo[1], lo[2]]];
                                value += raw[[lo[0], lo[1], lo[2], up[0], up[1], up[2]]];
                            }
                            out[[p, q, r, s, t, u]] = value / 12.0;
                        }
                    }
                }
            }
        }
    }
    out
}

/// Random density matrices carrying the permutational symmetries of real
/// RDMs (but no N-representability), for operator-property tests.
pub fn random_rdms(las: usize, seed: u64) -> DensityMatrices {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);

    let raw1: Array2<f64> = Array2::random_using((las, las), dist, &mut rng);
    let g1 = 0.5 * (&raw1 + &raw1.t());

    let raw2: Array4<f64> = Array4::random_using((las, las, las, las), dist, &mut rng);
    let g2 = symmetrize_two_body(&raw2);

    let raw3: Array6<f64> = Array6::random_using((las, las, las, las, las, las), dist, &mut rng);
    let g3 = symmetrize_three_body(&raw3);

    let raw4: Array6<f64> = Array6::random_using((las, las, las, las, las, las), dist, &mut rng);
    let f4 = symmetrize_three_body(&raw4);

    DensityMatrices::new(g1, g2, g3, f4)
}

/// Random symmetric one-electron integrals over the full orbital range.
pub fn random_oei(space: &OrbitalSpace, seed: u64) -> BlockMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    let mut mat = BlockMatrix::zeros(space);
    for h in 0..space.num_irreps() {
        let raw: Array2<f64> = Array2::random_using((space.n_orb(h), space.n_orb(h)), dist, &mut rng);
        let sym = 0.5 * (&raw + &raw.t());
        for row in 0..space.n_orb(h) {
            for col in 0..space.n_orb(h) {
                mat.set(h, row, col, sym[[row, col]]);
            }
        }
    }
    mat
}

/// Random generalized Fock matrix obeying the reference-point structure:
/// strictly diagonal in the occupied-occupied and virtual-virtual blocks,
/// dense symmetric in the active-active block, zero between the spaces.
pub fn reference_fock(space: &OrbitalSpace, seed: u64) -> BlockMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    let mut fock = BlockMatrix::zeros(space);
    for h in 0..space.num_irreps() {
        let n_occ = space.n_occ(h);
        let n_act = space.n_act(h);
        let n_virt = space.n_virt(h);
        let occ_diag: Array1<f64> = Array1::random_using(n_occ, dist, &mut rng);
        for i in 0..n_occ {
            fock.set(h, i, i, -2.0 + occ_diag[i]);
        }
        let raw: Array2<f64> = Array2::random_using((n_act, n_act), dist, &mut rng);
        let sym = 0.5 * (&raw + &raw.t());
        for row in 0..n_act {
            for col in 0..n_act {
                fock.set(h, n_occ + row, n_occ + col, sym[[row, col]]);
            }
        }
        let virt_diag: Array1<f64> = Array1::random_using(n_virt, dist, &mut rng);
        for a in 0..n_virt {
            fock.set(h, n_occ + n_act + a, n_occ + n_act + a, 2.0 + virt_diag[a]);
        }
    }
    fock
}

/// Random two-electron integrals with the eightfold permutational
/// symmetry of real `(pq|rs)` integrals.
pub fn random_integrals(space: &OrbitalSpace, seed: u64) -> DenseTwoElectron {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-1.0, 1.0);
    let total: usize = (0..space.num_irreps()).map(|h| space.n_orb(h)).sum();
    let raw: Array4<f64> = Array4::random_using((total, total, total, total), dist, &mut rng);
    let mut eri = Array4::zeros((total, total, total, total));
    for p in 0..total {
        for q in 0..total {
            for r in 0..total {
                for s in 0..total {
                    eri[[p, q, r, s]] = (raw[[p, q, r, s]]
                        + raw[[q, p, r, s]]
                        + raw[[p, q, s, r]]
                        + raw[[q, p, s, r]]
                        + raw[[r, s, p, q]]
                        + raw[[s, r, p, q]]
                        + raw[[r, s, q, p]]
                        + raw[[s, r, q, p]])
                        / 8.0;
                }
            }
        }
    }
    DenseTwoElectron::from_tensor(space, eri)
}
