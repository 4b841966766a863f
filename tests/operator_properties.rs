mod common;

use approx::AbsDiffEq;
use caspt2::{
    Caspt2, ExcitationCase, FockBlocks, FockContractions, OrbitalSpace, OverlapBlocks,
    PairWeights, PointGroup, TwoElectronIntegrals, VectorLayout,
};
use common::{closed_shell_rdms, random_integrals, random_oei, random_rdms, reference_fock};
use ndarray::prelude::*;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A C2v partition with active orbitals spread over three irreps, so the
/// cross-irrep branches of every block builder are exercised.
fn spread_space() -> OrbitalSpace {
    OrbitalSpace::new(
        PointGroup::C2v,
        vec![1, 1, 0, 1],
        vec![1, 1, 1, 0],
        vec![1, 0, 1, 1],
    )
}

fn assert_symmetric(name: &str, mat: &Array2<f64>, tol: f64) {
    for row in 0..mat.nrows() {
        for col in 0..row {
            assert!(
                mat[[row, col]].abs_diff_eq(&mat[[col, row]], tol),
                "{} not symmetric at ({}, {}): {} vs {}",
                name,
                row,
                col,
                mat[[row, col]],
                mat[[col, row]]
            );
        }
    }
}

#[test]
fn metric_blocks_are_symmetric_for_random_rdms() {
    let _ = env_logger::builder().is_test(true).try_init();
    let space = spread_space();
    let layout = VectorLayout::new(&space);
    let dm = random_rdms(space.n_act_total(), 41);
    let fock = reference_fock(&space, 43);

    let overlap = OverlapBlocks::build(&space, &layout, &dm);
    for h in 0..space.num_irreps() {
        assert_symmetric("SAA", &overlap.saa[h], 1.0e-10);
        assert_symmetric("SCC", &overlap.scc[h], 1.0e-10);
        assert_symmetric("SDD", &overlap.sdd[h], 1.0e-10);
        assert_symmetric("SEE", &overlap.see[h], 1.0e-10);
        assert_symmetric("SGG", &overlap.sgg[h], 1.0e-10);
        assert_symmetric("SBB singlet", &overlap.sbb_singlet[h], 1.0e-10);
        assert_symmetric("SBB triplet", &overlap.sbb_triplet[h], 1.0e-10);
        assert_symmetric("SFF singlet", &overlap.sff_singlet[h], 1.0e-10);
        assert_symmetric("SFF triplet", &overlap.sff_triplet[h], 1.0e-10);
    }

    let contractions = FockContractions::build(&space, &fock, &dm);
    let fock_blocks = FockBlocks::build(&space, &layout, &fock, &dm, &contractions, &overlap);
    for h in 0..space.num_irreps() {
        assert_symmetric("FAA", &fock_blocks.faa[h], 1.0e-9);
        assert_symmetric("FCC", &fock_blocks.fcc[h], 1.0e-9);
    }
}

#[test]
fn apply_overlap_is_linear_and_self_adjoint() {
    let space = spread_space();
    let dm = random_rdms(space.n_act_total(), 47);
    let oei = random_oei(&space, 53);
    let fock = reference_fock(&space, 59);
    let ints = random_integrals(&space, 61);
    let caspt2 = Caspt2::new(&space, &oei, &fock, &dm, &ints);

    let n = caspt2.total_size();
    let mut rng = StdRng::seed_from_u64(67);
    let dist = Uniform::new(-1.0, 1.0);
    let u: Array1<f64> = Array1::random_using(n, dist, &mut rng);
    let v: Array1<f64> = Array1::random_using(n, dist, &mut rng);

    // self-adjoint: u . S v == v . S u
    let su = caspt2.apply_overlap(u.view());
    let sv = caspt2.apply_overlap(v.view());
    let left = u.dot(&sv);
    let right = v.dot(&su);
    assert!(
        left.abs_diff_eq(&right, 1.0e-9),
        "overlap apply is not self-adjoint: {} vs {}",
        left,
        right
    );

    // linear: S (a u + b v) == a S u + b S v
    let (a, b) = (0.6, -1.3);
    let combined = caspt2.apply_overlap((a * &u + b * &v).view());
    let recombined = a * &su + b * &sv;
    for idx in 0..n {
        assert!(
            combined[idx].abs_diff_eq(&recombined[idx], 1.0e-9),
            "overlap apply is not linear at entry {}",
            idx
        );
    }

    // matvec is self-adjoint too: FAA/FCC are symmetric and the diagonal
    // corrections scale symmetric overlap blocks
    let fu = caspt2.matvec(u.view(), 0.4);
    let fv = caspt2.matvec(v.view(), 0.4);
    assert!(u.dot(&fv).abs_diff_eq(&v.dot(&fu), 1.0e-9));
}

#[test]
fn empty_mixed_irrep_blocks_are_no_ops() {
    // no active orbitals in the non-trivial irrep: every pair-type block
    // of the non-trivial excitation irrep is empty, and the operators
    // must pass over those (zero-length) segments without touching
    // anything else
    let space = OrbitalSpace::new(PointGroup::Ci, vec![2, 1], vec![2, 0], vec![2, 2]);
    let dm = random_rdms(space.n_act_total(), 71);
    let oei = random_oei(&space, 73);
    let fock = reference_fock(&space, 79);
    let ints = random_integrals(&space, 83);
    let caspt2 = Caspt2::new(&space, &oei, &fock, &dm, &ints);

    let layout = caspt2.layout();
    for case in [
        ExcitationCase::BSinglet,
        ExcitationCase::BTriplet,
        ExcitationCase::FSinglet,
        ExcitationCase::FTriplet,
        ExcitationCase::ESinglet,
        ExcitationCase::ETriplet,
        ExcitationCase::GSinglet,
        ExcitationCase::GTriplet,
    ]
    .iter()
    {
        assert_eq!(
            layout.block_len(*case, 1),
            0,
            "{:?} of the non-trivial irrep should be empty",
            case
        );
    }

    let v: Array1<f64> = Array1::ones(caspt2.total_size());
    let sv = caspt2.apply_overlap(v.view());
    let fv = caspt2.matvec(v.view(), -caspt2.e_fock());
    assert_eq!(sv.len(), caspt2.total_size());
    assert_eq!(fv.len(), caspt2.total_size());
}

#[test]
fn purely_external_blocks_reduce_to_weighted_scalings() {
    // no active orbitals at all: only the H class survives, and both the
    // overlap apply and the right-hand side have closed forms in terms of
    // the pair weight tables and the raw integrals
    let space = OrbitalSpace::new(PointGroup::C1, vec![2], vec![0], vec![2]);
    let dm = closed_shell_rdms(0);
    let oei = random_oei(&space, 89);
    let fock = reference_fock(&space, 97);
    let ints = random_integrals(&space, 101);
    let caspt2 = Caspt2::new(&space, &oei, &fock, &dm, &ints);

    let layout = caspt2.layout();
    // occupied pairs (0,0), (0,1), (1,1) x virtual pairs likewise
    assert_eq!(layout.block_len(ExcitationCase::HSinglet, 0), 9);
    assert_eq!(layout.block_len(ExcitationCase::HTriplet, 0), 1);
    assert_eq!(caspt2.total_size(), 10);

    let weights = PairWeights::build(&space);
    assert_eq!(weights.occ, vec![2.0, 1.0, 2.0]);
    assert_eq!(weights.virt, vec![2.0, 1.0, 2.0]);

    let mut rng = StdRng::seed_from_u64(103);
    let dist = Uniform::new(-1.0, 1.0);
    let v: Array1<f64> = Array1::random_using(caspt2.total_size(), dist, &mut rng);
    let sv = caspt2.apply_overlap(v.view());

    let base_singlet = layout.jump(ExcitationCase::HSinglet, 0);
    for ab in 0..3 {
        for ij in 0..3 {
            let idx = base_singlet + ij + 3 * ab;
            let expected = 4.0 * weights.occ[ij] * weights.virt[ab] * v[idx];
            assert!(
                sv[idx].abs_diff_eq(&expected, 1.0e-12),
                "H singlet scaling wrong at ij = {}, ab = {}",
                ij,
                ab
            );
        }
    }
    let base_triplet = layout.jump(ExcitationCase::HTriplet, 0);
    assert!(sv[base_triplet].abs_diff_eq(&(12.0 * v[base_triplet]), 1.0e-12));

    // right-hand side: < S_aibj | H > = 2 [ (ai|bj) + (aj|bi) ] at the
    // packed (ij, ab) position, < T_aibj | H > = 6 [ (ai|bj) - (aj|bi) ]
    let noa = 2;
    let rhs = caspt2.rhs();
    let tri = |i: usize, j: usize| i + (j * (j + 1)) / 2;
    for a in 0..2 {
        for b in a..2 {
            for i in 0..2 {
                for j in i..2 {
                    let ai_bj = ints.exchange(0, 0, 0, 0, i, j, noa + a, noa + b);
                    let aj_bi = ints.exchange(0, 0, 0, 0, j, i, noa + a, noa + b);
                    let idx = base_singlet + tri(i, j) + 3 * tri(a, b);
                    assert!(
                        rhs[idx].abs_diff_eq(&(2.0 * (ai_bj + aj_bi)), 1.0e-12),
                        "H singlet RHS wrong at a={} b={} i={} j={}",
                        a,
                        b,
                        i,
                        j
                    );
                }
            }
        }
    }
    let ai_bj = ints.exchange(0, 0, 0, 0, 0, 1, noa, noa + 1);
    let aj_bi = ints.exchange(0, 0, 0, 0, 1, 0, noa, noa + 1);
    assert!(rhs[base_triplet].abs_diff_eq(&(6.0 * (ai_bj - aj_bi)), 1.0e-12));
}
