use ndarray::prelude::*;

use crate::density::DensityMatrices;
use crate::integrals::TwoElectronIntegrals;
use crate::matrix::BlockMatrix;
use crate::orbitals::OrbitalSpace;
use crate::perturber::layout::{tri, tri_strict, ExcitationCase, VectorLayout};
use crate::perturber::overlap::OverlapBlocks;
use crate::symmetry::PointGroup;

/// Effective one-electron matrix entering the right-hand side:
///
/// ```text
/// MAT[p, q] = h_pq + sum_k [ 2 (pq|kk) - (pk|kq) ]
/// ```
///
/// with `k` running over all doubly occupied orbitals.
fn effective_one_electron(
    space: &OrbitalSpace,
    oei: &BlockMatrix,
    ints: &impl TwoElectronIntegrals,
) -> BlockMatrix {
    let num_irreps = space.num_irreps();
    let mut mat = BlockMatrix::zeros(space);
    for h in 0..num_irreps {
        let n_orb = space.n_orb(h);
        for row in 0..n_orb {
            for col in row..n_orb {
                let mut value = oei.get(h, row, col);
                for irrep_occ in 0..num_irreps {
                    for occ in 0..space.n_occ(irrep_occ) {
                        value += 2.0 * ints.coulomb(h, h, irrep_occ, irrep_occ, row, col, occ, occ)
                            - ints.coulomb(h, irrep_occ, irrep_occ, h, row, occ, occ, col);
                    }
                }
                mat.set(h, row, col, value);
                mat.set(h, col, row, value);
            }
        }
    }
    mat
}

/// Assemble the flat right-hand-side vector of the perturber linear
/// system, one segment per (class, irrep) block. The internal classes
/// (A, C, D, B, F) close their integral workspaces with the matching
/// overlap block, so all overlap blocks must exist before this runs.
/// The per-class closed forms:
///
/// ```text
/// VA:  sum_w MAT[i,w] [ 2 d_tw G1_uv - G2_tuwv - d_wu G1_tv ] + sum_xzy (ix|zy) SAA[xyz, tuv]
/// VB:  sum_xy (ix|jy) SBB[xy, tu]                      (singlet and triplet)
/// VC:  sum_w MAT[w,a] [ G2_wutv + d_ut G1_wv ] + sum_zxy (zy|xa) SCC[xyz, tuv]
/// VD:  MAT[i,a] [ 2 G1_tu | - G1_tu ] + [ (ia|yx) | (ix|ya) ] . SDD
/// VE:  sum_w [ (aj|wi) +- (ai|wj) ] {1 | 3} SEE[w, t]
/// VF:  sum_xy (ax|by) SFF[xy, tu]                      (singlet and triplet)
/// VG:  sum_u [ (ai|bu) +- (bi|au) ] {1 | 3} SGG[u, t]
/// VH:  {2 | 6} [ (ai|bj) +- (aj|bi) ]
/// ```
pub fn build_rhs(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    oei: &BlockMatrix,
    dm: &DensityMatrices,
    overlap: &OverlapBlocks,
    ints: &impl TwoElectronIntegrals,
) -> Array1<f64> {
    let num_irreps = space.num_irreps();
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;
    let mat = effective_one_electron(space, oei, ints);
    let mut rhs: Array1<f64> = Array1::zeros(layout.total_size());

    // VA
    for h in 0..num_irreps {
        let n_occ = space.n_occ(h);
        let n_act = space.n_act(h);
        let d_w = space.act_offset(h);
        let size = layout.size_ac[h];
        for count_i in 0..n_occ {
            let mut workspace: Array1<f64> = Array1::zeros(size);
            let mut target: Array1<f64> = Array1::zeros(size);

            let mut jump_xyz = 0;
            for irrep_x in 0..num_irreps {
                let occ_x = space.n_occ(irrep_x);
                let num_x = space.n_act(irrep_x);
                let d_x = space.act_offset(irrep_x);
                for irrep_y in 0..num_irreps {
                    let irrep_z =
                        PointGroup::direct_product(PointGroup::direct_product(h, irrep_x), irrep_y);
                    let occ_y = space.n_occ(irrep_y);
                    let occ_z = space.n_occ(irrep_z);
                    let num_y = space.n_act(irrep_y);
                    let num_z = space.n_act(irrep_z);
                    let d_y = space.act_offset(irrep_y);
                    let d_z = space.act_offset(irrep_z);

                    // workspace[xyz] = (ix|zy)
                    for z in 0..num_z {
                        for y in 0..num_y {
                            for x in 0..num_x {
                                workspace[jump_xyz + x + num_x * (y + num_y * z)] = ints.coulomb(
                                    h,
                                    irrep_x,
                                    irrep_z,
                                    irrep_y,
                                    count_i,
                                    occ_x + x,
                                    occ_z + z,
                                    occ_y + y,
                                );
                            }
                        }
                    }

                    // target[tuv] = - sum_w MAT[i,w] G2_tuwv
                    for v in 0..num_z {
                        for u in 0..num_y {
                            for t in 0..num_x {
                                let mut value = 0.0;
                                for w in 0..n_act {
                                    value += mat.get(h, count_i, n_occ + w)
                                        * g2[[d_x + t, d_y + u, d_w + w, d_z + v]];
                                }
                                target[jump_xyz + t + num_x * (u + num_y * v)] = -value;
                            }
                        }
                    }

                    // target[tuv] += 2 MAT[i,t] G1_uv
                    if irrep_x == h {
                        for v in 0..num_z {
                            for u in 0..num_y {
                                for t in 0..num_x {
                                    target[jump_xyz + t + num_x * (u + num_y * v)] += 2.0
                                        * mat.get(h, count_i, occ_x + t)
                                        * g1[[d_y + u, d_z + v]];
                                }
                            }
                        }
                    }

                    // target[tuv] -= MAT[i,u] G1_tv
                    if irrep_y == h {
                        for v in 0..num_z {
                            for u in 0..num_y {
                                for t in 0..num_x {
                                    target[jump_xyz + t + num_x * (u + num_y * v)] -=
                                        mat.get(h, count_i, occ_y + u) * g1[[d_x + t, d_z + v]];
                                }
                            }
                        }
                    }

                    jump_xyz += num_x * num_y * num_z;
                }
            }
            assert_eq!(jump_xyz, size, "class A workspace enumeration out of step");

            target += &workspace.dot(&overlap.saa[h]);
            let start = layout.jump(ExcitationCase::A, h) + size * count_i;
            rhs.slice_mut(s![start..start + size]).assign(&target);
        }
        assert_eq!(
            n_occ * size,
            layout.block_len(ExcitationCase::A, h),
            "class A segment length mismatch"
        );
    }

    // VC
    for h in 0..num_irreps {
        let n_occ = space.n_occ(h);
        let n_act = space.n_act(h);
        let n_virt = space.n_virt(h);
        let n_oa = n_occ + n_act;
        let d_w = space.act_offset(h);
        let size = layout.size_ac[h];
        for count_a in 0..n_virt {
            let mut workspace: Array1<f64> = Array1::zeros(size);
            let mut target: Array1<f64> = Array1::zeros(size);

            let mut jump_xyz = 0;
            for irrep_x in 0..num_irreps {
                let occ_x = space.n_occ(irrep_x);
                let num_x = space.n_act(irrep_x);
                let d_x = space.act_offset(irrep_x);
                for irrep_y in 0..num_irreps {
                    let irrep_z =
                        PointGroup::direct_product(PointGroup::direct_product(h, irrep_x), irrep_y);
                    let occ_y = space.n_occ(irrep_y);
                    let occ_z = space.n_occ(irrep_z);
                    let num_y = space.n_act(irrep_y);
                    let num_z = space.n_act(irrep_z);
                    let d_y = space.act_offset(irrep_y);
                    let d_z = space.act_offset(irrep_z);

                    // workspace[xyz] = (zy|xa)
                    for z in 0..num_z {
                        for y in 0..num_y {
                            for x in 0..num_x {
                                workspace[jump_xyz + x + num_x * (y + num_y * z)] = ints.coulomb(
                                    irrep_z,
                                    irrep_y,
                                    irrep_x,
                                    h,
                                    occ_z + z,
                                    occ_y + y,
                                    occ_x + x,
                                    n_oa + count_a,
                                );
                            }
                        }
                    }

                    // target[tuv] = sum_w MAT[w,a] G2_wutv
                    for v in 0..num_z {
                        for u in 0..num_y {
                            for t in 0..num_x {
                                let mut value = 0.0;
                                for w in 0..n_act {
                                    value += mat.get(h, n_occ + w, n_oa + count_a)
                                        * g2[[d_w + w, d_y + u, d_x + t, d_z + v]];
                                }
                                target[jump_xyz + t + num_x * (u + num_y * v)] = value;
                            }
                        }
                    }

                    // target[tuv] += sum_w MAT[w,a] d_ut G1_wv
                    if irrep_z == h && irrep_x == irrep_y {
                        for v in 0..num_z {
                            let mut value = 0.0;
                            for w in 0..n_act {
                                value += mat.get(h, n_occ + w, n_oa + count_a) * g1[[d_w + w, d_z + v]];
                            }
                            for tu in 0..num_x {
                                target[jump_xyz + tu + num_x * (tu + num_y * v)] += value;
                            }
                        }
                    }

                    jump_xyz += num_x * num_y * num_z;
                }
            }
            assert_eq!(jump_xyz, size, "class C workspace enumeration out of step");

            target += &workspace.dot(&overlap.scc[h]);
            let start = layout.jump(ExcitationCase::C, h) + size * count_a;
            rhs.slice_mut(s![start..start + size]).assign(&target);
        }
        assert_eq!(
            n_virt * size,
            layout.block_len(ExcitationCase::C, h),
            "class C segment length mismatch"
        );
    }

    // VD1 and VD2
    for h in 0..num_irreps {
        let size = layout.size_d[h];
        let d2_jump = size / 2;
        let mut jump_ai = 0;
        for irrep_i in 0..num_irreps {
            let irrep_a = PointGroup::direct_product(irrep_i, h);
            let nocc_i = space.n_occ(irrep_i);
            let noa_a = space.n_occ(irrep_a) + space.n_act(irrep_a);
            let nvir_a = space.n_virt(irrep_a);
            for count_i in 0..nocc_i {
                for count_a in 0..nvir_a {
                    let mut workspace: Array1<f64> = Array1::zeros(size);
                    let mut target: Array1<f64> = Array1::zeros(size);
                    let mat_ia = if h == 0 {
                        mat.get(h, count_i, noa_a + count_a)
                    } else {
                        0.0
                    };

                    let mut jump_xy = 0;
                    for irrep_x in 0..num_irreps {
                        let irrep_y = PointGroup::direct_product(h, irrep_x);
                        let occ_x = space.n_occ(irrep_x);
                        let occ_y = space.n_occ(irrep_y);
                        let num_x = space.n_act(irrep_x);
                        let num_y = space.n_act(irrep_y);

                        // workspace[xy] = (ia|yx), workspace[D2 + xy] = (ix|ya)
                        for y in 0..num_y {
                            for x in 0..num_x {
                                workspace[jump_xy + x + num_x * y] = ints.coulomb(
                                    irrep_y,
                                    irrep_x,
                                    irrep_i,
                                    irrep_a,
                                    occ_y + y,
                                    occ_x + x,
                                    count_i,
                                    noa_a + count_a,
                                );
                                workspace[d2_jump + jump_xy + x + num_x * y] = ints.coulomb(
                                    irrep_i,
                                    irrep_x,
                                    irrep_y,
                                    irrep_a,
                                    count_i,
                                    occ_x + x,
                                    occ_y + y,
                                    noa_a + count_a,
                                );
                            }
                        }

                        // target[tu] = 2 MAT[i,a] G1_tu, target[D2 + tu] = - MAT[i,a] G1_tu
                        if h == 0 {
                            let d_xy = space.act_offset(irrep_x);
                            for u in 0..num_y {
                                for t in 0..num_x {
                                    let value = mat_ia * g1[[d_xy + t, d_xy + u]];
                                    target[jump_xy + t + num_x * u] = 2.0 * value;
                                    target[d2_jump + jump_xy + t + num_x * u] = -value;
                                }
                            }
                        }

                        jump_xy += num_x * num_y;
                    }
                    assert_eq!(2 * jump_xy, size, "class D workspace enumeration out of step");

                    target += &workspace.dot(&overlap.sdd[h]);
                    let start = layout.jump(ExcitationCase::D, h)
                        + size * (jump_ai + count_i + nocc_i * count_a);
                    rhs.slice_mut(s![start..start + size]).assign(&target);
                }
            }
            jump_ai += nocc_i * nvir_a;
        }
        assert_eq!(
            jump_ai * size,
            layout.block_len(ExcitationCase::D, h),
            "class D segment length mismatch"
        );
    }

    // VB singlet and triplet, trivial irrep: i <= j, x <= y within one irrep
    {
        let h = 0;
        let size_singlet = layout.size_bf_singlet[h];
        let mut jump_ij = 0;
        for irrep_ij in 0..num_irreps {
            let nocc_ij = space.n_occ(irrep_ij);
            for i in 0..nocc_ij {
                for j in i..nocc_ij {
                    let mut workspace: Array1<f64> = Array1::zeros(size_singlet);
                    let mut jump_xy = 0;
                    for irrep_xy in 0..num_irreps {
                        let occ_xy = space.n_occ(irrep_xy);
                        let num_xy = space.n_act(irrep_xy);
                        for x in 0..num_xy {
                            for y in x..num_xy {
                                workspace[jump_xy + tri(x, y)] = ints.coulomb(
                                    irrep_ij,
                                    irrep_xy,
                                    irrep_ij,
                                    irrep_xy,
                                    i,
                                    occ_xy + x,
                                    j,
                                    occ_xy + y,
                                );
                            }
                        }
                        jump_xy += (num_xy * (num_xy + 1)) / 2;
                    }
                    assert_eq!(jump_xy, size_singlet, "class B workspace out of step");

                    let target = workspace.dot(&overlap.sbb_singlet[h]);
                    let start = layout.jump(ExcitationCase::BSinglet, h)
                        + size_singlet * (jump_ij + tri(i, j));
                    rhs.slice_mut(s![start..start + size_singlet]).assign(&target);
                }
            }
            jump_ij += (nocc_ij * (nocc_ij + 1)) / 2;
        }
        assert_eq!(
            jump_ij * size_singlet,
            layout.block_len(ExcitationCase::BSinglet, h),
            "class B singlet segment length mismatch"
        );

        let size_triplet = layout.size_bf_triplet[h];
        let mut jump_ij = 0;
        for irrep_ij in 0..num_irreps {
            let nocc_ij = space.n_occ(irrep_ij);
            for i in 0..nocc_ij {
                for j in (i + 1)..nocc_ij {
                    let mut workspace: Array1<f64> = Array1::zeros(size_triplet);
                    let mut jump_xy = 0;
                    for irrep_xy in 0..num_irreps {
                        let occ_xy = space.n_occ(irrep_xy);
                        let num_xy = space.n_act(irrep_xy);
                        for x in 0..num_xy {
                            for y in (x + 1)..num_xy {
                                workspace[jump_xy + tri_strict(x, y)] = ints.coulomb(
                                    irrep_ij,
                                    irrep_xy,
                                    irrep_ij,
                                    irrep_xy,
                                    i,
                                    occ_xy + x,
                                    j,
                                    occ_xy + y,
                                );
                            }
                        }
                        jump_xy += (num_xy * num_xy.saturating_sub(1)) / 2;
                    }
                    assert_eq!(jump_xy, size_triplet, "class B workspace out of step");

                    let target = workspace.dot(&overlap.sbb_triplet[h]);
                    let start = layout.jump(ExcitationCase::BTriplet, h)
                        + size_triplet * (jump_ij + tri_strict(i, j));
                    rhs.slice_mut(s![start..start + size_triplet]).assign(&target);
                }
            }
            jump_ij += (nocc_ij * nocc_ij.saturating_sub(1)) / 2;
        }
        assert_eq!(
            jump_ij * size_triplet,
            layout.block_len(ExcitationCase::BTriplet, h),
            "class B triplet segment length mismatch"
        );
    }
    // VB, non-trivial irreps: the same workspace feeds singlet and triplet
    for h in 1..num_irreps {
        let size = layout.size_bf_singlet[h];
        let mut jump_ij = 0;
        for irrep_i in 0..num_irreps {
            let irrep_j = PointGroup::direct_product(h, irrep_i);
            if irrep_i < irrep_j {
                let nocc_i = space.n_occ(irrep_i);
                let nocc_j = space.n_occ(irrep_j);
                for i in 0..nocc_i {
                    for j in 0..nocc_j {
                        let mut workspace: Array1<f64> = Array1::zeros(size);
                        let mut jump_xy = 0;
                        for irrep_x in 0..num_irreps {
                            let irrep_y = PointGroup::direct_product(h, irrep_x);
                            if irrep_x < irrep_y {
                                let occ_x = space.n_occ(irrep_x);
                                let occ_y = space.n_occ(irrep_y);
                                let num_x = space.n_act(irrep_x);
                                let num_y = space.n_act(irrep_y);
                                for y in 0..num_y {
                                    for x in 0..num_x {
                                        workspace[jump_xy + x + num_x * y] = ints.coulomb(
                                            irrep_i,
                                            irrep_x,
                                            irrep_j,
                                            irrep_y,
                                            i,
                                            occ_x + x,
                                            j,
                                            occ_y + y,
                                        );
                                    }
                                }
                                jump_xy += num_x * num_y;
                            }
                        }
                        assert_eq!(jump_xy, size, "class B workspace out of step");

                        let target = workspace.dot(&overlap.sbb_singlet[h]);
                        let start = layout.jump(ExcitationCase::BSinglet, h)
                            + size * (jump_ij + i + nocc_i * j);
                        rhs.slice_mut(s![start..start + size]).assign(&target);

                        let target = workspace.dot(&overlap.sbb_triplet[h]);
                        let start = layout.jump(ExcitationCase::BTriplet, h)
                            + size * (jump_ij + i + nocc_i * j);
                        rhs.slice_mut(s![start..start + size]).assign(&target);
                    }
                }
                jump_ij += nocc_i * nocc_j;
            }
        }
        assert_eq!(
            jump_ij * size,
            layout.block_len(ExcitationCase::BSinglet, h),
            "class B segment length mismatch"
        );
    }

    // VF singlet and triplet, trivial irrep
    {
        let h = 0;
        let size_singlet = layout.size_bf_singlet[h];
        let mut jump_ab = 0;
        for irrep_ab in 0..num_irreps {
            let noa_ab = space.n_occ(irrep_ab) + space.n_act(irrep_ab);
            let nvir_ab = space.n_virt(irrep_ab);
            for a in 0..nvir_ab {
                for b in a..nvir_ab {
                    let mut workspace: Array1<f64> = Array1::zeros(size_singlet);
                    let mut jump_xy = 0;
                    for irrep_xy in 0..num_irreps {
                        let occ_xy = space.n_occ(irrep_xy);
                        let num_xy = space.n_act(irrep_xy);
                        for x in 0..num_xy {
                            for y in x..num_xy {
                                workspace[jump_xy + tri(x, y)] = ints.exchange(
                                    irrep_xy,
                                    irrep_xy,
                                    irrep_ab,
                                    irrep_ab,
                                    occ_xy + x,
                                    occ_xy + y,
                                    noa_ab + a,
                                    noa_ab + b,
                                );
                            }
                        }
                        jump_xy += (num_xy * (num_xy + 1)) / 2;
                    }
                    assert_eq!(jump_xy, size_singlet, "class F workspace out of step");

                    let target = workspace.dot(&overlap.sff_singlet[h]);
                    let start = layout.jump(ExcitationCase::FSinglet, h)
                        + size_singlet * (jump_ab + tri(a, b));
                    rhs.slice_mut(s![start..start + size_singlet]).assign(&target);
                }
            }
            jump_ab += (nvir_ab * (nvir_ab + 1)) / 2;
        }
        assert_eq!(
            jump_ab * size_singlet,
            layout.block_len(ExcitationCase::FSinglet, h),
            "class F singlet segment length mismatch"
        );

        let size_triplet = layout.size_bf_triplet[h];
        let mut jump_ab = 0;
        for irrep_ab in 0..num_irreps {
            let noa_ab = space.n_occ(irrep_ab) + space.n_act(irrep_ab);
            let nvir_ab = space.n_virt(irrep_ab);
            for a in 0..nvir_ab {
                for b in (a + 1)..nvir_ab {
                    let mut workspace: Array1<f64> = Array1::zeros(size_triplet);
                    let mut jump_xy = 0;
                    for irrep_xy in 0..num_irreps {
                        let occ_xy = space.n_occ(irrep_xy);
                        let num_xy = space.n_act(irrep_xy);
                        for x in 0..num_xy {
                            for y in (x + 1)..num_xy {
                                workspace[jump_xy + tri_strict(x, y)] = ints.exchange(
                                    irrep_xy,
                                    irrep_xy,
                                    irrep_ab,
                                    irrep_ab,
                                    occ_xy + x,
                                    occ_xy + y,
                                    noa_ab + a,
                                    noa_ab + b,
                                );
                            }
                        }
                        jump_xy += (num_xy * num_xy.saturating_sub(1)) / 2;
                    }
                    assert_eq!(jump_xy, size_triplet, "class F workspace out of step");

                    let target = workspace.dot(&overlap.sff_triplet[h]);
                    let start = layout.jump(ExcitationCase::FTriplet, h)
                        + size_triplet * (jump_ab + tri_strict(a, b));
                    rhs.slice_mut(s![start..start + size_triplet]).assign(&target);
                }
            }
            jump_ab += (nvir_ab * nvir_ab.saturating_sub(1)) / 2;
        }
        assert_eq!(
            jump_ab * size_triplet,
            layout.block_len(ExcitationCase::FTriplet, h),
            "class F triplet segment length mismatch"
        );
    }
    // VF, non-trivial irreps
    for h in 1..num_irreps {
        let size = layout.size_bf_singlet[h];
        let mut jump_ab = 0;
        for irrep_a in 0..num_irreps {
            let irrep_b = PointGroup::direct_product(h, irrep_a);
            if irrep_a < irrep_b {
                let noa_a = space.n_occ(irrep_a) + space.n_act(irrep_a);
                let noa_b = space.n_occ(irrep_b) + space.n_act(irrep_b);
                let nvir_a = space.n_virt(irrep_a);
                let nvir_b = space.n_virt(irrep_b);
                for a in 0..nvir_a {
                    for b in 0..nvir_b {
                        let mut workspace: Array1<f64> = Array1::zeros(size);
                        let mut jump_xy = 0;
                        for irrep_x in 0..num_irreps {
                            let irrep_y = PointGroup::direct_product(h, irrep_x);
                            if irrep_x < irrep_y {
                                let occ_x = space.n_occ(irrep_x);
                                let occ_y = space.n_occ(irrep_y);
                                let num_x = space.n_act(irrep_x);
                                let num_y = space.n_act(irrep_y);
                                for y in 0..num_y {
                                    for x in 0..num_x {
                                        workspace[jump_xy + x + num_x * y] = ints.exchange(
                                            irrep_x,
                                            irrep_y,
                                            irrep_a,
                                            irrep_b,
                                            occ_x + x,
                                            occ_y + y,
                                            noa_a + a,
                                            noa_b + b,
                                        );
                                    }
                                }
                                jump_xy += num_x * num_y;
                            }
                        }
                        assert_eq!(jump_xy, size, "class F workspace out of step");

                        let target = workspace.dot(&overlap.sff_singlet[h]);
                        let start = layout.jump(ExcitationCase::FSinglet, h)
                            + size * (jump_ab + a + nvir_a * b);
                        rhs.slice_mut(s![start..start + size]).assign(&target);

                        let target = workspace.dot(&overlap.sff_triplet[h]);
                        let start = layout.jump(ExcitationCase::FTriplet, h)
                            + size * (jump_ab + a + nvir_a * b);
                        rhs.slice_mut(s![start..start + size]).assign(&target);
                    }
                }
                jump_ab += nvir_a * nvir_b;
            }
        }
        assert_eq!(
            jump_ab * size,
            layout.block_len(ExcitationCase::FSinglet, h),
            "class F segment length mismatch"
        );
    }

    // VE singlet and triplet
    for h in 0..num_irreps {
        let occ_t = space.n_occ(h);
        let num_t = space.n_act(h);
        let see = &overlap.see[h];
        let base_singlet = layout.jump(ExcitationCase::ESinglet, h);
        let base_triplet = layout.jump(ExcitationCase::ETriplet, h);
        let mut jump_aij_singlet = 0;
        let mut jump_aij_triplet = 0;
        for irrep_a in 0..num_irreps {
            let nvir_a = space.n_virt(irrep_a);
            let noa_a = space.n_occ(irrep_a) + space.n_act(irrep_a);
            let irrep_occ = PointGroup::direct_product(irrep_a, h);
            if irrep_occ == 0 {
                for irrep_ij in 0..num_irreps {
                    let nocc_ij = space.n_occ(irrep_ij);
                    for i in 0..nocc_ij {
                        for j in i..nocc_ij {
                            for a in 0..nvir_a {
                                let count_singlet = jump_aij_singlet + a + nvir_a * tri(i, j);
                                let count_triplet = if j > i {
                                    jump_aij_triplet + a + nvir_a * tri_strict(i, j)
                                } else {
                                    0
                                };
                                for t in 0..num_t {
                                    let mut value_singlet = 0.0;
                                    let mut value_triplet = 0.0;
                                    for w in 0..num_t {
                                        let see_wt = see[[w, t]];
                                        let aj_wi = ints.coulomb(
                                            irrep_ij, h, irrep_ij, irrep_a, i, occ_t + w, j,
                                            noa_a + a,
                                        );
                                        let ai_wj = ints.coulomb(
                                            irrep_ij, h, irrep_ij, irrep_a, j, occ_t + w, i,
                                            noa_a + a,
                                        );
                                        value_singlet += see_wt * (aj_wi + ai_wj);
                                        value_triplet += 3.0 * see_wt * (aj_wi - ai_wj);
                                    }
                                    rhs[base_singlet + t + num_t * count_singlet] = value_singlet;
                                    if j > i {
                                        rhs[base_triplet + t + num_t * count_triplet] =
                                            value_triplet;
                                    }
                                }
                            }
                        }
                    }
                    jump_aij_singlet += (nvir_a * nocc_ij * (nocc_ij + 1)) / 2;
                    jump_aij_triplet += (nvir_a * nocc_ij * nocc_ij.saturating_sub(1)) / 2;
                }
            } else {
                for irrep_i in 0..num_irreps {
                    let irrep_j = PointGroup::direct_product(irrep_i, irrep_occ);
                    if irrep_i < irrep_j {
                        let nocc_i = space.n_occ(irrep_i);
                        let nocc_j = space.n_occ(irrep_j);
                        for i in 0..nocc_i {
                            for j in 0..nocc_j {
                                for a in 0..nvir_a {
                                    let count_singlet =
                                        jump_aij_singlet + a + nvir_a * (i + nocc_i * j);
                                    let count_triplet =
                                        jump_aij_triplet + a + nvir_a * (i + nocc_i * j);
                                    for t in 0..num_t {
                                        let mut value_singlet = 0.0;
                                        let mut value_triplet = 0.0;
                                        for w in 0..num_t {
                                            let see_wt = see[[w, t]];
                                            let aj_wi = ints.coulomb(
                                                irrep_i, h, irrep_j, irrep_a, i, occ_t + w, j,
                                                noa_a + a,
                                            );
                                            let ai_wj = ints.coulomb(
                                                irrep_j, h, irrep_i, irrep_a, j, occ_t + w, i,
                                                noa_a + a,
                                            );
                                            value_singlet += see_wt * (aj_wi + ai_wj);
                                            value_triplet += 3.0 * see_wt * (aj_wi - ai_wj);
                                        }
                                        rhs[base_singlet + t + num_t * count_singlet] =
                                            value_singlet;
                                        rhs[base_triplet + t + num_t * count_triplet] =
                                            value_triplet;
                                    }
                                }
                            }
                        }
                        jump_aij_singlet += nvir_a * nocc_i * nocc_j;
                        jump_aij_triplet += nvir_a * nocc_i * nocc_j;
                    }
                }
            }
        }
        assert_eq!(
            jump_aij_singlet * num_t,
            layout.block_len(ExcitationCase::ESinglet, h),
            "class E singlet segment length mismatch"
        );
        assert_eq!(
            jump_aij_triplet * num_t,
            layout.block_len(ExcitationCase::ETriplet, h),
            "class E triplet segment length mismatch"
        );
    }

    // VG singlet and triplet
    for h in 0..num_irreps {
        let occ_t = space.n_occ(h);
        let num_t = space.n_act(h);
        let sgg = &overlap.sgg[h];
        let base_singlet = layout.jump(ExcitationCase::GSinglet, h);
        let base_triplet = layout.jump(ExcitationCase::GTriplet, h);
        let mut jump_abi_singlet = 0;
        let mut jump_abi_triplet = 0;
        for irrep_i in 0..num_irreps {
            let nocc_i = space.n_occ(irrep_i);
            let irrep_virt = PointGroup::direct_product(irrep_i, h);
            if irrep_virt == 0 {
                for irrep_ab in 0..num_irreps {
                    let noa_ab = space.n_occ(irrep_ab) + space.n_act(irrep_ab);
                    let nvir_ab = space.n_virt(irrep_ab);
                    for i in 0..nocc_i {
                        for a in 0..nvir_ab {
                            for b in a..nvir_ab {
                                let count_singlet = jump_abi_singlet + i + nocc_i * tri(a, b);
                                let count_triplet = if b > a {
                                    jump_abi_triplet + i + nocc_i * tri_strict(a, b)
                                } else {
                                    0
                                };
                                for t in 0..num_t {
                                    let mut value_singlet = 0.0;
                                    let mut value_triplet = 0.0;
                                    for u in 0..num_t {
                                        let sgg_ut = sgg[[u, t]];
                                        let ai_bu = ints.exchange(
                                            irrep_i, h, irrep_ab, irrep_ab, i, occ_t + u,
                                            noa_ab + a, noa_ab + b,
                                        );
                                        let bi_au = ints.exchange(
                                            irrep_i, h, irrep_ab, irrep_ab, i, occ_t + u,
                                            noa_ab + b, noa_ab + a,
                                        );
                                        value_singlet += sgg_ut * (ai_bu + bi_au);
                                        value_triplet += 3.0 * sgg_ut * (ai_bu - bi_au);
                                    }
                                    rhs[base_singlet + t + num_t * count_singlet] = value_singlet;
                                    if b > a {
                                        rhs[base_triplet + t + num_t * count_triplet] =
                                            value_triplet;
                                    }
                                }
                            }
                        }
                    }
                    jump_abi_singlet += (nocc_i * nvir_ab * (nvir_ab + 1)) / 2;
                    jump_abi_triplet += (nocc_i * nvir_ab * nvir_ab.saturating_sub(1)) / 2;
                }
            } else {
                for irrep_a in 0..num_irreps {
                    let irrep_b = PointGroup::direct_product(irrep_a, irrep_virt);
                    if irrep_a < irrep_b {
                        let noa_a = space.n_occ(irrep_a) + space.n_act(irrep_a);
                        let noa_b = space.n_occ(irrep_b) + space.n_act(irrep_b);
                        let nvir_a = space.n_virt(irrep_a);
                        let nvir_b = space.n_virt(irrep_b);
                        for i in 0..nocc_i {
                            for a in 0..nvir_a {
                                for b in 0..nvir_b {
                                    let count_singlet =
                                        jump_abi_singlet + i + nocc_i * (a + nvir_a * b);
                                    let count_triplet =
                                        jump_abi_triplet + i + nocc_i * (a + nvir_a * b);
                                    for t in 0..num_t {
                                        let mut value_singlet = 0.0;
                                        let mut value_triplet = 0.0;
                                        for u in 0..num_t {
                                            let sgg_ut = sgg[[u, t]];
                                            let ai_bu = ints.exchange(
                                                irrep_i, h, irrep_a, irrep_b, i, occ_t + u,
                                                noa_a + a, noa_b + b,
                                            );
                                            let bi_au = ints.exchange(
                                                irrep_i, h, irrep_b, irrep_a, i, occ_t + u,
                                                noa_b + b, noa_a + a,
                                            );
                                            value_singlet += sgg_ut * (ai_bu + bi_au);
                                            value_triplet += 3.0 * sgg_ut * (ai_bu - bi_au);
                                        }
                                        rhs[base_singlet + t + num_t * count_singlet] =
                                            value_singlet;
                                        rhs[base_triplet + t + num_t * count_triplet] =
                                            value_triplet;
                                    }
                                }
                            }
                        }
                        jump_abi_singlet += nocc_i * nvir_a * nvir_b;
                        jump_abi_triplet += nocc_i * nvir_a * nvir_b;
                    }
                }
            }
        }
        assert_eq!(
            jump_abi_singlet * num_t,
            layout.block_len(ExcitationCase::GSinglet, h),
            "class G singlet segment length mismatch"
        );
        assert_eq!(
            jump_abi_triplet * num_t,
            layout.block_len(ExcitationCase::GTriplet, h),
            "class G triplet segment length mismatch"
        );
    }

    // VH singlet and triplet
    for h in 0..num_irreps {
        let base_singlet = layout.jump(ExcitationCase::HSinglet, h);
        let base_triplet = layout.jump(ExcitationCase::HTriplet, h);
        let mut jump_aibj_singlet = 0;
        let mut jump_aibj_triplet = 0;
        if h == 0 {
            for irrep_ij in 0..num_irreps {
                let nocc_ij = space.n_occ(irrep_ij);
                let linsize_singlet = (nocc_ij * (nocc_ij + 1)) / 2;
                let linsize_triplet = (nocc_ij * nocc_ij.saturating_sub(1)) / 2;
                for irrep_ab in 0..num_irreps {
                    let nvir_ab = space.n_virt(irrep_ab);
                    let noa_ab = space.n_occ(irrep_ab) + space.n_act(irrep_ab);
                    for a in 0..nvir_ab {
                        for b in a..nvir_ab {
                            for i in 0..nocc_ij {
                                for j in i..nocc_ij {
                                    let ai_bj = ints.exchange(
                                        irrep_ij, irrep_ij, irrep_ab, irrep_ab, i, j, noa_ab + a,
                                        noa_ab + b,
                                    );
                                    let aj_bi = ints.exchange(
                                        irrep_ij, irrep_ij, irrep_ab, irrep_ab, j, i, noa_ab + a,
                                        noa_ab + b,
                                    );
                                    let count_singlet = jump_aibj_singlet
                                        + tri(i, j)
                                        + linsize_singlet * tri(a, b);
                                    rhs[base_singlet + count_singlet] = 2.0 * (ai_bj + aj_bi);
                                    if b > a && j > i {
                                        let count_triplet = jump_aibj_triplet
                                            + tri_strict(i, j)
                                            + linsize_triplet * tri_strict(a, b);
                                        rhs[base_triplet + count_triplet] =
                                            6.0 * (ai_bj - aj_bi);
                                    }
                                }
                            }
                        }
                    }
                    jump_aibj_singlet += (linsize_singlet * nvir_ab * (nvir_ab + 1)) / 2;
                    jump_aibj_triplet += (linsize_triplet * nvir_ab * nvir_ab.saturating_sub(1)) / 2;
                }
            }
        } else {
            for irrep_i in 0..num_irreps {
                let irrep_j = PointGroup::direct_product(h, irrep_i);
                if irrep_i < irrep_j {
                    let nocc_i = space.n_occ(irrep_i);
                    let nocc_j = space.n_occ(irrep_j);
                    for irrep_a in 0..num_irreps {
                        let irrep_b = PointGroup::direct_product(h, irrep_a);
                        if irrep_a < irrep_b {
                            let nvir_a = space.n_virt(irrep_a);
                            let nvir_b = space.n_virt(irrep_b);
                            let noa_a = space.n_occ(irrep_a) + space.n_act(irrep_a);
                            let noa_b = space.n_occ(irrep_b) + space.n_act(irrep_b);
                            for a in 0..nvir_a {
                                for b in 0..nvir_b {
                                    for i in 0..nocc_i {
                                        for j in 0..nocc_j {
                                            let count = i + nocc_i * (j + nocc_j * (a + nvir_a * b));
                                            let ai_bj = ints.exchange(
                                                irrep_i, irrep_j, irrep_a, irrep_b, i, j,
                                                noa_a + a, noa_b + b,
                                            );
                                            let aj_bi = ints.exchange(
                                                irrep_j, irrep_i, irrep_a, irrep_b, j, i,
                                                noa_a + a, noa_b + b,
                                            );
                                            rhs[base_singlet + jump_aibj_singlet + count] =
                                                2.0 * (ai_bj + aj_bi);
                                            rhs[base_triplet + jump_aibj_triplet + count] =
                                                6.0 * (ai_bj - aj_bi);
                                        }
                                    }
                                }
                            }
                            jump_aibj_singlet += nocc_i * nocc_j * nvir_a * nvir_b;
                            jump_aibj_triplet += nocc_i * nocc_j * nvir_a * nvir_b;
                        }
                    }
                }
            }
        }
        assert_eq!(
            jump_aibj_singlet,
            layout.block_len(ExcitationCase::HSinglet, h),
            "class H singlet segment length mismatch"
        );
        assert_eq!(
            jump_aibj_triplet,
            layout.block_len(ExcitationCase::HTriplet, h),
            "class H triplet segment length mismatch"
        );
    }

    rhs
}
