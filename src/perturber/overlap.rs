use ndarray::prelude::*;
use rayon::prelude::*;

use crate::density::DensityMatrices;
use crate::orbitals::OrbitalSpace;
use crate::perturber::layout::{tri, tri_strict, VectorLayout};
use crate::perturber::verify::debug_assert_symmetric;
use crate::symmetry::{Irrep, PointGroup};

/// Dense overlap blocks of the excitation classes: Gram matrices of the
/// spin-adapted excitation basis functions within one (class, irrep)
/// block, assembled from 1-/2-/3-RDM contractions.
///
/// The entries follow the closed forms of the internally contracted
/// excitation algebra; the Kronecker deltas of those formulas appear here
/// as irrep guards plus shared loop indices. Every block is symmetric.
#[derive(Clone, Debug)]
pub struct OverlapBlocks {
    pub saa: Vec<Array2<f64>>,
    pub scc: Vec<Array2<f64>>,
    pub sdd: Vec<Array2<f64>>,
    pub see: Vec<Array2<f64>>,
    pub sgg: Vec<Array2<f64>>,
    pub sbb_singlet: Vec<Array2<f64>>,
    pub sbb_triplet: Vec<Array2<f64>>,
    pub sff_singlet: Vec<Array2<f64>>,
    pub sff_triplet: Vec<Array2<f64>>,
}

impl OverlapBlocks {
    /// Build all overlap blocks. The per-irrep blocks are independent of
    /// each other and are built in parallel; the summation order inside
    /// each block is fixed.
    pub fn build(space: &OrbitalSpace, layout: &VectorLayout, dm: &DensityMatrices) -> Self {
        let num_irreps = space.num_irreps();

        let aa_cc: Vec<(Array2<f64>, Array2<f64>)> = (0..num_irreps)
            .into_par_iter()
            .map(|h| build_saa_scc(space, layout, dm, h))
            .collect();
        let dd: Vec<Array2<f64>> = (0..num_irreps)
            .into_par_iter()
            .map(|h| build_sdd(space, layout, dm, h))
            .collect();
        let ee_gg: Vec<(Array2<f64>, Array2<f64>)> = (0..num_irreps)
            .into_par_iter()
            .map(|h| build_see_sgg(space, dm, h))
            .collect();
        let bb_ff_singlet: Vec<(Array2<f64>, Array2<f64>)> = (0..num_irreps)
            .into_par_iter()
            .map(|h| build_bb_ff_singlet(space, layout, dm, h))
            .collect();
        let bb_ff_triplet: Vec<(Array2<f64>, Array2<f64>)> = (0..num_irreps)
            .into_par_iter()
            .map(|h| build_bb_ff_triplet(space, layout, dm, h))
            .collect();

        let (saa, scc) = aa_cc.into_iter().unzip();
        let (see, sgg) = ee_gg.into_iter().unzip();
        let (sbb_singlet, sff_singlet) = bb_ff_singlet.into_iter().unzip();
        let (sbb_triplet, sff_triplet) = bb_ff_triplet.into_iter().unzip();

        let blocks = OverlapBlocks {
            saa,
            scc,
            sdd: dd,
            see,
            sgg,
            sbb_singlet,
            sbb_triplet,
            sff_singlet,
            sff_triplet,
        };
        blocks.debug_verify();
        blocks
    }

    /// Debug-only recomputation guard: every overlap block has to come out
    /// symmetric, otherwise a contraction above is wrong.
    fn debug_verify(&self) {
        for (name, family) in [
            ("SAA", &self.saa),
            ("SCC", &self.scc),
            ("SDD", &self.sdd),
            ("SEE", &self.see),
            ("SGG", &self.sgg),
            ("SBB singlet", &self.sbb_singlet),
            ("SBB triplet", &self.sbb_triplet),
            ("SFF singlet", &self.sff_singlet),
            ("SFF triplet", &self.sff_triplet),
        ]
        .iter()
        {
            for block in family.iter() {
                debug_assert_symmetric(name, block);
            }
        }
    }
}

/// SAA and SCC for one excitation irrep:
///
/// ```text
/// SAA[xyz, tuv] = < E_zy E_jx E_ti E_uv > / delta_ji
///     = 2 delta_tx G2_{zuyv} + 2 delta_tx delta_uy G1_{zv} - G3_{ztuyxv}
///     - delta_uy G2_{tzxv} - delta_ty G2_{zuxv} - delta_ux G2_{ztyv}
///     - delta_ux delta_ty G1_{zv}
///
/// SCC[xyz, tuv] = < E_zy E_xb E_at E_uv > / delta_ab
///     = G3_{zxuytv} + delta_uy G2_{xztv} + delta_xy G2_{zutv}
///     + delta_ut G2_{zxyv} + delta_ut delta_xy G1_{zv}
/// ```
fn build_saa_scc(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    dm: &DensityMatrices,
    h: Irrep,
) -> (Array2<f64>, Array2<f64>) {
    let num_irreps = space.num_irreps();
    let size = layout.size_ac[h];
    let mut saa: Array2<f64> = Array2::zeros((size, size));
    let mut scc: Array2<f64> = Array2::zeros((size, size));
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;
    let g3 = &dm.three_rdm;

    let mut jump_col = 0;
    for irrep_t in 0..num_irreps {
        let d_t = space.act_offset(irrep_t);
        let num_t = space.n_act(irrep_t);
        for irrep_u in 0..num_irreps {
            let d_u = space.act_offset(irrep_u);
            let num_u = space.n_act(irrep_u);
            let irrep_v = PointGroup::direct_product(PointGroup::direct_product(h, irrep_t), irrep_u);
            let d_v = space.act_offset(irrep_v);
            let num_v = space.n_act(irrep_v);
            let mut jump_row = 0;
            for irrep_x in 0..num_irreps {
                let d_x = space.act_offset(irrep_x);
                let num_x = space.n_act(irrep_x);
                for irrep_y in 0..num_irreps {
                    let d_y = space.act_offset(irrep_y);
                    let num_y = space.n_act(irrep_y);
                    let irrep_z =
                        PointGroup::direct_product(PointGroup::direct_product(h, irrep_x), irrep_y);
                    let d_z = space.act_offset(irrep_z);
                    let num_z = space.n_act(irrep_z);

                    let row = |x: usize, y: usize, z: usize| jump_row + x + num_x * (y + num_y * z);
                    let col = |t: usize, u: usize, v: usize| jump_col + t + num_t * (u + num_u * v);

                    // SAA: - G3_{ztuyxv}    SCC: + G3_{zxuytv}
                    for t in 0..num_t {
                        for u in 0..num_u {
                            for v in 0..num_v {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            saa[[row(x, y, z), col(t, u, v)]] = -g3
                                                [[d_z + z, d_t + t, d_u + u, d_y + y, d_x + x, d_v + v]];
                                            scc[[row(x, y, z), col(t, u, v)]] = g3
                                                [[d_z + z, d_x + x, d_u + u, d_y + y, d_t + t, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_x {
                        // SAA: + 2 delta_tx G2_{zuyv}
                        for xt in 0..num_t {
                            for u in 0..num_u {
                                for v in 0..num_v {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            saa[[row(xt, y, z), col(xt, u, v)]] +=
                                                2.0 * g2[[d_z + z, d_u + u, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_y {
                        // SAA: - delta_uy G2_{tzxv}
                        for uy in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            saa[[row(x, uy, z), col(t, uy, v)]] -=
                                                g2[[d_t + t, d_z + z, d_x + x, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_y {
                        // SAA: - delta_ty G2_{zuxv}
                        for ty in 0..num_t {
                            for u in 0..num_u {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            saa[[row(x, ty, z), col(ty, u, v)]] -=
                                                g2[[d_z + z, d_u + u, d_x + x, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_x {
                        // SAA: - delta_ux G2_{ztyv}
                        for ux in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            saa[[row(ux, y, z), col(t, ux, v)]] -=
                                                g2[[d_z + z, d_t + t, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_y {
                        // SCC: + delta_uy G2_{xztv}
                        for uy in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            scc[[row(x, uy, z), col(t, uy, v)]] +=
                                                g2[[d_x + x, d_z + z, d_t + t, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_x == irrep_y {
                        // SCC: + delta_xy G2_{zutv}
                        for xy in 0..num_x {
                            for t in 0..num_t {
                                for u in 0..num_u {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            scc[[row(xy, xy, z), col(t, u, v)]] +=
                                                g2[[d_z + z, d_u + u, d_t + t, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_t {
                        // SCC: + delta_ut G2_{zxyv}
                        for ut in 0..num_u {
                            for v in 0..num_v {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            scc[[row(x, y, z), col(ut, ut, v)]] +=
                                                g2[[d_z + z, d_x + x, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_x && irrep_u == irrep_y && irrep_z == irrep_v {
                        // SAA: + 2 delta_tx delta_uy G1_{zv}
                        for xt in 0..num_t {
                            for uy in 0..num_u {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        saa[[row(xt, uy, z), col(xt, uy, v)]] +=
                                            2.0 * g1[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_x && irrep_t == irrep_y && irrep_z == irrep_v {
                        // SAA: - delta_ux delta_ty G1_{zv}
                        for ty in 0..num_t {
                            for ux in 0..num_u {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        saa[[row(ux, ty, z), col(ty, ux, v)]] -=
                                            g1[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_t && irrep_x == irrep_y && irrep_z == irrep_v {
                        // SCC: + delta_ut delta_xy G1_{zv}
                        for xy in 0..num_x {
                            for tu in 0..num_t {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        scc[[row(xy, xy, z), col(tu, tu, v)]] +=
                                            g1[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }
                    }

                    jump_row += num_x * num_y * num_z;
                }
            }
            jump_col += num_t * num_u * num_v;
        }
    }

    (saa, scc)
}

/// SDD for one excitation irrep, with the D1/D2 sub-blocks stacked at
/// offset `size_d / 2` in both the row and the column direction:
///
/// ```text
/// SD1D1[xy, tu] =   2 G2_{ytxu} + 2 delta_tx G1_{yu}
/// SD1D2[xy, tu] =   - G2_{ytxu} -   delta_tx G1_{yu}
/// SD2D1[xy, tu] =   - G2_{ytxu} -   delta_tx G1_{yu}
/// SD2D2[xy, tu] =   - G2_{ytux} + 2 delta_tx G1_{yu}
/// ```
fn build_sdd(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    dm: &DensityMatrices,
    h: Irrep,
) -> Array2<f64> {
    let num_irreps = space.num_irreps();
    let size = layout.size_d[h];
    let d2_jump = size / 2;
    let mut sdd: Array2<f64> = Array2::zeros((size, size));
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;

    let mut jump_col = 0;
    for irrep_t in 0..num_irreps {
        let d_t = space.act_offset(irrep_t);
        let num_t = space.n_act(irrep_t);
        let irrep_u = PointGroup::direct_product(h, irrep_t);
        let d_u = space.act_offset(irrep_u);
        let num_u = space.n_act(irrep_u);
        let mut jump_row = 0;
        for irrep_x in 0..num_irreps {
            let d_x = space.act_offset(irrep_x);
            let num_x = space.n_act(irrep_x);
            let irrep_y = PointGroup::direct_product(h, irrep_x);
            let d_y = space.act_offset(irrep_y);
            let num_y = space.n_act(irrep_y);

            for t in 0..num_t {
                for u in 0..num_u {
                    for x in 0..num_x {
                        for y in 0..num_y {
                            let gamma_ytxu = g2[[d_y + y, d_t + t, d_x + x, d_u + u]];
                            let gamma_ytux = g2[[d_y + y, d_t + t, d_u + u, d_x + x]];
                            let row = jump_row + x + num_x * y;
                            let col = jump_col + t + num_t * u;
                            sdd[[row, col]] = 2.0 * gamma_ytxu;
                            sdd[[row, d2_jump + col]] = -gamma_ytxu;
                            sdd[[d2_jump + row, col]] = -gamma_ytxu;
                            sdd[[d2_jump + row, d2_jump + col]] = -gamma_ytux;
                        }
                    }
                }
            }

            if irrep_x == irrep_t && irrep_y == irrep_u {
                for xt in 0..num_x {
                    for u in 0..num_u {
                        for y in 0..num_y {
                            let gamma_yu = g1[[d_y + y, d_u + u]];
                            let row = jump_row + xt + num_x * y;
                            let col = jump_col + xt + num_x * u;
                            sdd[[row, col]] += 2.0 * gamma_yu;
                            sdd[[row, d2_jump + col]] -= gamma_yu;
                            sdd[[d2_jump + row, col]] -= gamma_yu;
                            sdd[[d2_jump + row, d2_jump + col]] += 2.0 * gamma_yu;
                        }
                    }
                }
            }

            jump_row += num_x * num_y;
        }
        jump_col += num_t * num_u;
    }

    sdd
}

/// SEE and SGG for one active irrep. Both are plain active-space matrices:
///
/// ```text
/// SEE[u, t] = 2 delta_tu - G1_{ut}        SGG[u, t] = G1_{ut}
/// ```
fn build_see_sgg(space: &OrbitalSpace, dm: &DensityMatrices, h: Irrep) -> (Array2<f64>, Array2<f64>) {
    let size = space.n_act(h);
    let d_ut = space.act_offset(h);
    let mut see: Array2<f64> = Array2::zeros((size, size));
    let mut sgg: Array2<f64> = Array2::zeros((size, size));
    let g1 = &dm.one_rdm;

    for t in 0..size {
        for u in 0..size {
            let gamma_ut = g1[[d_ut + u, d_ut + t]];
            see[[u, t]] = -gamma_ut;
            sgg[[u, t]] = gamma_ut;
        }
        see[[t, t]] += 2.0;
    }

    (see, sgg)
}

/// SBB and SFF singlet blocks for one excitation irrep. The bare 2-RDM
/// combination `G2_{utyx} + G2_{utxy}` is shared between SBB and SFF; the
/// delta corrections belong to SBB only:
///
/// ```text
/// SBB+[xy, tu] = G2_{utyx} + G2_{utxy} + 2 delta_uy delta_tx + 2 delta_ux delta_ty
///              - delta_uy G1_{tx} - delta_tx G1_{uy} - delta_ux G1_{ty} - delta_ty G1_{ux}
/// SFF+[xy, tu] = G2_{utyx} + G2_{utxy}
/// ```
///
/// For the trivial excitation irrep both pair indices are triangularly
/// packed (`t <= u`, `x <= y`); otherwise the pairs span two irreps with
/// the `irrep_t < irrep_u` tie-break and the `delta_ux`/`delta_ty` terms
/// vanish by symmetry.
fn build_bb_ff_singlet(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    dm: &DensityMatrices,
    h: Irrep,
) -> (Array2<f64>, Array2<f64>) {
    let num_irreps = space.num_irreps();
    let size = layout.size_bf_singlet[h];
    let mut sbb: Array2<f64> = Array2::zeros((size, size));
    let mut sff: Array2<f64> = Array2::zeros((size, size));
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;

    if h == 0 {
        let mut jump_col = 0;
        for irrep_ut in 0..num_irreps {
            let d_ut = space.act_offset(irrep_ut);
            let num_ut = space.n_act(irrep_ut);
            let mut jump_row = 0;
            for irrep_xy in 0..num_irreps {
                let d_xy = space.act_offset(irrep_xy);
                let num_xy = space.n_act(irrep_xy);

                // G2_{utyx} + G2_{utxy}
                for t in 0..num_ut {
                    for u in t..num_ut {
                        for x in 0..num_xy {
                            for y in x..num_xy {
                                let value = g2[[d_xy + x, d_xy + y, d_ut + t, d_ut + u]]
                                    + g2[[d_xy + x, d_xy + y, d_ut + u, d_ut + t]];
                                let row = jump_row + tri(x, y);
                                let col = jump_col + tri(t, u);
                                sbb[[row, col]] = value;
                                sff[[row, col]] = value;
                            }
                        }
                    }
                }

                if irrep_ut == irrep_xy {
                    // + 2 ( delta_uy delta_tx + delta_ux delta_ty ); the
                    // second product only survives on the fully diagonal
                    // pair t = u = x = y
                    for t in 0..num_ut {
                        sbb[[jump_row + tri(t, t), jump_col + tri(t, t)]] += 4.0;
                        for u in (t + 1)..num_ut {
                            sbb[[jump_row + tri(t, u), jump_col + tri(t, u)]] += 2.0;
                        }
                    }

                    // - delta_uy G1_{tx}
                    for uy in 0..num_ut {
                        for t in 0..=uy {
                            for x in 0..=uy {
                                let gamma_tx = g1[[d_ut + t, d_xy + x]];
                                sbb[[jump_row + tri(x, uy), jump_col + tri(t, uy)]] -= gamma_tx;
                            }
                        }
                    }

                    // - delta_tx G1_{uy}
                    for tx in 0..num_ut {
                        for u in tx..num_ut {
                            for y in tx..num_ut {
                                let gamma_uy = g1[[d_ut + u, d_xy + y]];
                                sbb[[jump_row + tri(tx, y), jump_col + tri(tx, u)]] -= gamma_uy;
                            }
                        }
                    }

                    // - delta_ux G1_{ty}
                    for ux in 0..num_ut {
                        for t in 0..=ux {
                            for y in ux..num_ut {
                                let gamma_ty = g1[[d_ut + t, d_xy + y]];
                                sbb[[jump_row + tri(ux, y), jump_col + tri(t, ux)]] -= gamma_ty;
                            }
                        }
                    }

                    // - delta_ty G1_{ux}
                    for ty in 0..num_ut {
                        for u in ty..num_ut {
                            for x in 0..=ty {
                                let gamma_ux = g1[[d_ut + u, d_xy + x]];
                                sbb[[jump_row + tri(x, ty), jump_col + tri(ty, u)]] -= gamma_ux;
                            }
                        }
                    }
                }
                jump_row += (num_xy * (num_xy + 1)) / 2;
            }
            jump_col += (num_ut * (num_ut + 1)) / 2;
        }
    } else {
        let mut jump_col = 0;
        for irrep_t in 0..num_irreps {
            let irrep_u = PointGroup::direct_product(h, irrep_t);
            if irrep_t < irrep_u {
                let d_t = space.act_offset(irrep_t);
                let num_t = space.n_act(irrep_t);
                let d_u = space.act_offset(irrep_u);
                let num_u = space.n_act(irrep_u);
                let mut jump_row = 0;
                for irrep_x in 0..num_irreps {
                    let irrep_y = PointGroup::direct_product(h, irrep_x);
                    if irrep_x < irrep_y {
                        let d_x = space.act_offset(irrep_x);
                        let num_x = space.n_act(irrep_x);
                        let d_y = space.act_offset(irrep_y);
                        let num_y = space.n_act(irrep_y);

                        // irrep_x < irrep_y = irrep_t < irrep_u rules out
                        // irrep_x == irrep_u, so the delta_ux / delta_ty
                        // corrections drop out here

                        // G2_{utyx} + G2_{utxy}
                        for t in 0..num_t {
                            for u in 0..num_u {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        let value = g2[[d_x + x, d_y + y, d_t + t, d_u + u]]
                                            + g2[[d_x + x, d_y + y, d_u + u, d_t + t]];
                                        let row = jump_row + x + num_x * y;
                                        let col = jump_col + t + num_t * u;
                                        sbb[[row, col]] = value;
                                        sff[[row, col]] = value;
                                    }
                                }
                            }
                        }

                        if irrep_u == irrep_y && irrep_t == irrep_x {
                            // 2 delta_uy delta_tx
                            for xt in 0..num_x {
                                for yu in 0..num_y {
                                    sbb[[jump_row + xt + num_x * yu, jump_col + xt + num_x * yu]] +=
                                        2.0;
                                }
                            }

                            // - delta_tx G1_{uy}
                            for xt in 0..num_x {
                                for u in 0..num_y {
                                    for y in 0..num_y {
                                        let gamma_uy = g1[[d_u + u, d_y + y]];
                                        sbb[[jump_row + xt + num_x * y, jump_col + xt + num_x * u]] -=
                                            gamma_uy;
                                    }
                                }
                            }

                            // - delta_uy G1_{tx}
                            for yu in 0..num_y {
                                for t in 0..num_x {
                                    for x in 0..num_x {
                                        let gamma_tx = g1[[d_t + t, d_x + x]];
                                        sbb[[jump_row + x + num_x * yu, jump_col + t + num_t * yu]] -=
                                            gamma_tx;
                                    }
                                }
                            }
                        }
                        jump_row += num_x * num_y;
                    }
                }
                jump_col += num_t * num_u;
            }
        }
    }

    (sbb, sff)
}

/// SBB and SFF triplet blocks for one excitation irrep; antisymmetric
/// 2-RDM combination and strict pair packing:
///
/// ```text
/// SBB-[xy, tu] = G2_{utyx} - G2_{utxy} + 6 delta_uy delta_tx - 6 delta_ux delta_ty
///              - 3 delta_uy G1_{tx} - 3 delta_tx G1_{uy}
///              + 3 delta_ux G1_{ty} + 3 delta_ty G1_{ux}
/// SFF-[xy, tu] = G2_{utyx} - G2_{utxy}
/// ```
fn build_bb_ff_triplet(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    dm: &DensityMatrices,
    h: Irrep,
) -> (Array2<f64>, Array2<f64>) {
    let num_irreps = space.num_irreps();
    let size = layout.size_bf_triplet[h];
    let mut sbb: Array2<f64> = Array2::zeros((size, size));
    let mut sff: Array2<f64> = Array2::zeros((size, size));
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;

    if h == 0 {
        let mut jump_col = 0;
        for irrep_ut in 0..num_irreps {
            let d_ut = space.act_offset(irrep_ut);
            let num_ut = space.n_act(irrep_ut);
            let mut jump_row = 0;
            for irrep_xy in 0..num_irreps {
                let d_xy = space.act_offset(irrep_xy);
                let num_xy = space.n_act(irrep_xy);

                // G2_{utyx} - G2_{utxy}
                for t in 0..num_ut {
                    for u in (t + 1)..num_ut {
                        for x in 0..num_xy {
                            for y in (x + 1)..num_xy {
                                let value = g2[[d_xy + x, d_xy + y, d_ut + t, d_ut + u]]
                                    - g2[[d_xy + x, d_xy + y, d_ut + u, d_ut + t]];
                                let row = jump_row + tri_strict(x, y);
                                let col = jump_col + tri_strict(t, u);
                                sbb[[row, col]] = value;
                                sff[[row, col]] = value;
                            }
                        }
                    }
                }

                if irrep_ut == irrep_xy {
                    // + 6 delta_uy delta_tx; the delta_ux delta_ty product
                    // never survives the strict orderings
                    for tx in 0..num_ut {
                        for uy in (tx + 1)..num_ut {
                            sbb[[jump_row + tri_strict(tx, uy), jump_col + tri_strict(tx, uy)]] +=
                                6.0;
                        }
                    }

                    // - 3 delta_uy G1_{tx}
                    for uy in 0..num_ut {
                        for t in 0..uy {
                            for x in 0..uy {
                                let gamma_tx = g1[[d_ut + t, d_xy + x]];
                                sbb[[jump_row + tri_strict(x, uy), jump_col + tri_strict(t, uy)]] -=
                                    3.0 * gamma_tx;
                            }
                        }
                    }

                    // - 3 delta_tx G1_{uy}
                    for tx in 0..num_ut {
                        for u in (tx + 1)..num_ut {
                            for y in (tx + 1)..num_ut {
                                let gamma_uy = g1[[d_ut + u, d_xy + y]];
                                sbb[[jump_row + tri_strict(tx, y), jump_col + tri_strict(tx, u)]] -=
                                    3.0 * gamma_uy;
                            }
                        }
                    }

                    // + 3 delta_ux G1_{ty}
                    for ux in 0..num_ut {
                        for t in 0..ux {
                            for y in (ux + 1)..num_ut {
                                let gamma_ty = g1[[d_ut + t, d_xy + y]];
                                sbb[[jump_row + tri_strict(ux, y), jump_col + tri_strict(t, ux)]] +=
                                    3.0 * gamma_ty;
                            }
                        }
                    }

                    // + 3 delta_ty G1_{ux}
                    for ty in 0..num_ut {
                        for u in (ty + 1)..num_ut {
                            for x in 0..ty {
                                let gamma_ux = g1[[d_ut + u, d_xy + x]];
                                sbb[[jump_row + tri_strict(x, ty), jump_col + tri_strict(ty, u)]] +=
                                    3.0 * gamma_ux;
                            }
                        }
                    }
                }
                jump_row += (num_xy * num_xy.saturating_sub(1)) / 2;
            }
            jump_col += (num_ut * num_ut.saturating_sub(1)) / 2;
        }
    } else {
        let mut jump_col = 0;
        for irrep_t in 0..num_irreps {
            let irrep_u = PointGroup::direct_product(h, irrep_t);
            if irrep_t < irrep_u {
                let d_t = space.act_offset(irrep_t);
                let num_t = space.n_act(irrep_t);
                let d_u = space.act_offset(irrep_u);
                let num_u = space.n_act(irrep_u);
                let mut jump_row = 0;
                for irrep_x in 0..num_irreps {
                    let irrep_y = PointGroup::direct_product(h, irrep_x);
                    if irrep_x < irrep_y {
                        let d_x = space.act_offset(irrep_x);
                        let num_x = space.n_act(irrep_x);
                        let d_y = space.act_offset(irrep_y);
                        let num_y = space.n_act(irrep_y);

                        // as in the singlet case, irrep_x == irrep_u is
                        // impossible here and the delta_ux / delta_ty
                        // corrections vanish

                        // G2_{utyx} - G2_{utxy}
                        for t in 0..num_t {
                            for u in 0..num_u {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        let value = g2[[d_x + x, d_y + y, d_t + t, d_u + u]]
                                            - g2[[d_x + x, d_y + y, d_u + u, d_t + t]];
                                        let row = jump_row + x + num_x * y;
                                        let col = jump_col + t + num_t * u;
                                        sbb[[row, col]] = value;
                                        sff[[row, col]] = value;
                                    }
                                }
                            }
                        }

                        if irrep_u == irrep_y && irrep_t == irrep_x {
                            // 6 delta_uy delta_tx
                            for xt in 0..num_x {
                                for yu in 0..num_y {
                                    sbb[[jump_row + xt + num_x * yu, jump_col + xt + num_x * yu]] +=
                                        6.0;
                                }
                            }

                            // - 3 delta_tx G1_{uy}
                            for xt in 0..num_x {
                                for u in 0..num_y {
                                    for y in 0..num_y {
                                        let gamma_uy = g1[[d_u + u, d_y + y]];
                                        sbb[[jump_row + xt + num_x * y, jump_col + xt + num_x * u]] -=
                                            3.0 * gamma_uy;
                                    }
                                }
                            }

                            // - 3 delta_uy G1_{tx}
                            for yu in 0..num_y {
                                for t in 0..num_x {
                                    for x in 0..num_x {
                                        let gamma_tx = g1[[d_t + t, d_x + x]];
                                        sbb[[jump_row + x + num_x * yu, jump_col + t + num_x * yu]] -=
                                            3.0 * gamma_tx;
                                    }
                                }
                            }
                        }
                        jump_row += num_x * num_y;
                    }
                }
                jump_col += num_t * num_u;
            }
        }
    }

    (sbb, sff)
}
