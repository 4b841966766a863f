use log::info;
use ndarray::prelude::*;
use ndarray::Array4;
use rayon::prelude::*;

use crate::density::DensityMatrices;
use crate::matrix::BlockMatrix;
use crate::orbitals::OrbitalSpace;
use crate::perturber::layout::VectorLayout;
use crate::perturber::overlap::OverlapBlocks;
use crate::perturber::verify::debug_assert_symmetric;
use crate::symmetry::{Irrep, PointGroup};

/// Fock-contracted density tensors and the reference Fock expectation
/// value. Only the active-active Fock block enters the contractions: the
/// occupied-occupied and virtual-virtual blocks are diagonal at the
/// reference and their contributions reduce to scalar multiples of the
/// overlap blocks, applied at operator-apply time instead.
#[derive(Clone, Debug)]
pub struct FockContractions {
    /// `f_dot_2dm[[z, v]] = sum_{w w'} f_{w w'} G2_{z w, v w'}`
    pub f_dot_2dm: Array2<f64>,
    /// `f_dot_3dm[[z, u, y, v]] = sum_{w w'} f_{w w'} G3_{z u w, y v w'}`
    pub f_dot_3dm: Array4<f64>,
    /// `E_FOCK = 2 sum_i f_ii + sum_{t u} f_{t u} G1_{t u}`
    pub e_fock: f64,
}

impl FockContractions {
    pub fn build(space: &OrbitalSpace, fock: &BlockMatrix, dm: &DensityMatrices) -> Self {
        let num_irreps = space.num_irreps();
        let las = space.n_act_total();
        let g1 = &dm.one_rdm;
        let g2 = &dm.two_rdm;
        let g3 = &dm.three_rdm;

        // f_dot_2dm: nonzero only inside the diagonal irrep blocks
        let mut f_dot_2dm: Array2<f64> = Array2::zeros((las, las));
        for irrep1 in 0..num_irreps {
            let d_1 = space.act_offset(irrep1);
            let num_1 = space.n_act(irrep1);
            for row1 in 0..num_1 {
                for col1 in 0..num_1 {
                    let mut value = 0.0;
                    for irrep2 in 0..num_irreps {
                        let n_occ2 = space.n_occ(irrep2);
                        let d_2 = space.act_offset(irrep2);
                        let num_2 = space.n_act(irrep2);
                        for row2 in 0..num_2 {
                            for col2 in 0..num_2 {
                                value += fock.get(irrep2, n_occ2 + row2, n_occ2 + col2)
                                    * g2[[d_1 + row1, d_2 + row2, d_1 + col1, d_2 + col2]];
                            }
                        }
                    }
                    f_dot_2dm[[d_1 + row1, d_1 + col1]] = value;
                }
            }
        }

        // f_dot_3dm over all irrep quadruples of the remaining indices
        let mut f_dot_3dm: Array4<f64> = Array4::zeros((las, las, las, las));
        for irrep1 in 0..num_irreps {
            let d_1 = space.act_offset(irrep1);
            let num_1 = space.n_act(irrep1);
            for irrep2 in 0..num_irreps {
                let d_2 = space.act_offset(irrep2);
                let num_2 = space.n_act(irrep2);
                let irr_12 = PointGroup::direct_product(irrep1, irrep2);
                for irrep3 in 0..num_irreps {
                    let irrep4 = PointGroup::direct_product(irr_12, irrep3);
                    let d_3 = space.act_offset(irrep3);
                    let num_3 = space.n_act(irrep3);
                    let d_4 = space.act_offset(irrep4);
                    let num_4 = space.n_act(irrep4);

                    for i1 in 0..num_1 {
                        for i2 in 0..num_2 {
                            for i3 in 0..num_3 {
                                for i4 in 0..num_4 {
                                    let mut value = 0.0;
                                    for irrep_w in 0..num_irreps {
                                        let n_occ_w = space.n_occ(irrep_w);
                                        let d_w = space.act_offset(irrep_w);
                                        let num_w = space.n_act(irrep_w);
                                        for row_w in 0..num_w {
                                            for col_w in 0..num_w {
                                                value += fock.get(
                                                    irrep_w,
                                                    n_occ_w + row_w,
                                                    n_occ_w + col_w,
                                                ) * g3[[
                                                    d_1 + i1,
                                                    d_2 + i2,
                                                    d_w + row_w,
                                                    d_3 + i3,
                                                    d_4 + i4,
                                                    d_w + col_w,
                                                ]];
                                            }
                                        }
                                    }
                                    f_dot_3dm[[d_1 + i1, d_2 + i2, d_3 + i3, d_4 + i4]] = value;
                                }
                            }
                        }
                    }
                }
            }
        }

        // reference expectation value of the Fock operator
        let mut e_fock = 0.0;
        for h in 0..num_irreps {
            let n_occ = space.n_occ(h);
            let d_h = space.act_offset(h);
            for orb in 0..n_occ {
                e_fock += 2.0 * fock.get(h, orb, orb);
            }
            for row in 0..space.n_act(h) {
                for col in 0..space.n_act(h) {
                    e_fock += g1[[d_h + row, d_h + col]] * fock.get(h, n_occ + row, n_occ + col);
                }
            }
        }
        info!("Reference Fock expectation value < F > = {:.12}", e_fock);

        FockContractions {
            f_dot_2dm,
            f_dot_3dm,
            e_fock,
        }
    }
}

/// Fock-weighted analogues of the SAA/SCC overlap blocks.
///
/// FAA carries every contribution to
/// `< E_zy E_jx ( f_pq E_pq ) E_ti E_uv > / delta_ji` except the
/// `- f_ii SAA` part, and FCC everything in
/// `< E_zy E_xb ( f_pq E_pq ) E_at E_uv > / delta_ab` except `+ f_aa SCC`;
/// those diagonal corrections depend on the external orbital and are added
/// per column by the shifted-Fock apply.
#[derive(Clone, Debug)]
pub struct FockBlocks {
    pub faa: Vec<Array2<f64>>,
    pub fcc: Vec<Array2<f64>>,
}

impl FockBlocks {
    pub fn build(
        space: &OrbitalSpace,
        layout: &VectorLayout,
        fock: &BlockMatrix,
        dm: &DensityMatrices,
        contractions: &FockContractions,
        overlap: &OverlapBlocks,
    ) -> Self {
        // the occupied-occupied Fock block is diagonal at the reference,
        // so its closed part enters as a plain scalar
        let mut sum_f_kk = 0.0;
        for h in 0..space.num_irreps() {
            for orb in 0..space.n_occ(h) {
                sum_f_kk += 2.0 * fock.get(h, orb, orb);
            }
        }

        let blocks: Vec<(Array2<f64>, Array2<f64>)> = (0..space.num_irreps())
            .into_par_iter()
            .map(|h| build_faa_fcc(space, layout, fock, dm, contractions, overlap, sum_f_kk, h))
            .collect();
        let (faa, fcc): (Vec<_>, Vec<_>) = blocks.into_iter().unzip();

        for (name, family) in [("FAA", &faa), ("FCC", &fcc)].iter() {
            for block in family.iter() {
                debug_assert_symmetric(name, block);
            }
        }

        FockBlocks { faa, fcc }
    }
}

fn build_faa_fcc(
    space: &OrbitalSpace,
    layout: &VectorLayout,
    fock: &BlockMatrix,
    dm: &DensityMatrices,
    contractions: &FockContractions,
    overlap: &OverlapBlocks,
    sum_f_kk: f64,
    h: Irrep,
) -> (Array2<f64>, Array2<f64>) {
    let num_irreps = space.num_irreps();
    let size = layout.size_ac[h];
    let mut faa: Array2<f64> = Array2::zeros((size, size));
    let mut fcc: Array2<f64> = Array2::zeros((size, size));
    let saa = &overlap.saa[h];
    let scc = &overlap.scc[h];
    let g1 = &dm.one_rdm;
    let g2 = &dm.two_rdm;
    let f2 = &contractions.f_dot_2dm;
    let f3 = &contractions.f_dot_3dm;
    let f4 = &dm.f_dot_4dm;

    let mut jump_col = 0;
    for irrep_t in 0..num_irreps {
        let d_t = space.act_offset(irrep_t);
        let num_t = space.n_act(irrep_t);
        let nocc_t = space.n_occ(irrep_t);
        for irrep_u in 0..num_irreps {
            let d_u = space.act_offset(irrep_u);
            let num_u = space.n_act(irrep_u);
            let nocc_u = space.n_occ(irrep_u);
            let irrep_v = PointGroup::direct_product(PointGroup::direct_product(h, irrep_t), irrep_u);
            let d_v = space.act_offset(irrep_v);
            let num_v = space.n_act(irrep_v);
            let mut jump_row = 0;
            for irrep_x in 0..num_irreps {
                let d_x = space.act_offset(irrep_x);
                let num_x = space.n_act(irrep_x);
                let nocc_x = space.n_occ(irrep_x);
                for irrep_y in 0..num_irreps {
                    let d_y = space.act_offset(irrep_y);
                    let num_y = space.n_act(irrep_y);
                    let nocc_y = space.n_occ(irrep_y);
                    let irrep_z =
                        PointGroup::direct_product(PointGroup::direct_product(h, irrep_x), irrep_y);
                    let d_z = space.act_offset(irrep_z);
                    let num_z = space.n_act(irrep_z);

                    let row = |x: usize, y: usize, z: usize| jump_row + x + num_x * (y + num_y * z);
                    let col = |t: usize, u: usize, v: usize| jump_col + t + num_t * (u + num_u * v);

                    // FAA: - f_dot_4dm[ztuyxv] + ( sum_k f_kk ) SAA
                    //      + one-index Fock renormalizations of SAA
                    for t in 0..num_t {
                        for u in 0..num_u {
                            for v in 0..num_v {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            let mut val = -f4
                                                [[d_z + z, d_t + t, d_u + u, d_y + y, d_x + x, d_v + v]]
                                                + sum_f_kk * saa[[row(x, y, z), col(t, u, v)]];
                                            for r in 0..num_t {
                                                val += fock.get(irrep_t, nocc_t + r, nocc_t + t)
                                                    * saa[[row(x, y, z), col(r, u, v)]];
                                            }
                                            for r in 0..num_u {
                                                val += fock.get(irrep_u, nocc_u + r, nocc_u + u)
                                                    * saa[[row(x, y, z), col(t, r, v)]];
                                            }
                                            for s in 0..num_x {
                                                val += fock.get(irrep_x, nocc_x + x, nocc_x + s)
                                                    * saa[[row(s, y, z), col(t, u, v)]];
                                            }
                                            for s in 0..num_y {
                                                val += fock.get(irrep_y, nocc_y + y, nocc_y + s)
                                                    * saa[[row(x, s, z), col(t, u, v)]];
                                            }
                                            faa[[row(x, y, z), col(t, u, v)]] = val;
                                        }
                                    }
                                }
                            }
                        }
                    }

                    // FCC: + f_dot_4dm[zxuytv] + ( sum_k f_kk ) SCC
                    //      + one-index Fock renormalizations of SCC
                    for t in 0..num_t {
                        for u in 0..num_u {
                            for v in 0..num_v {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            let mut val = f4
                                                [[d_z + z, d_x + x, d_u + u, d_y + y, d_t + t, d_v + v]]
                                                + sum_f_kk * scc[[row(x, y, z), col(t, u, v)]];
                                            for s in 0..num_y {
                                                val += fock.get(irrep_y, nocc_y + y, nocc_y + s)
                                                    * scc[[row(x, s, z), col(t, u, v)]];
                                            }
                                            for r in 0..num_u {
                                                val += fock.get(irrep_u, nocc_u + r, nocc_u + u)
                                                    * scc[[row(x, y, z), col(t, r, v)]];
                                            }
                                            fcc[[row(x, y, z), col(t, u, v)]] = val;
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_x {
                        // FAA: + 2 delta_tx f_dot_3dm[zuyv]
                        for xt in 0..num_t {
                            for u in 0..num_u {
                                for v in 0..num_v {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            faa[[row(xt, y, z), col(xt, u, v)]] +=
                                                2.0 * f3[[d_z + z, d_u + u, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_y {
                        // FAA: - delta_uy f_dot_3dm[tzxv]
                        for uy in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            faa[[row(x, uy, z), col(t, uy, v)]] -=
                                                f3[[d_t + t, d_z + z, d_x + x, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_y {
                        // FAA: - delta_ty f_dot_3dm[zuxv]
                        for ty in 0..num_t {
                            for u in 0..num_u {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            faa[[row(x, ty, z), col(ty, u, v)]] -=
                                                f3[[d_z + z, d_u + u, d_x + x, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_x {
                        // FAA: - delta_ux f_dot_3dm[ztyv]
                        for ux in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            faa[[row(ux, y, z), col(t, ux, v)]] -=
                                                f3[[d_z + z, d_t + t, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_y {
                        // FCC: + delta_uy f_dot_3dm[xztv]
                        for uy in 0..num_u {
                            for t in 0..num_t {
                                for v in 0..num_v {
                                    for x in 0..num_x {
                                        for z in 0..num_z {
                                            fcc[[row(x, uy, z), col(t, uy, v)]] +=
                                                f3[[d_x + x, d_z + z, d_t + t, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_x == irrep_y {
                        // FCC: + delta_xy f_dot_3dm[zutv]
                        for xy in 0..num_x {
                            for t in 0..num_t {
                                for u in 0..num_u {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            fcc[[row(xy, xy, z), col(t, u, v)]] +=
                                                f3[[d_z + z, d_u + u, d_t + t, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_t {
                        // FCC: + delta_ut f_dot_3dm[zxyv]
                        for ut in 0..num_u {
                            for v in 0..num_v {
                                for x in 0..num_x {
                                    for y in 0..num_y {
                                        for z in 0..num_z {
                                            fcc[[row(x, y, z), col(ut, ut, v)]] +=
                                                f3[[d_z + z, d_x + x, d_y + y, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_x == irrep_t {
                        // FAA: - 2 f_xt G2_{zuyv}
                        for x in 0..num_x {
                            for t in 0..num_t {
                                let f_xt = fock.get(irrep_t, nocc_t + x, nocc_t + t);
                                for u in 0..num_u {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            for y in 0..num_y {
                                                faa[[row(x, y, z), col(t, u, v)]] -=
                                                    2.0 * f_xt
                                                        * g2[[d_z + z, d_u + u, d_y + y, d_v + v]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_y == irrep_u {
                        // FAA: + f_yu G2_{ztvx}
                        for y in 0..num_y {
                            for u in 0..num_u {
                                let f_yu = fock.get(irrep_u, nocc_u + y, nocc_u + u);
                                for t in 0..num_t {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            for x in 0..num_x {
                                                faa[[row(x, y, z), col(t, u, v)]] += f_yu
                                                    * g2[[d_z + z, d_t + t, d_v + v, d_x + x]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_y == irrep_t {
                        // FAA: + f_yt G2_{zuxv}
                        for y in 0..num_y {
                            for t in 0..num_t {
                                let f_yt = fock.get(irrep_t, nocc_t + y, nocc_t + t);
                                for u in 0..num_u {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            for x in 0..num_x {
                                                faa[[row(x, y, z), col(t, u, v)]] += f_yt
                                                    * g2[[d_z + z, d_u + u, d_x + x, d_v + v]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_x == irrep_u {
                        // FAA: + f_xu G2_{ztyv}
                        for x in 0..num_x {
                            for u in 0..num_u {
                                let f_xu = fock.get(irrep_u, nocc_u + x, nocc_u + u);
                                for t in 0..num_t {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            for y in 0..num_y {
                                                faa[[row(x, y, z), col(t, u, v)]] += f_xu
                                                    * g2[[d_z + z, d_t + t, d_y + y, d_v + v]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_x == irrep_y {
                        // FCC: - f_yx G2_{zutv}
                        for x in 0..num_x {
                            for y in 0..num_y {
                                let f_yx = fock.get(irrep_x, nocc_x + y, nocc_x + x);
                                for v in 0..num_v {
                                    for u in 0..num_u {
                                        for t in 0..num_t {
                                            for z in 0..num_z {
                                                fcc[[row(x, y, z), col(t, u, v)]] -= f_yx
                                                    * g2[[d_z + z, d_u + u, d_t + t, d_v + v]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_u {
                        // FCC: - f_tu G2_{zxyv}
                        for t in 0..num_t {
                            for u in 0..num_u {
                                let f_tu = fock.get(irrep_t, nocc_t + t, nocc_t + u);
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        for y in 0..num_y {
                                            for x in 0..num_x {
                                                fcc[[row(x, y, z), col(t, u, v)]] -= f_tu
                                                    * g2[[d_z + z, d_x + x, d_y + y, d_v + v]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_y == irrep_u {
                        // FCC: - f_yu G2_{zxvt}
                        for y in 0..num_y {
                            for u in 0..num_u {
                                let f_yu = fock.get(irrep_y, nocc_y + y, nocc_y + u);
                                for v in 0..num_v {
                                    for t in 0..num_t {
                                        for z in 0..num_z {
                                            for x in 0..num_x {
                                                fcc[[row(x, y, z), col(t, u, v)]] -= f_yu
                                                    * g2[[d_z + z, d_x + x, d_v + v, d_t + t]];
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_t == irrep_x && irrep_u == irrep_y && irrep_z == irrep_v {
                        // FAA: + 2 delta_tx delta_uy f_dot_2dm[zv]
                        for xt in 0..num_t {
                            for uy in 0..num_u {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        faa[[row(xt, uy, z), col(xt, uy, v)]] +=
                                            2.0 * f2[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }

                        // FAA: - 2 f_xt delta_yu G1_{zv}
                        for x in 0..num_x {
                            for t in 0..num_t {
                                let f_xt = fock.get(irrep_t, nocc_t + x, nocc_t + t);
                                for uy in 0..num_y {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            faa[[row(x, uy, z), col(t, uy, v)]] -=
                                                2.0 * f_xt * g1[[d_z + z, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }

                        // FAA: - 2 f_yu delta_xt G1_{zv}
                        for y in 0..num_y {
                            for u in 0..num_u {
                                let f_yu = fock.get(irrep_u, nocc_u + y, nocc_u + u);
                                for xt in 0..num_x {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            faa[[row(xt, y, z), col(xt, u, v)]] -=
                                                2.0 * f_yu * g1[[d_z + z, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_x && irrep_t == irrep_y && irrep_z == irrep_v {
                        // FAA: - delta_ux delta_ty f_dot_2dm[zv]
                        for ty in 0..num_t {
                            for ux in 0..num_u {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        faa[[row(ux, ty, z), col(ty, ux, v)]] -=
                                            f2[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }

                        // FAA: + f_xu delta_yt G1_{zv}
                        for x in 0..num_x {
                            for u in 0..num_u {
                                let f_xu = fock.get(irrep_u, nocc_u + x, nocc_u + u);
                                for yt in 0..num_y {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            faa[[row(x, yt, z), col(yt, u, v)]] +=
                                                f_xu * g1[[d_z + z, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }

                        // FAA: + f_yt delta_xu G1_{zv}
                        for y in 0..num_y {
                            for t in 0..num_t {
                                let f_yt = fock.get(irrep_t, nocc_t + y, nocc_t + t);
                                for xu in 0..num_x {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            faa[[row(xu, y, z), col(t, xu, v)]] +=
                                                f_yt * g1[[d_z + z, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if irrep_u == irrep_t && irrep_x == irrep_y && irrep_z == irrep_v {
                        // FCC: + delta_ut delta_xy f_dot_2dm[zv]
                        for xy in 0..num_x {
                            for tu in 0..num_t {
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        fcc[[row(xy, xy, z), col(tu, tu, v)]] +=
                                            f2[[d_z + z, d_v + v]];
                                    }
                                }
                            }
                        }

                        // FCC: - f_tu delta_yx G1_{zv}
                        for t in 0..num_t {
                            for u in 0..num_t {
                                let f_tu = fock.get(irrep_t, nocc_t + t, nocc_t + u);
                                for v in 0..num_v {
                                    for z in 0..num_z {
                                        for xy in 0..num_x {
                                            fcc[[row(xy, xy, z), col(t, u, v)]] -=
                                                f_tu * g1[[d_z + z, d_v + v]];
                                        }
                                    }
                                }
                            }
                        }

                        // FCC: - f_yx delta_ut G1_{zv}
                        for x in 0..num_x {
                            for y in 0..num_x {
                                let f_yx = fock.get(irrep_x, nocc_x + y, nocc_x + x);
                                for ut in 0..num_u {
                                    for v in 0..num_v {
                                        for z in 0..num_z {
                                            fcc[[row(x, y, z), col(ut, ut, v)]] -=
                                                f_yx * g1[[d_z + z, d_v + v]];
                                        }
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

    (faa, fcc)
}
