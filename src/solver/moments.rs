use rayon::prelude::*;

use super::{grid::Grid, velocity::VelocityGrid};

/// Conservative moments of the cell-centered distributions:
/// `rho = sum_v w g`, `rhov_d = sum_v w xi_d g`, `rhoE = sum_v w b`.
pub fn conserved(
    grid: &Grid,
    vel: &VelocityGrid,
    g: &[f64],
    b: &[f64],
    rho: &mut [f64],
    rhov: &mut [f64],
    rhoe: &mut [f64],
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    let nv = vel.n_nodes();
    debug_assert_eq!(g.len(), ns * nv);
    rho.par_iter_mut()
        .zip(rhov.par_chunks_mut(d))
        .zip(rhoe.par_iter_mut())
        .enumerate()
        .for_each(|(s, ((r, rv), re))| {
            *r = 0.0;
            rv.fill(0.0);
            *re = 0.0;
            for v in 0..nv {
                let w = vel.w[v];
                let xi = vel.xi[v];
                let gv = g[s + ns * v];
                *r += w * gv;
                for dim in 0..d {
                    rv[dim] += w * xi[dim] * gv;
                }
                *re += w * b[s + ns * v];
            }
        });
}

/// Moments of the half-step interface distributions, one set per upper
/// face of each cell. `rhovh` is component-major: `rhovh[(s*D + dim)*D +
/// face]` holds momentum component `dim` on the face normal to `face`.
pub fn face_moments(
    grid: &Grid,
    vel: &VelocityGrid,
    gbar: &[f64],
    bbar: &[f64],
    rhoh: &mut [f64],
    rhovh: &mut [f64],
    rhoeh: &mut [f64],
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    let nv = vel.n_nodes();
    debug_assert_eq!(gbar.len(), ns * nv * d);
    rhoh.par_chunks_mut(d)
        .zip(rhovh.par_chunks_mut(d * d))
        .zip(rhoeh.par_chunks_mut(d))
        .enumerate()
        .for_each(|(s, ((rh, rvh), reh))| {
            rh.fill(0.0);
            rvh.fill(0.0);
            reh.fill(0.0);
            for v in 0..nv {
                let w = vel.w[v];
                let xi = vel.xi[v];
                let base = (s + ns * v) * d;
                for face in 0..d {
                    let gv = gbar[base + face];
                    rh[face] += w * gv;
                    for dim in 0..d {
                        rvh[dim * d + face] += w * xi[dim] * gv;
                    }
                    reh[face] += w * bbar[base + face];
                }
            }
        });
}
