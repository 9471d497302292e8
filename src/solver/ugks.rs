//! The unified gas kinetic step: half-step BGK relaxation at cell centers,
//! limited reconstruction to the upper faces, half-step transport, interface
//! moments and collision, flux assembly, then the trapezoidal cell update.
//!
//! Every stage writes a buffer distinct from the ones it reads, except the
//! interface collision which rescales each entry from its own prior value
//! and the per-face moments. Stages parallelize over velocity nodes; the
//! cell update aggregates its velocity sums before touching the
//! conservative state.

use rayon::prelude::*;

use crate::gas::Gas;

use super::{context::Context, grid::Grid, moments, utils::vanleer, velocity::VelocityGrid};

/// Bulk state of one cell or face: velocity, temperature, relaxation time.
struct Bulk {
    u: [f64; 3],
    t: f64,
    tau: f64,
}

fn bulk(gas: &Gas, d: usize, rho: f64, rhov: &[f64], rhoe: f64) -> Bulk {
    let mut u = [0.0; 3];
    let mut u2 = 0.0;
    for dim in 0..d {
        u[dim] = rhov[dim] / rho;
        u2 += u[dim] * u[dim];
    }
    let t = (gas.temperature)(rhoe / rho, u2.sqrt());
    Bulk {
        u,
        t,
        tau: gas.tau(rho, t),
    }
}

fn cell_states(gas: &Gas, d: usize, rho: &[f64], rhov: &[f64], rhoe: &[f64]) -> Vec<Bulk> {
    (0..rho.len())
        .map(|s| bulk(gas, d, rho[s], &rhov[s * d..(s + 1) * d], rhoe[s]))
        .collect()
}

fn peculiar2(xi: [f64; 3], u: [f64; 3], d: usize) -> f64 {
    let mut c2 = 0.0;
    for dim in 0..d {
        let c = xi[dim] - u[dim];
        c2 += c * c;
    }
    c2
}

pub fn evolve(ctx: &mut Context, dt: f64) {
    let Context {
        grid,
        vel,
        gas,
        g,
        b,
        rho,
        rhov,
        rhoe,
        gbarp,
        bbarp,
        gsigma,
        bsigma,
        gsigma2,
        bsigma2,
        gbarpbound,
        bbarpbound,
        gbar,
        bbar,
        rhoh,
        rhovh,
        rhoeh,
        fg,
        fb,
        ..
    } = ctx;

    relax_half_step(grid, vel, gas, g, b, rho, rhov, rhoe, gbarp, bbarp, dt);
    reconstruct(
        grid, vel, gbarp, bbarp, gsigma, bsigma, gsigma2, bsigma2, gbarpbound, bbarpbound,
    );
    advect_to_faces(
        grid, vel, gbarpbound, bbarpbound, gsigma2, bsigma2, gbar, bbar, dt,
    );
    moments::face_moments(grid, vel, gbar, bbar, rhoh, rhovh, rhoeh);
    face_collision(grid, vel, gas, rhoh, rhovh, rhoeh, gbar, bbar, dt);
    assemble_fluxes(grid, vel, gbar, bbar, fg, fb);
    update_cells(grid, vel, gas, fg, fb, g, b, rho, rhov, rhoe, dt);
}

/// Time-centered pre-advection distributions at cell centers:
/// `gbarp = (2 tau - dt/2)/(2 tau) g + dt/(4 tau) g_eq`, same for `b`.
pub fn relax_half_step(
    grid: &Grid,
    vel: &VelocityGrid,
    gas: &Gas,
    g: &[f64],
    b: &[f64],
    rho: &[f64],
    rhov: &[f64],
    rhoe: &[f64],
    gbarp: &mut [f64],
    bbarp: &mut [f64],
    dt: f64,
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    let states = cell_states(gas, d, rho, rhov, rhoe);
    gbarp
        .par_chunks_mut(ns)
        .zip(bbarp.par_chunks_mut(ns))
        .enumerate()
        .for_each(|(v, (gp, bp))| {
            let xi = vel.xi[v];
            let xi2 = xi[0] * xi[0] + xi[1] * xi[1] + xi[2] * xi[2];
            for s in 0..ns {
                let st = &states[s];
                let g_eq = (gas.geq)(peculiar2(xi, st.u, d), rho[s], st.t);
                let b_eq = gas.beq(g_eq, xi2, st.t, d);
                let tau = st.tau;
                let decay = (2.0 * tau - dt / 2.0) / (2.0 * tau);
                let gain = dt / (4.0 * tau);
                let idx = s + ns * v;
                gp[s] = decay * g[idx] + gain * g_eq;
                bp[s] = decay * b[idx] + gain * b_eq;
            }
        });
}

/// Two-level limited reconstruction: cell slopes along every axis, the
/// slope of that slope at each upper face, and the extrapolated face value.
pub fn reconstruct(
    grid: &Grid,
    vel: &VelocityGrid,
    gbarp: &[f64],
    bbarp: &[f64],
    gsigma: &mut [f64],
    bsigma: &mut [f64],
    gsigma2: &mut [f64],
    bsigma2: &mut [f64],
    gbarpbound: &mut [f64],
    bbarpbound: &mut [f64],
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    gsigma
        .par_chunks_mut(ns * d)
        .zip(bsigma.par_chunks_mut(ns * d))
        .zip(gbarpbound.par_chunks_mut(ns * d))
        .zip(bbarpbound.par_chunks_mut(ns * d))
        .enumerate()
        .for_each(|(v, (((gs, bs), gbound), bbound))| {
            for s in 0..ns {
                let c = &grid.cells[s];
                for dim in 0..d {
                    let sl = grid.neighbor(s, dim, -1);
                    let sr = grid.neighbor(s, dim, 1);
                    let (xl, xc, xr) = (grid.cells[sl].x[dim], c.x[dim], grid.cells[sr].x[dim]);
                    let sg = vanleer(
                        gbarp[sl + ns * v],
                        gbarp[s + ns * v],
                        gbarp[sr + ns * v],
                        xl,
                        xc,
                        xr,
                    );
                    let sb = vanleer(
                        bbarp[sl + ns * v],
                        bbarp[s + ns * v],
                        bbarp[sr + ns * v],
                        xl,
                        xc,
                        xr,
                    );
                    gs[s * d + dim] = sg;
                    bs[s * d + dim] = sb;
                    gbound[s * d + dim] = gbarp[s + ns * v] + c.dx[dim] / 2.0 * sg;
                    bbound[s * d + dim] = bbarp[s + ns * v] + c.dx[dim] / 2.0 * sb;
                }
            }
        });
    // cross level: slope along dim carried to the upper face normal to dim2
    let gsigma = &*gsigma;
    let bsigma = &*bsigma;
    gsigma2
        .par_chunks_mut(ns * d * d)
        .zip(bsigma2.par_chunks_mut(ns * d * d))
        .enumerate()
        .for_each(|(v, (gs2, bs2))| {
            let off = ns * d * v;
            for s in 0..ns {
                let c = &grid.cells[s];
                for dim in 0..d {
                    for dim2 in 0..d {
                        let sl = grid.neighbor(s, dim2, -1);
                        let sr = grid.neighbor(s, dim2, 1);
                        let (xl, xc, xr) =
                            (grid.cells[sl].x[dim2], c.x[dim2], grid.cells[sr].x[dim2]);
                        let sg = vanleer(
                            gsigma[off + sl * d + dim],
                            gsigma[off + s * d + dim],
                            gsigma[off + sr * d + dim],
                            xl,
                            xc,
                            xr,
                        );
                        let sb = vanleer(
                            bsigma[off + sl * d + dim],
                            bsigma[off + s * d + dim],
                            bsigma[off + sr * d + dim],
                            xl,
                            xc,
                            xr,
                        );
                        gs2[(s * d + dim) * d + dim2] =
                            gsigma[off + s * d + dim] + c.dx[dim2] / 2.0 * sg;
                        bs2[(s * d + dim) * d + dim2] =
                            bsigma[off + s * d + dim] + c.dx[dim2] / 2.0 * sb;
                    }
                }
            }
        });
}

/// Carry the extrapolated face values half a step forward, advected with
/// every velocity component against the cross slopes at that face.
pub fn advect_to_faces(
    grid: &Grid,
    vel: &VelocityGrid,
    gbarpbound: &[f64],
    bbarpbound: &[f64],
    gsigma2: &[f64],
    bsigma2: &[f64],
    gbar: &mut [f64],
    bbar: &mut [f64],
    dt: f64,
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    gbar.par_chunks_mut(ns * d)
        .zip(bbar.par_chunks_mut(ns * d))
        .enumerate()
        .for_each(|(v, (gb, bb))| {
            let xi = vel.xi[v];
            let o1 = ns * d * v;
            let o2 = ns * d * d * v;
            for s in 0..ns {
                for face in 0..d {
                    let mut adv_g = 0.0;
                    let mut adv_b = 0.0;
                    for dim in 0..d {
                        adv_g += xi[dim] * gsigma2[o2 + (s * d + dim) * d + face];
                        adv_b += xi[dim] * bsigma2[o2 + (s * d + dim) * d + face];
                    }
                    gb[s * d + face] = gbarpbound[o1 + s * d + face] - dt / 2.0 * adv_g;
                    bb[s * d + face] = bbarpbound[o1 + s * d + face] - dt / 2.0 * adv_b;
                }
            }
        });
}

/// Trapezoidal BGK projection at each upper face, in place: every entry is
/// rescaled from its own prior value and the face moments taken beforehand.
pub fn face_collision(
    grid: &Grid,
    vel: &VelocityGrid,
    gas: &Gas,
    rhoh: &[f64],
    rhovh: &[f64],
    rhoeh: &[f64],
    gbar: &mut [f64],
    bbar: &mut [f64],
    dt: f64,
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    let states: Vec<Bulk> = (0..ns * d)
        .map(|sf| {
            let (s, face) = (sf / d, sf % d);
            let r = rhoh[s * d + face];
            let mut u = [0.0; 3];
            let mut u2 = 0.0;
            for dim in 0..d {
                u[dim] = rhovh[(s * d + dim) * d + face] / r;
                u2 += u[dim] * u[dim];
            }
            let t = (gas.temperature)(rhoeh[s * d + face] / r, u2.sqrt());
            Bulk {
                u,
                t,
                tau: gas.tau(r, t),
            }
        })
        .collect();
    gbar.par_chunks_mut(ns * d)
        .zip(bbar.par_chunks_mut(ns * d))
        .enumerate()
        .for_each(|(v, (gb, bb))| {
            let xi = vel.xi[v];
            let xi2 = xi[0] * xi[0] + xi[1] * xi[1] + xi[2] * xi[2];
            for s in 0..ns {
                for face in 0..d {
                    let st = &states[s * d + face];
                    let g_eq = (gas.geq)(peculiar2(xi, st.u, d), rhoh[s * d + face], st.t);
                    let b_eq = gas.beq(g_eq, xi2, st.t, d);
                    let tau = st.tau;
                    let keep = 2.0 * tau / (2.0 * tau + dt / 2.0);
                    let gain = dt / (4.0 * tau + dt);
                    let i = s * d + face;
                    gb[i] = keep * gb[i] + gain * g_eq;
                    bb[i] = keep * bb[i] + gain * b_eq;
                }
            }
        });
}

/// Net microscopic flux through the lower faces of each cell:
/// `F = sum_dim xi_dim A_dim (phi_face(s) - phi_face(s - e_dim))`.
pub fn assemble_fluxes(
    grid: &Grid,
    vel: &VelocityGrid,
    gbar: &[f64],
    bbar: &[f64],
    fg: &mut [f64],
    fb: &mut [f64],
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    fg.par_chunks_mut(ns)
        .zip(fb.par_chunks_mut(ns))
        .enumerate()
        .for_each(|(v, (fgs, fbs))| {
            let xi = vel.xi[v];
            let base = ns * d * v;
            for s in 0..ns {
                let cell = &grid.cells[s];
                let mut sg = 0.0;
                let mut sb = 0.0;
                for dim in 0..d {
                    let sl = grid.neighbor(s, dim, -1);
                    let a = xi[dim] * cell.area(dim);
                    sg += a * (gbar[base + s * d + dim] - gbar[base + sl * d + dim]);
                    sb += a * (bbar[base + s * d + dim] - bbar[base + sl * d + dim]);
                }
                fgs[s] = sg;
                fbs[s] = sb;
            }
        });
}

/// Conservative update followed by the trapezoidal distribution update
/// mixing old and new equilibria. The velocity sums are aggregated per cell
/// before the conservative state changes, so the new equilibrium always
/// sees the fully updated moments.
pub fn update_cells(
    grid: &Grid,
    vel: &VelocityGrid,
    gas: &Gas,
    fg: &[f64],
    fb: &[f64],
    g: &mut [f64],
    b: &mut [f64],
    rho: &mut [f64],
    rhov: &mut [f64],
    rhoe: &mut [f64],
    dt: f64,
) {
    let ns = grid.n_cells();
    let d = grid.dim;
    let nv = vel.n_nodes();
    let old = cell_states(gas, d, rho, rhov, rhoe);
    let rho_old = rho.to_vec();
    rho.par_iter_mut()
        .zip(rhov.par_chunks_mut(d))
        .zip(rhoe.par_iter_mut())
        .enumerate()
        .for_each(|(s, ((r, rv), re))| {
            let vol = grid.cells[s].volume();
            let mut sg = 0.0;
            let mut sgx = [0.0; 3];
            let mut sb = 0.0;
            for v in 0..nv {
                let w = vel.w[v];
                let xi = vel.xi[v];
                let fgv = fg[s + ns * v];
                sg += w * fgv;
                for dim in 0..d {
                    sgx[dim] += w * xi[dim] * fgv;
                }
                sb += w * fb[s + ns * v];
            }
            *r -= dt / vol * sg;
            for dim in 0..d {
                rv[dim] -= dt / vol * sgx[dim];
            }
            *re -= dt / vol * sb;
        });
    let new = cell_states(gas, d, rho, rhov, rhoe);
    let rho = &*rho;
    g.par_chunks_mut(ns)
        .zip(b.par_chunks_mut(ns))
        .enumerate()
        .for_each(|(v, (gv, bv))| {
            let xi = vel.xi[v];
            let xi2 = xi[0] * xi[0] + xi[1] * xi[1] + xi[2] * xi[2];
            for s in 0..ns {
                let vol = grid.cells[s].volume();
                let (so, sn) = (&old[s], &new[s]);
                let (tau_go, tau_g) = (so.tau, sn.tau);
                let (tau_bo, tau_b) = (tau_go / gas.pr, tau_g / gas.pr);
                let g_eqo = (gas.geq)(peculiar2(xi, so.u, d), rho_old[s], so.t);
                let b_eqo = gas.beq(g_eqo, xi2, so.t, d);
                let g_eq = (gas.geq)(peculiar2(xi, sn.u, d), rho[s], sn.t);
                let b_eq = gas.beq(g_eq, xi2, sn.t, d);
                let idx = s + ns * v;
                let dfg = dt / vol * fg[idx];
                let dfb = dt / vol * fb[idx];
                gv[s] = (gv[s] + dt / 2.0 * (g_eq / tau_g + (g_eqo - gv[s]) / tau_go - dfg))
                    / (1.0 + dt / (2.0 * tau_g));
                bv[s] = (bv[s] + dt / 2.0 * (b_eq / tau_b + (b_eqo - bv[s]) / tau_bo - dfb))
                    / (1.0 + dt / (2.0 * tau_b));
            }
        });
}
