use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gas::{Gas, Init};

use super::{grid::Grid, ugks, velocity::VelocityGrid};

/// Run setup: resolution, phase-space bounds, gas constants and stepping.
/// Trailing axes beyond `dim` must stay at a single cell / velocity node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dim: usize,
    pub n: [usize; 3],
    pub nv: [usize; 3],
    pub xmin: [f64; 3],
    pub xmax: [f64; 3],
    pub vmin: [f64; 3],
    pub vmax: [f64; 3],
    pub r: f64,
    pub k: f64,
    pub pr: f64,
    pub mu_ref: f64,
    pub omega: f64,
    /// Fixed ceiling on the time step.
    pub maxdt: f64,
    pub tend: f64,
    pub dtdump: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("spatial dimension must be 1, 2 or 3, got {0}")]
    Dimension(usize),
    #[error("axis {axis}: cell and velocity node counts must be nonzero")]
    ZeroExtent { axis: usize },
    #[error("axis {axis} is inactive and must keep a single cell and velocity node")]
    InactiveAxis { axis: usize },
    #[error("axis {axis}: velocity node count {nv} must be 4k+1 with at least 5 nodes")]
    NodeCount { axis: usize, nv: usize },
    #[error("axis {axis}: velocity bounds must satisfy vmax > vmin")]
    VelocityBounds { axis: usize },
    #[error("axis {axis}: spatial bounds must satisfy xmax > xmin")]
    SpatialBounds { axis: usize },
    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.dim) {
            return Err(ConfigError::Dimension(self.dim));
        }
        for axis in 0..3 {
            if self.n[axis] == 0 || self.nv[axis] == 0 {
                return Err(ConfigError::ZeroExtent { axis });
            }
        }
        for axis in self.dim..3 {
            if self.n[axis] != 1 || self.nv[axis] != 1 {
                return Err(ConfigError::InactiveAxis { axis });
            }
        }
        for axis in 0..self.dim {
            let nv = self.nv[axis];
            if nv < 5 || nv % 4 != 1 {
                return Err(ConfigError::NodeCount { axis, nv });
            }
            if self.vmax[axis] <= self.vmin[axis] {
                return Err(ConfigError::VelocityBounds { axis });
            }
            if self.xmax[axis] <= self.xmin[axis] {
                return Err(ConfigError::SpatialBounds { axis });
            }
        }
        if self.maxdt <= 0.0 {
            return Err(ConfigError::NonPositive("maxdt"));
        }
        if self.dtdump <= 0.0 {
            return Err(ConfigError::NonPositive("dtdump"));
        }
        if self.tend <= 0.0 {
            return Err(ConfigError::NonPositive("tend"));
        }
        Ok(())
    }
}

/// Owns the phase-space state and every per-step scratch buffer.
///
/// Distributions are flat with `idx = s + Ns*v` (cells fastest); the
/// per-face buffers append a face axis (`idx*D + face`) and the cross-slope
/// buffer a second one (`(idx*D + dim)*D + dim2`). Buffers are allocated
/// once here and overwritten in place every step.
pub struct Context<'a> {
    pub grid: Grid,
    pub vel: VelocityGrid,
    pub gas: Gas<'a>,
    pub maxdt: f64,
    pub g: Vec<f64>,
    pub b: Vec<f64>,
    pub rho: Vec<f64>,
    pub rhov: Vec<f64>,
    pub rhoe: Vec<f64>,
    pub(crate) gbarp: Vec<f64>,
    pub(crate) bbarp: Vec<f64>,
    pub(crate) gsigma: Vec<f64>,
    pub(crate) bsigma: Vec<f64>,
    pub(crate) gsigma2: Vec<f64>,
    pub(crate) bsigma2: Vec<f64>,
    pub(crate) gbarpbound: Vec<f64>,
    pub(crate) bbarpbound: Vec<f64>,
    pub(crate) gbar: Vec<f64>,
    pub(crate) bbar: Vec<f64>,
    pub(crate) rhoh: Vec<f64>,
    pub(crate) rhovh: Vec<f64>,
    pub(crate) rhoeh: Vec<f64>,
    pub(crate) fg: Vec<f64>,
    pub(crate) fb: Vec<f64>,
}

impl<'a> Context<'a> {
    pub fn new(config: &Config, gas: Gas<'a>) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::uniform(config.dim, config.n, config.xmin, config.xmax);
        let vel = VelocityGrid::newton_cotes(config.nv, config.vmin, config.vmax);
        let ns = grid.n_cells();
        let nv = vel.n_nodes();
        let d = config.dim;
        Ok(Context {
            grid,
            vel,
            gas,
            maxdt: config.maxdt,
            g: vec![0.0; ns * nv],
            b: vec![0.0; ns * nv],
            rho: vec![0.0; ns],
            rhov: vec![0.0; ns * d],
            rhoe: vec![0.0; ns],
            gbarp: vec![0.0; ns * nv],
            bbarp: vec![0.0; ns * nv],
            gsigma: vec![0.0; ns * nv * d],
            bsigma: vec![0.0; ns * nv * d],
            gsigma2: vec![0.0; ns * nv * d * d],
            bsigma2: vec![0.0; ns * nv * d * d],
            gbarpbound: vec![0.0; ns * nv * d],
            bbarpbound: vec![0.0; ns * nv * d],
            gbar: vec![0.0; ns * nv * d],
            bbar: vec![0.0; ns * nv * d],
            rhoh: vec![0.0; ns * d],
            rhovh: vec![0.0; ns * d * d],
            rhoeh: vec![0.0; ns * d],
            fg: vec![0.0; ns * nv],
            fb: vec![0.0; ns * nv],
        })
    }

    /// Set `g = g_eq`, `b = b_eq` and the conservative state from a
    /// prescribed per-cell `(rho, u, T)`.
    pub fn initialize(&mut self, init: Init) {
        let ns = self.grid.n_cells();
        let nv = self.vel.n_nodes();
        let d = self.grid.dim;
        let cv = self.gas.cv();
        for s in 0..ns {
            let (rho0, u0, t0) = init(s, self.grid.cells[s].x);
            self.rho[s] = rho0;
            let mut u2 = 0.0;
            for dim in 0..d {
                self.rhov[s * d + dim] = rho0 * u0[dim];
                u2 += u0[dim] * u0[dim];
            }
            self.rhoe[s] = rho0 * (cv * t0 + u2 / 2.0);
            for v in 0..nv {
                let xi = self.vel.xi[v];
                let xi2 = xi[0] * xi[0] + xi[1] * xi[1] + xi[2] * xi[2];
                let mut c2 = 0.0;
                for dim in 0..d {
                    let c = xi[dim] - u0[dim];
                    c2 += c * c;
                }
                let g_eq = (self.gas.geq)(c2, rho0, t0);
                self.g[s + ns * v] = g_eq;
                self.b[s + ns * v] = self.gas.beq(g_eq, xi2, t0, d);
            }
        }
    }

    /// Advance the state by one step of size `dt`, in place.
    pub fn evolve(&mut self, dt: f64) {
        ugks::evolve(self, dt);
    }

    /// Primitive `(rho, u, T)` of cell `s` from the conservative state.
    pub fn primitive(&self, s: usize) -> (f64, [f64; 3], f64) {
        let d = self.grid.dim;
        let rho = self.rho[s];
        let mut u = [0.0; 3];
        let mut u2 = 0.0;
        for dim in 0..d {
            u[dim] = self.rhov[s * d + dim] / rho;
            u2 += u[dim] * u[dim];
        }
        let t = (self.gas.temperature)(self.rhoe[s] / rho, u2.sqrt());
        (rho, u, t)
    }

    /// Mass in the whole (periodic) domain, `sum_s rho V`.
    pub fn total_mass(&self) -> f64 {
        self.rho
            .iter()
            .zip(&self.grid.cells)
            .map(|(r, c)| r * c.volume())
            .sum()
    }
}
