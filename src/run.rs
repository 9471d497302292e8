use std::fs;

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::{
    gas::{init_sod, init_uniform, IdealGas},
    solver::{Config, ConfigError, Context},
};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Serialize)]
struct Status {
    time: f64,
    steps: usize,
}

/// Next step size: the fixed ceiling, shortened to land exactly on the next
/// dump time and the final time.
pub fn timestep(maxdt: f64, tend: f64, t: f64, next_dump: f64) -> f64 {
    maxdt.min(next_dump - t).min(tend - t)
}

/// Dump the conservative and primitive fields of every cell as a text
/// table under `results/<name>/<t>/`.
pub fn save(ctx: &Context, name: &str, t: f64, steps: usize) -> Result<(), RunError> {
    let dir = format!("results/{}/{:e}", name, t);
    fs::create_dir_all(&dir)?;
    let d = ctx.grid.dim;
    let mut res = format!("# t {:e}\n# x y z rho rhovx rhovy rhovz rhoE u T\n", t);
    for s in 0..ctx.grid.n_cells() {
        let c = &ctx.grid.cells[s];
        let (rho, u, temp) = ctx.primitive(s);
        let speed = u.iter().map(|x| x * x).sum::<f64>().sqrt();
        let mut rv = [0.0; 3];
        for dim in 0..d {
            rv[dim] = ctx.rhov[s * d + dim];
        }
        res += &format!(
            "{} {} {} {} {} {} {} {} {} {}\n",
            c.x[0], c.x[1], c.x[2], rho, rv[0], rv[1], rv[2], ctx.rhoe[s], speed, temp
        );
    }
    fs::write(format!("{}/data.txt", dir), res)?;
    let status = serde_yaml::to_string(&Status { time: t, steps })?;
    fs::write(format!("{}/info.txt", dir), status)?;
    Ok(())
}

/// Advance an initialized context to `config.tend`, dumping every
/// `config.dtdump` of simulated time. Returns the final time and the
/// number of steps taken.
pub fn run(ctx: &mut Context, config: &Config, name: &str) -> Result<(f64, usize), RunError> {
    fs::create_dir_all(format!("results/{}", name))?;
    fs::write(
        format!("results/{}/config.yaml", name),
        serde_yaml::to_string(config)?,
    )?;
    let mut t = 0.0;
    let mut steps = 0;
    let mut next_dump = config.dtdump.min(config.tend);
    save(ctx, name, t, steps)?;
    while t < config.tend {
        let dt = timestep(ctx.maxdt, config.tend, t, next_dump);
        ctx.evolve(dt);
        t += dt;
        steps += 1;
        debug!("step {steps}: t = {t:.6e}, dt = {dt:.3e}");
        if t >= next_dump - 1e-12 {
            info!("t = {t:.6e} after {steps} steps, dumping");
            save(ctx, name, t, steps)?;
            next_dump = (next_dump + config.dtdump).min(config.tend);
        }
    }
    Ok((t, steps))
}

fn base_config(n: usize, nv: usize, tend: f64, dtdump: f64) -> Config {
    Config {
        dim: 1,
        n: [n, 1, 1],
        nv: [nv, 1, 1],
        xmin: [0.0; 3],
        xmax: [1.0, 0.0, 0.0],
        vmin: [-10.0, 0.0, 0.0],
        vmax: [10.0, 0.0, 0.0],
        r: 0.5,
        k: 2.0,
        pr: 1.0,
        mu_ref: 1e-5,
        omega: 1.0,
        maxdt: 1.0 / 2048.0,
        tend,
        dtdump,
    }
}

/// Sod-like shock tube: left (1, 0, 1), right (0.125, 0, 0.8).
pub fn sod(n: usize, nv: usize, tend: f64, dtdump: f64) -> Result<(f64, usize), RunError> {
    let config = base_config(n, nv, tend, dtdump);
    let ig = IdealGas::new(
        config.r,
        config.k,
        config.pr,
        config.mu_ref,
        config.omega,
        config.dim,
    );
    let mut ctx = Context::new(&config, ig.gas())?;
    let init = init_sod((config.xmin[0] + config.xmax[0]) / 2.0);
    ctx.initialize(&*init);
    run(&mut ctx, &config, "sod")
}

/// Spatially uniform resting equilibrium; stays put, useful as a sanity run.
pub fn uniform(n: usize, nv: usize, tend: f64, dtdump: f64) -> Result<(f64, usize), RunError> {
    let config = base_config(n, nv, tend, dtdump);
    let ig = IdealGas::new(
        config.r,
        config.k,
        config.pr,
        config.mu_ref,
        config.omega,
        config.dim,
    );
    let mut ctx = Context::new(&config, ig.gas())?;
    let init = init_uniform(1.0, [0.0; 3], 1.0);
    ctx.initialize(&*init);
    run(&mut ctx, &config, "uniform")
}
