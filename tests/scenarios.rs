use ugks::gas::{init_sod, init_uniform, IdealGas};
use ugks::solver::{Config, Context};

const DT: f64 = 1.0 / 2048.0;

fn config_1d(n: usize, nv: usize, vmax: f64, mu_ref: f64) -> Config {
    Config {
        dim: 1,
        n: [n, 1, 1],
        nv: [nv, 1, 1],
        xmin: [0.0; 3],
        xmax: [1.0, 0.0, 0.0],
        vmin: [-vmax, 0.0, 0.0],
        vmax: [vmax, 0.0, 0.0],
        r: 0.5,
        k: 2.0,
        pr: 1.0,
        mu_ref,
        omega: 1.0,
        maxdt: DT,
        tend: 0.2,
        dtdump: 0.05,
    }
}

fn ideal_gas(config: &Config) -> IdealGas {
    IdealGas::new(
        config.r,
        config.k,
        config.pr,
        config.mu_ref,
        config.omega,
        config.dim,
    )
}

fn quiescence(n: usize, nv: usize, steps: usize) {
    let config = config_1d(n, nv, 10.0, 1e-5);
    let ig = ideal_gas(&config);
    let mut ctx = Context::new(&config, ig.gas()).unwrap();
    let init = init_uniform(1.0, [0.0; 3], 1.0);
    ctx.initialize(&*init);
    let cv = ig.gas().cv();
    for _ in 0..steps {
        ctx.evolve(DT);
    }
    for s in 0..ctx.grid.n_cells() {
        assert!((ctx.rho[s] - 1.0).abs() < 1e-10);
        assert!(ctx.rhov[s].abs() < 1e-10);
        assert!((ctx.rhoe[s] - cv).abs() < 1e-9);
    }
}

#[test]
fn equilibrium_stays_quiescent() {
    quiescence(64, 65, 64);
}

#[test]
#[ignore = "full-resolution configuration, slow in debug builds"]
fn equilibrium_stays_quiescent_full() {
    quiescence(128, 129, 64);
}

fn traveling_uniform(steps: usize) {
    let config = config_1d(64, 65, 10.0, 1e-5);
    let ig = ideal_gas(&config);
    let mut ctx = Context::new(&config, ig.gas()).unwrap();
    let init = init_uniform(1.0, [1.0, 0.0, 0.0], 1.0);
    ctx.initialize(&*init);
    for _ in 0..steps {
        ctx.evolve(DT);
    }
    for s in 0..ctx.grid.n_cells() {
        assert!((ctx.rho[s] - 1.0).abs() < 1e-10);
        assert!((ctx.rhov[s] / ctx.rho[s] - 1.0).abs() < 1e-4);
    }
}

#[test]
fn uniform_flow_stays_uniform() {
    traveling_uniform(64);
}

#[test]
#[ignore = "advects through one full period, slow in debug builds"]
fn uniform_flow_survives_one_period() {
    // one domain length at u = 1
    traveling_uniform(2048);
}

fn shock_tube(n: usize, nv: usize, vmax: f64, mu_ref: f64, steps: usize) {
    let config = config_1d(n, nv, vmax, mu_ref);
    let ig = ideal_gas(&config);
    let mut ctx = Context::new(&config, ig.gas()).unwrap();
    let init = init_sod(0.5);
    ctx.initialize(&*init);
    let mass0 = ctx.total_mass();
    for _ in 0..steps {
        ctx.evolve(DT);
    }
    assert!((ctx.total_mass() - mass0).abs() < 1e-11 * mass0);
    let ns = ctx.grid.n_cells();
    let mut rho = Vec::with_capacity(ns);
    for s in 0..ns {
        let (r, _, t) = ctx.primitive(s);
        assert!(r > 0.0, "negative density in cell {}", s);
        assert!(t > 0.0, "negative temperature in cell {}", s);
        rho.push(r);
    }
    // The periodic seam at x = 0/1 is a second discontinuity launching its
    // own waves: a rarefaction into the dense side (head speed ~ c_L = 0.84)
    // and a shock into the dilute side (speed ~ 1.25). Assertions are kept
    // inside the window those waves have not yet reached.
    let t_total = steps as f64 * DT;
    let within = |x: f64| {
        let s = ((x * n as f64) as usize).min(n - 1);
        rho[s]
    };
    let lo = 0.84 * t_total + 0.06;
    let hi = 1.0 - 1.25 * t_total - 0.06;
    // undisturbed plateau centers between the seam fan and the central fan
    assert!((within(0.25) - 1.0).abs() < 1e-3);
    assert!((within(0.75) - 0.125).abs() < 1e-3);
    // density decreases monotonically across the central fan, up to a small
    // reconstruction ripple
    let (slo, shi) = ((lo * n as f64) as usize, (hi * n as f64) as usize);
    for s in slo..shi {
        assert!(
            rho[s + 1] <= rho[s] + 5e-3,
            "non-monotone density at cell {}: {} -> {}",
            s,
            rho[s],
            rho[s + 1]
        );
    }
}

#[test]
fn shock_tube_is_monotone_and_positive() {
    // t = 0.1
    shock_tube(64, 33, 8.0, 1e-4, 204);
}

#[test]
#[ignore = "full-resolution configuration, slow in debug builds"]
fn shock_tube_full_resolution() {
    // t = 0.15: the central and seam shocks meet shortly after
    shock_tube(128, 129, 10.0, 1e-5, 307);
}
