use std::f64::consts::PI;

/// Temperature from specific total energy `e = rhoE/rho` and bulk speed.
pub type Temperature<'a> = &'a (dyn Fn(f64, f64) -> f64 + Sync);
/// Molecular viscosity from temperature.
pub type Viscosity<'a> = &'a (dyn Fn(f64) -> f64 + Sync);
/// Equilibrium distribution from peculiar speed squared, density and temperature.
pub type Equilibrium<'a> = &'a (dyn Fn(f64, f64, f64) -> f64 + Sync);
/// Prescribed per-cell state `(rho, u, T)` from cell index and center.
pub type Init<'a> = &'a (dyn Fn(usize, [f64; 3]) -> (f64, [f64; 3], f64) + Sync);

/// Constitutive closure consumed by the solver: gas constants plus the
/// temperature, viscosity and equilibrium oracles.
pub struct Gas<'a> {
    pub r: f64,
    pub k: f64,
    pub pr: f64,
    pub temperature: Temperature<'a>,
    pub visc: Viscosity<'a>,
    pub geq: Equilibrium<'a>,
}

impl Gas<'_> {
    pub fn cv(&self) -> f64 {
        (3.0 + self.k) * self.r / 2.0
    }

    pub fn gamma(&self) -> f64 {
        (self.k + 5.0) / (self.k + 3.0)
    }

    /// BGK relaxation time `tau = mu/p` with `p = rho R T`.
    pub fn tau(&self, rho: f64, t: f64) -> f64 {
        (self.visc)(t) / (rho * self.r * t)
    }

    /// Energy-carrier equilibrium from the mass-carrier one:
    /// `b_eq = g_eq (|xi|^2 + (3 - D + K) R T) / 2`.
    pub fn beq(&self, g_eq: f64, xi2: f64, t: f64, dim: usize) -> f64 {
        g_eq * (xi2 + (3.0 - dim as f64 + self.k) * self.r * t) / 2.0
    }
}

/// Default ideal-gas closure set. Owns the boxed oracles; borrow a [`Gas`]
/// view with [`IdealGas::gas`] for the lifetime of a solver.
pub struct IdealGas {
    r: f64,
    k: f64,
    pr: f64,
    temperature: Box<dyn Fn(f64, f64) -> f64 + Sync>,
    visc: Box<dyn Fn(f64) -> f64 + Sync>,
    geq: Box<dyn Fn(f64, f64, f64) -> f64 + Sync>,
}

impl IdealGas {
    /// `mu(T) = mu_ref T^omega`, `T(e, u) = (e - u^2/2)/Cv`, Maxwellian
    /// `g_eq` reduced over the `dim` active velocity axes.
    pub fn new(r: f64, k: f64, pr: f64, mu_ref: f64, omega: f64, dim: usize) -> Self {
        let cv = (3.0 + k) * r / 2.0;
        IdealGas {
            r,
            k,
            pr,
            temperature: Box::new(move |e, u| (e - u * u / 2.0) / cv),
            visc: Box::new(move |t| mu_ref * t.powf(omega)),
            geq: Box::new(move |c2, rho, t| {
                rho / (2.0 * PI * r * t).powf(dim as f64 / 2.0) * (-c2 / (2.0 * r * t)).exp()
            }),
        }
    }

    pub fn gas(&self) -> Gas<'_> {
        Gas {
            r: self.r,
            k: self.k,
            pr: self.pr,
            temperature: &*self.temperature,
            visc: &*self.visc,
            geq: &*self.geq,
        }
    }
}

pub fn init_uniform(
    rho: f64,
    u: [f64; 3],
    t: f64,
) -> Box<dyn Fn(usize, [f64; 3]) -> (f64, [f64; 3], f64) + Sync> {
    Box::new(move |_s, _x| (rho, u, t))
}

/// Two-state shock-tube split along x at `split`.
pub fn init_sod(split: f64) -> Box<dyn Fn(usize, [f64; 3]) -> (f64, [f64; 3], f64) + Sync> {
    Box::new(move |_s, x| {
        if x[0] < split {
            (1.0, [0.0; 3], 1.0)
        } else {
            (0.125, [0.0; 3], 0.8)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_constants() {
        let ig = IdealGas::new(0.5, 2.0, 1.0, 1e-5, 1.0, 1);
        let gas = ig.gas();
        assert!((gas.cv() - 1.25).abs() < 1e-15);
        assert!((gas.gamma() - 1.4).abs() < 1e-15);
    }

    #[test]
    fn temperature_inverts_energy() {
        let ig = IdealGas::new(0.5, 2.0, 1.0, 1e-5, 1.0, 1);
        let gas = ig.gas();
        let (t0, u) = (0.8, 0.3);
        let e = gas.cv() * t0 + u * u / 2.0;
        assert!(((gas.temperature)(e, u) - t0).abs() < 1e-14);
    }

    #[test]
    fn relaxation_time_is_visc_over_pressure() {
        let ig = IdealGas::new(0.5, 2.0, 1.0, 2e-5, 0.0, 1);
        let gas = ig.gas();
        // constant viscosity, p = rho R T = 0.25
        assert!((gas.tau(1.0, 0.5) - 8e-5).abs() < 1e-18);
    }

    #[test]
    fn maxwellian_normalization_1d() {
        // trapezoid-summed g_eq over a wide fine grid approaches rho
        let ig = IdealGas::new(0.5, 2.0, 1.0, 1e-5, 1.0, 1);
        let gas = ig.gas();
        let (rho, t) = (1.3, 0.9);
        let n = 4001;
        let h = 20.0 / (n - 1) as f64;
        let mut sum = 0.0;
        for i in 0..n {
            let c = -10.0 + i as f64 * h;
            let f = (gas.geq)(c * c, rho, t);
            sum += if i == 0 || i == n - 1 { f * h / 2.0 } else { f * h };
        }
        assert!((sum - rho).abs() < 1e-8);
    }

    #[test]
    fn sod_split_states() {
        let init = init_sod(0.5);
        let (rl, _, tl) = init(0, [0.25, 0.0, 0.0]);
        let (rr, _, tr) = init(1, [0.75, 0.0, 0.0]);
        assert_eq!((rl, tl), (1.0, 1.0));
        assert_eq!((rr, tr), (0.125, 0.8));
    }
}
