/// Velocity-space quadrature: tensor product of per-axis composite
/// Newton-Cotes (Boole) rules.
///
/// Nodes are stored flat with `v = vx + nv_x*vy + nv_x*nv_y*vz`; `xi[v]`
/// is the node coordinate and `w[v]` the tensor-product weight, so that
/// `sum_v w[v]` equals the measure of the velocity box. Inactive axes
/// carry a single node at 0 with weight 1.
pub struct VelocityGrid {
    pub nv: [usize; 3],
    pub nodes: [Vec<f64>; 3],
    pub weights: [Vec<f64>; 3],
    pub xi: Vec<[f64; 3]>,
    pub w: Vec<f64>,
}

/// Composite Boole rule on `n = 4m+1` equispaced nodes over `[a, b]`.
fn boole_axis(n: usize, a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
    if n == 1 {
        return (vec![0.0], vec![1.0]);
    }
    debug_assert!(n >= 5 && n % 4 == 1);
    let h = (b - a) / (n - 1) as f64;
    let nodes = (0..n).map(|i| a + i as f64 * h).collect();
    let mut w = vec![0.0; n];
    for seg in 0..(n - 1) / 4 {
        for (m, c) in [7.0, 32.0, 12.0, 32.0, 7.0].into_iter().enumerate() {
            w[4 * seg + m] += c;
        }
    }
    for wk in w.iter_mut() {
        *wk *= 2.0 * h / 45.0;
    }
    (nodes, w)
}

impl VelocityGrid {
    pub fn newton_cotes(nv: [usize; 3], vmin: [f64; 3], vmax: [f64; 3]) -> Self {
        let (nx, wx) = boole_axis(nv[0], vmin[0], vmax[0]);
        let (ny, wy) = boole_axis(nv[1], vmin[1], vmax[1]);
        let (nz, wz) = boole_axis(nv[2], vmin[2], vmax[2]);
        let n_nodes = nv[0] * nv[1] * nv[2];
        let mut xi = Vec::with_capacity(n_nodes);
        let mut w = Vec::with_capacity(n_nodes);
        for vz in 0..nv[2] {
            for vy in 0..nv[1] {
                for vx in 0..nv[0] {
                    xi.push([nx[vx], ny[vy], nz[vz]]);
                    w.push(wx[vx] * wy[vy] * wz[vz]);
                }
            }
        }
        VelocityGrid {
            nv,
            nodes: [nx, ny, nz],
            weights: [wx, wy, wz],
            xi,
            w,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nv[0] * self.nv[1] * self.nv[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_box_measure() {
        let vel = VelocityGrid::newton_cotes([9, 5, 1], [-3.0, -1.0, 0.0], [3.0, 1.0, 0.0]);
        let wx: f64 = vel.weights[0].iter().sum();
        assert!((wx - 6.0).abs() < 1e-13);
        let total: f64 = vel.w.iter().sum();
        assert!((total - 12.0).abs() < 1e-12);
    }

    #[test]
    fn nodes_span_bounds() {
        let vel = VelocityGrid::newton_cotes([13, 1, 1], [-10.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        assert!((vel.nodes[0][0] + 10.0).abs() < 1e-15);
        assert!((vel.nodes[0][12] - 10.0).abs() < 1e-15);
        let h = vel.nodes[0][1] - vel.nodes[0][0];
        assert!((h - 20.0 / 12.0).abs() < 1e-13);
    }

    #[test]
    fn inactive_axis_single_node() {
        let vel = VelocityGrid::newton_cotes([5, 1, 1], [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert_eq!(vel.nodes[1], vec![0.0]);
        assert_eq!(vel.weights[1], vec![1.0]);
        assert_eq!(vel.n_nodes(), 5);
    }

    #[test]
    fn boole_exact_for_quintics() {
        // single Boole panel integrates degree <= 5 exactly
        let (x, w) = boole_axis(5, -1.0, 1.0);
        for (p, exact) in [(2, 2.0 / 3.0), (4, 2.0 / 5.0), (5, 0.0)] {
            let q: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(p)).sum();
            assert!((q - exact).abs() < 1e-14, "degree {}", p);
        }
    }

    #[test]
    fn composite_joints_accumulate() {
        // interior panel joints carry 7 + 7 = 14 times the base factor
        let (_, w) = boole_axis(9, 0.0, 8.0);
        let c = 2.0 / 45.0; // h = 1
        assert!((w[0] - 7.0 * c).abs() < 1e-15);
        assert!((w[4] - 14.0 * c).abs() < 1e-15);
        assert!((w[8] - 7.0 * c).abs() < 1e-15);
    }
}
