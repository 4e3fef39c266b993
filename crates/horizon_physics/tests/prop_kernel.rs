//! Property-based tests for the metric kernel and shading math.
//!
//! Covers: horizon bounds, radius ordering, ISCO symmetry, time dilation
//! monotonicity, disk endpoints, density falloff and alpha compositing.

use horizon_physics::{
    alpha_blend, density_falloff, disk_inner_edge, disk_outer_edge, disk_temperature,
    event_horizon, isco, path_length_factor, photon_sphere, time_dilation, BlackHoleConfig,
    DiskProfile,
};
use proptest::prelude::*;

// ── Metric Kernel ────────────────────────────────────────────────────

proptest! {
    /// The outer horizon lies in (0, 2m] and equals 2m only without spin.
    #[test]
    fn horizon_bounded_by_schwarzschild(m in 0.01f64..1000.0, a in -1.0f64..=1.0) {
        let r = event_horizon(m, a);
        prop_assert!(r > 0.0);
        prop_assert!(r <= 2.0 * m * (1.0 + 1e-12));
        if a.abs() > 1e-6 {
            prop_assert!(r < 2.0 * m);
        }
    }

    /// Horizon < photon orbit < prograde ISCO for moderate spin.
    #[test]
    fn radii_ordered(m in 0.01f64..1000.0, a in -0.9f64..=0.9) {
        let horizon = event_horizon(m, a);
        let photon = photon_sphere(m, a);
        let isco_pro = isco(m, a, true);
        prop_assert!(horizon < photon, "horizon {} !< photon {}", horizon, photon);
        prop_assert!(photon < isco_pro, "photon {} !< isco {}", photon, isco_pro);
    }

    /// Prograde ISCO never exceeds retrograde; both sit outside the horizon.
    #[test]
    fn isco_direction_ordering(m in 0.01f64..1000.0, a in -0.999f64..=0.999) {
        let pro = isco(m, a, true);
        let retro = isco(m, a, false);
        prop_assert!(pro <= retro);
        prop_assert!(pro > event_horizon(m, a));
    }

    /// Time dilation is in [0, 1] and strictly increasing outside 2m.
    #[test]
    fn time_dilation_monotone(m in 0.01f64..100.0, f in 1.0001f64..1000.0, step in 0.001f64..10.0) {
        let r = 2.0 * m * f;
        let near = time_dilation(r, m);
        let far = time_dilation(r + step * m, m);
        prop_assert!((0.0..=1.0).contains(&near));
        prop_assert!(far > near);
    }

    /// Zero at and inside the Schwarzschild radius.
    #[test]
    fn time_dilation_zero_inside(m in 0.01f64..100.0, f in 0.0f64..=1.0) {
        prop_assert_eq!(time_dilation(2.0 * m * f, m), 0.0);
    }
}

// ── Disk Profile ─────────────────────────────────────────────────────

proptest! {
    /// Disk edges are tied to the kernel and ordered.
    #[test]
    fn disk_edges(m in 0.01f64..1000.0, a in -1.0f64..=1.0) {
        let inner = disk_inner_edge(m, a);
        prop_assert!((inner - isco(m, a, true)).abs() < 1e-10);
        prop_assert!((disk_outer_edge(m) - 200.0 * m).abs() < 1e-9 * m.max(1.0));
        prop_assert!(inner <= disk_outer_edge(m));

        let config = BlackHoleConfig::new(m, a).unwrap();
        let profile = DiskProfile::new(&config);
        prop_assert!((profile.temperature(profile.inner_edge) - 20_000.0).abs() < 1e-6);
        prop_assert!((profile.temperature(profile.outer_edge) - 3_000.0).abs() < 1e-6);
    }

    /// Temperature never increases outward.
    #[test]
    fn temperature_non_increasing(t1 in 0.0f64..=1.0, t2 in 0.0f64..=1.0) {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let r = |t: f64| 6.0 + 194.0 * t;
        prop_assert!(disk_temperature(r(lo), 6.0, 200.0, 1.0) >= disk_temperature(r(hi), 6.0, 200.0, 1.0));
    }
}

// ── Volumetric ───────────────────────────────────────────────────────

proptest! {
    /// Density falloff is bounded and symmetric.
    #[test]
    fn density_falloff_bounded(y in -100.0f64..100.0, h in 0.001f64..50.0, k in 0.0f64..10.0) {
        let d = density_falloff(y, h, k);
        prop_assert!((0.0..=1.0).contains(&d));
        prop_assert_eq!(d, density_falloff(-y, h, k));
        prop_assert_eq!(density_falloff(0.0, h, k), 1.0);
    }

    /// Blending matches the linear formula and stays in range.
    #[test]
    fn alpha_blend_linear(
        n in prop::array::uniform3(0.0f64..=1.0),
        o in prop::array::uniform3(0.0f64..=1.0),
        alpha in 0.0f64..=1.0,
    ) {
        let out = alpha_blend(n, o, alpha);
        for i in 0..3 {
            prop_assert!((out[i] - (n[i] * alpha + o[i] * (1.0 - alpha))).abs() < 1e-10);
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&out[i]));
        }
        prop_assert_eq!(alpha_blend(n, o, 0.0), o);
        prop_assert_eq!(alpha_blend(n, o, 1.0), n);
    }

    /// Path length stays within [1, 3].
    #[test]
    fn path_length_bounded(angle in -1.0f64..=1.0) {
        let p = path_length_factor(angle);
        prop_assert!((1.0..=3.0).contains(&p));
    }
}
