use core::f64::consts::PI;

use gatherer_core::{degrees_to_radians, normalize_angle};

const EPS: f64 = 1e-9;

#[test]
fn normalize_lands_in_half_open_interval() {
    for deg in (-1440..=1440).step_by(15) {
        let a = normalize_angle(degrees_to_radians(deg as f64));
        assert!(a > -PI && a <= PI, "deg={deg} normalized to {a}");
    }
}

#[test]
fn normalize_is_idempotent() {
    for raw in [-7.5, -PI, -1.0, 0.0, 0.3, PI, 4.0, 12.9, 1000.25] {
        let once = normalize_angle(raw);
        let twice = normalize_angle(once);
        assert!((once - twice).abs() < EPS, "raw={raw} once={once} twice={twice}");
    }
}

#[test]
fn boundary_maps_minus_pi_to_pi() {
    assert!((normalize_angle(-PI) - PI).abs() < EPS);
    assert!((normalize_angle(PI) - PI).abs() < EPS);
}

#[test]
fn full_turns_are_removed() {
    let a = normalize_angle(0.25 + 6.0 * PI);
    assert!((a - 0.25).abs() < 1e-9);
    let b = normalize_angle(degrees_to_radians(270.0));
    assert!((b + PI / 2.0).abs() < EPS);
}
