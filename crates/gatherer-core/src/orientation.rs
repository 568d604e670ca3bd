use core::f64::consts::PI;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Wraps an angle into `(-PI, PI]` by repeated `2*PI` adjustment.
///
/// Non-finite input is returned unchanged.
pub fn normalize_angle(radians: f64) -> f64 {
    if !radians.is_finite() {
        return radians;
    }
    let mut a = radians;
    if a.abs() > 64.0 * PI {
        a %= 2.0 * PI;
    }
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}
