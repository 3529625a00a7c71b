use std::f64::consts::PI;

/// Cosine ease: slow start, fast middle, slow finish. Maps 0 → 0 and 1 → 1.
pub fn slow_in_slow_out(progress: f64) -> f64 {
    1.0 - ((progress * PI).cos() + 1.0) / 2.0
}
