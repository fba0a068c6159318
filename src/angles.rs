//! Joint angle at a vertex using the dot product
//!
//! Works on the two vectors leaving the vertex B (towards A and towards C),
//! so the result is the interior angle at B.

/// Vectors shorter than this are treated as degenerate.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Interior angle at `b` in degrees, in `[0, 180]`.
///
/// Uses cos(θ) = (BA · BC) / (|BA| × |BC|)
///
/// Returns `None` when either segment has zero length or a coordinate is not
/// finite, so bad points never read as a real measurement.
pub fn angle_at(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Option<f32> {
    // f64 keeps the squared lengths of any finite f32 coordinates finite
    let ba = (f64::from(a.0) - f64::from(b.0), f64::from(a.1) - f64::from(b.1));
    let bc = (f64::from(c.0) - f64::from(b.0), f64::from(c.1) - f64::from(b.1));

    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();

    if !(mag_ba.is_finite() && mag_bc.is_finite()) {
        return None;
    }
    let min = f64::from(MIN_SEGMENT_LENGTH);
    if mag_ba < min || mag_bc < min {
        return None;
    }

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let cos_angle = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    if !cos_angle.is_finite() {
        return None;
    }

    Some(cos_angle.acos().to_degrees() as f32)
}
