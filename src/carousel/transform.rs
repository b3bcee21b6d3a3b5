//! CSS transform strings for orbit, deck and reveal poses
//!
//! Orbit poses always use the same four functions so that any two of them
//! interpolate function by function.

/// Round to 1e-4 and drop negative zero
fn num(v: f64) -> String {
    let r = (v * 1e4).round() / 1e4;
    if r == 0.0 { "0".to_string() } else { r.to_string() }
}

pub fn ring(angle: f64) -> String {
    format!("rotateY({}deg)", num(angle))
}

/// A card `slot` degrees round the ring, `lift` px up, turned by `facing`
pub fn orbit(slot: f64, distance: f64, lift: f64, facing: f64) -> String {
    format!(
        "rotateY({}deg) translateZ({}px) translateY({}px) rotateY({}deg)",
        num(slot),
        num(distance),
        num(lift),
        num(facing)
    )
}

/// Facing that keeps card `slot` turned toward the viewer at ring `angle`
pub fn facing_degrees(slot: f64, angle: f64, skew: f64) -> f64 {
    -(slot + angle) + skew
}

/// Card lying flat in the deck, `height` px above the ground at stack `layer`
pub fn deck(distance: f64, height: f64, layer: usize, lateral: f64) -> String {
    format!(
        "translateZ({}px) translateY(50%) rotateX(90deg) translateZ({}px) translateX({}px)",
        num(distance),
        num(height + layer as f64),
        num(lateral)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_format() {
        assert_eq!(
            orbit(36.0, 200.0, 0.0, -36.0),
            "rotateY(36deg) translateZ(200px) translateY(0px) rotateY(-36deg)"
        );
    }

    #[test]
    fn test_numbers_are_rounded() {
        assert_eq!(ring(-0.0), "rotateY(0deg)");
        assert_eq!(ring(12.000000001), "rotateY(12deg)");
        assert_eq!(ring(0.5), "rotateY(0.5deg)");
        assert_eq!(num(facing_degrees(36.0, 324.0, 0.0)), "-360");
    }

    #[test]
    fn test_deck_layers_stack() {
        assert_eq!(
            deck(220.0, 120.0, 3, 0.0),
            "translateZ(220px) translateY(50%) rotateX(90deg) translateZ(123px) translateX(0px)"
        );
    }
}
