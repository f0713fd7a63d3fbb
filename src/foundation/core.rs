pub use kurbo::{Affine, Vec2};

/// Smallest scale a placed garment can reach.
pub const SCALE_MIN: f64 = 0.5;
/// Largest scale a placed garment can reach.
pub const SCALE_MAX: f64 = 5.0;

/// Clamp a scale factor into `[SCALE_MIN, SCALE_MAX]`.
///
/// NaN collapses to the lower bound so a bad delta can never poison the stored value.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return SCALE_MIN;
    }
    scale.clamp(SCALE_MIN, SCALE_MAX)
}

/// Whether `scale` is a legal stored value (finite and inside the closed bounds).
pub fn scale_in_range(scale: f64) -> bool {
    scale.is_finite() && (SCALE_MIN..=SCALE_MAX).contains(&scale)
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Placement of one garment layer on the canvas.
///
/// Units are canvas units relative to the canvas center, so a stored layout does not
/// depend on screen density.
pub struct Transform {
    /// Offset from the canvas center. Unbounded; layers may sit off-canvas.
    pub translate: Vec2,
    /// Rotation in degrees. Stored unnormalized (370 stays 370).
    pub rotation_deg: f64,
    /// Uniform scale in `[SCALE_MIN, SCALE_MAX]`.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Identity transform placed at `translate`.
    pub fn at(translate: Vec2) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }

    /// Rotation folded into `[0, 360)` for display. Never written back to storage.
    pub fn display_rotation(&self) -> f64 {
        let r = self.rotation_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
        if r >= 360.0 { 0.0 } else { r }
    }

    /// Affine matrix for render consumers: translate, then rotate, then scale.
    pub fn to_affine(self) -> Affine {
        // Canonical order: T(translate) * R(rot) * S(scale), pivot at the layer center.
        Affine::translate(self.translate)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
