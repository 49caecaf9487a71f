//! Bundled growth reference curve.
//!
//! Yearly checkpoints from birth to 12 years, averaged across sexes. This
//! table only supports an approximate visualization of how a child's height
//! compares with a typical curve. It is not a clinical percentile table and
//! the deviation bands derived from it are not real standard deviations.

use shared::GrowthReferencePoint;

const fn point(age_months: i32, height_cm: f64, weight_kg: f64) -> GrowthReferencePoint {
    GrowthReferencePoint {
        age_months,
        height_cm,
        weight_kg,
    }
}

/// Reference points ordered by ascending age
pub const GROWTH_STANDARD: [GrowthReferencePoint; 13] = [
    point(0, 50.0, 3.3),
    point(12, 75.0, 9.6),
    point(24, 87.0, 12.2),
    point(36, 96.0, 14.3),
    point(48, 103.0, 16.3),
    point(60, 110.0, 18.3),
    point(72, 116.0, 20.5),
    point(84, 122.0, 22.9),
    point(96, 128.0, 25.4),
    point(108, 133.0, 28.1),
    point(120, 138.0, 31.2),
    point(132, 143.0, 34.5),
    point(144, 149.0, 38.5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_by_age() {
        assert!(GROWTH_STANDARD.windows(2).all(|w| w[0].age_months < w[1].age_months));
        assert!(GROWTH_STANDARD.iter().all(|p| p.height_cm > 0.0 && p.weight_kg > 0.0));
    }
}
