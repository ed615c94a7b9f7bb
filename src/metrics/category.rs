//! Severity tiers for function size.

use crate::models::Category;

/// Largest LOC still classified as [`Category::Low`].
pub const LOW_MAX: u32 = 35;

/// Largest LOC still classified as [`Category::Medium`].
pub const MEDIUM_MAX: u32 = 60;

/// Map a LOC value to its severity tier.
///
/// Boundaries belong to the lower tier: 35 is low, 60 is medium.
pub fn classify(loc: u32) -> Category {
    match loc {
        0..=LOW_MAX => Category::Low,
        0..=MEDIUM_MAX => Category::Medium,
        _ => Category::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_table() {
        assert_eq!(classify(0), Category::Low);
        assert_eq!(classify(35), Category::Low);
        assert_eq!(classify(36), Category::Medium);
        assert_eq!(classify(60), Category::Medium);
        assert_eq!(classify(61), Category::High);
        assert_eq!(classify(u32::MAX), Category::High);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(0);
        for loc in 1..200 {
            let current = classify(loc);
            assert!(current >= previous, "tier dropped at {}", loc);
            assert_eq!(classify(loc), current);
            previous = current;
        }
    }
}
