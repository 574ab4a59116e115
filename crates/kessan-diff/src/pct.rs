//! Percentage change.

/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round2((current / base - 1) * 100)`.
///
/// Absent when either side is absent or the base is zero. Negative bases are
/// used as they are, so a swing from loss to profit yields a negative figure.
pub fn percent_change(current: Option<f64>, base: Option<f64>) -> Option<f64> {
    let (current, base) = (current?, base?);
    if base == 0.0 {
        return None;
    }
    // `+ 0.0` turns a rounded -0.0 into 0.0
    let pct = round2((current / base - 1.0) * 100.0) + 0.0;
    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1100.0, 1000.0, 10.0)]
    #[case(120.0, 100.0, 20.0)]
    #[case(900.0, 1000.0, -10.0)]
    #[case(1000.0, 1000.0, 0.0)]
    #[case(0.0, 250.0, -100.0)]
    #[case(1.0, 3.0, -66.67)]
    #[case(2.0, 3.0, -33.33)]
    fn test_percent_change(#[case] current: f64, #[case] base: f64, #[case] expected: f64) {
        let pct = percent_change(Some(current), Some(base)).unwrap();
        assert_relative_eq!(pct, expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case(Some(100.0), Some(0.0))]
    #[case(Some(100.0), Some(-0.0))]
    #[case(Some(100.0), None)]
    #[case(None, Some(100.0))]
    #[case(None, None)]
    fn test_percent_change_absent(#[case] current: Option<f64>, #[case] base: Option<f64>) {
        assert_eq!(percent_change(current, base), None);
    }

    #[test]
    fn test_rounded_to_zero_is_positive() {
        let pct = percent_change(Some(99_999.99), Some(100_000.0)).unwrap();
        assert_eq!(pct, 0.0);
        assert!(pct.is_sign_positive());
        assert_eq!(format!("{pct:.2}"), "0.00");
    }

    #[test]
    fn test_negative_base() {
        // -50 to 100: (100 / -50 - 1) * 100
        assert_relative_eq!(percent_change(Some(100.0), Some(-50.0)).unwrap(), -300.0);
    }

    #[test]
    fn test_overflow_is_absent() {
        assert_eq!(percent_change(Some(f64::MAX), Some(f64::MIN_POSITIVE)), None);
    }

    #[test]
    fn test_idempotent() {
        let first = percent_change(Some(45_095_325.0), Some(37_154_298.0));
        let second = percent_change(Some(45_095_325.0), Some(37_154_298.0));
        assert_eq!(first, second);
        assert_relative_eq!(first.unwrap(), 21.37, epsilon = 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_relative_eq!(round2(10.000000000000009), 10.0);
        assert_relative_eq!(round2(-0.125), -0.13);
        assert_relative_eq!(round2(3.14159), 3.14);
    }
}
