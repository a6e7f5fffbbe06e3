//! Shared proptest configuration for in-crate property tests.
//!
//! Under Miri the case count drops so the interpreter finishes in reasonable time.

/// Number of cases each property test runs.
///
/// ```ignore
/// proptest! {
///     #![proptest_config(ProptestConfig {
///         cases: miri_case_count(),
///         ..ProptestConfig::default()
///     })]
///     #[test]
///     fn seek_stays_in_range(target in any::<i64>()) { /* ... */ }
/// }
/// ```
#[must_use]
pub const fn miri_case_count() -> u32 {
    if cfg!(miri) {
        5
    } else {
        256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_count_depends_on_miri() {
        let expected = if cfg!(miri) { 5 } else { 256 };
        assert_eq!(miri_case_count(), expected);
    }
}
