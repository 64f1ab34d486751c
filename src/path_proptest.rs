//! Property-based tests for path normalization.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{normalize, FileLocation};
    use proptest::prelude::*;

    /// Path-like strings built from a small alphabet so `.`/`..`/`/` show up often.
    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("".to_string()),
                Just(".".to_string()),
                Just("..".to_string()),
                "[a-z]{1,6}(\\.(yaml|json|toml))?",
            ],
            0..8,
        )
        .prop_map(|segments| segments.join("/"))
    }

    proptest! {
        /// Property: normalizing twice gives the same result as normalizing once
        #[test]
        fn normalize_is_idempotent(input in path_strategy()) {
            let once = normalize(&input);
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: normalized paths contain no empty or `.` segments
        #[test]
        fn normalize_removes_empty_and_dot_segments(input in path_strategy()) {
            let result = normalize(&input);
            let relative = result.trim_start_matches('/');
            if !relative.is_empty() {
                for segment in relative.split('/') {
                    prop_assert!(!segment.is_empty(), "empty segment in '{}'", result);
                    prop_assert!(segment != ".", "dot segment in '{}'", result);
                }
            }
        }

        /// Property: `..` only ever appears as a leading run
        #[test]
        fn normalize_keeps_parent_segments_leading(input in path_strategy()) {
            let result = normalize(&input);
            let mut seen_name = false;
            for segment in result.split('/').filter(|s| !s.is_empty()) {
                if segment == ".." {
                    prop_assert!(!seen_name, "'..' after a name in '{}'", result);
                } else {
                    seen_name = true;
                }
            }
        }

        /// Property: joining a name onto a directory yields a child of that directory
        #[test]
        fn join_then_parent_round_trips(dir in "[a-z]{1,5}(/[a-z]{1,5}){0,3}", name in "[a-z]{1,8}\\.yaml") {
            let base = FileLocation::new(&dir);
            let joined = base.join(&name);
            prop_assert_eq!(joined.parent(), base);
            prop_assert_eq!(joined.file_name(), name.as_str());
        }
    }
}
