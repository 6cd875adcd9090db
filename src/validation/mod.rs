//! Diagnostics for container contents.
//!
//! Recovered per-entry failures (texture decode, unusable sprite refs) and
//! record lint warnings are collected into a `ValidationResult` that travels
//! alongside the catalog instead of aborting the build.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::container::ContainerContents;

/// Run all record checks against parsed contents.
pub fn validate_contents(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_duplicate_names(contents));
    result.merge(checks::check_duplicate_textures(contents));
    result.merge(checks::check_unused_textures(contents));
    result.merge(checks::check_inactive_sprites(contents));
    result.merge(checks::check_zero_scale(contents));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ObjectRecord;

    #[test]
    fn test_validate_empty_contents() {
        let result = validate_contents(&ContainerContents::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_collects_all_checks() {
        let mut hidden = ObjectRecord::new(2, "Eye").with_sprite(9, Default::default());
        hidden.active = false;
        let contents = ContainerContents {
            textures: vec![],
            records: vec![ObjectRecord::new(1, "Eye"), hidden],
        };

        let result = validate_contents(&contents);
        assert!(!result.has_errors());
        assert_eq!(result.warning_count(), 2);
    }
}
