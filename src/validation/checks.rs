//! Record-level checks over parsed container contents.
//!
//! Each check takes the parsed contents and returns a `ValidationResult`.
//! None of these are fatal; structural problems are errors from the
//! hierarchy builder instead.

use std::collections::{HashMap, HashSet};

use crate::container::ContainerContents;

use super::warning::{Diagnostic, ValidationResult};

/// Check for records sharing a name (selection by name becomes ambiguous).
pub fn check_duplicate_names(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen: HashMap<&str, u64> = HashMap::new();

    for record in &contents.records {
        if let Some(first) = seen.get(record.name.as_str()) {
            result.push(
                Diagnostic::warning(
                    "charex::validate::duplicate-name",
                    format!(
                        "Record '{}' shares its name with #{}",
                        record.name, first
                    ),
                )
                .about(record.id)
                .with_help("Select this part by id instead of by name"),
            );
        } else {
            seen.insert(&record.name, record.id.0);
        }
    }

    result
}

/// Check for duplicate texture ids; only the first block with an id is used.
pub fn check_duplicate_textures(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for block in &contents.textures {
        if !seen.insert(block.id) {
            result.push(
                Diagnostic::warning(
                    "charex::validate::duplicate-texture",
                    format!("Texture '{}' reuses an id; the later block is ignored", block.name),
                )
                .about(block.id),
            );
        }
    }

    result
}

/// Check for textures no record points at.
pub fn check_unused_textures(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();
    let used: HashSet<_> = contents
        .records
        .iter()
        .filter_map(|r| r.sprite.map(|s| s.texture))
        .collect();

    for block in &contents.textures {
        if !used.contains(&block.id) {
            result.push(
                Diagnostic::warning(
                    "charex::validate::unused-texture",
                    format!("Texture '{}' is not used by any record", block.name),
                )
                .about(block.id),
            );
        }
    }

    result
}

/// Check for inactive records that still carry a sprite.
pub fn check_inactive_sprites(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();

    for record in &contents.records {
        if !record.active && record.sprite.is_some() {
            result.push(
                Diagnostic::warning(
                    "charex::validate::inactive-sprite",
                    format!("Part '{}' is inactive in the source scene", record.name),
                )
                .about(record.id)
                .with_help("It is still extracted and can be selected explicitly"),
            );
        }
    }

    result
}

/// Check for zero scale, which collapses a subtree onto its parent.
pub fn check_zero_scale(contents: &ContainerContents) -> ValidationResult {
    let mut result = ValidationResult::new();

    for record in &contents.records {
        let scale = record.transform.scale;
        if scale.x == 0.0 || scale.y == 0.0 {
            result.push(
                Diagnostic::warning(
                    "charex::validate::zero-scale",
                    format!("Record '{}' has zero scale", record.name),
                )
                .about(record.id),
            );
        }
    }

    result
}
