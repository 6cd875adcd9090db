//! Name-based part classification.
//!
//! Classification looks only at a record's declared name. Matching is a
//! case-insensitive substring search over ordered token tables, so more
//! specific tokens ("eyebrow", "arml") are listed before the tokens they
//! contain ("eye", "arm").

use std::fmt;

use serde::Serialize;

/// Which family of sprites a part belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CharacterPart,
    CreaturePart,
    Unclassified,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::CharacterPart => "character",
            Category::CreaturePart => "creature",
            Category::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Finer-grained part kind, derived from the matched token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartTag {
    Cheek,
    Eyebrow,
    Eye,
    Mouth,
    Hair,
    ArmLeft,
    ArmRight,
    Arm,
    Hand,
    Leg,
    Body,
    Head,
    Neck,
    Nose,
    Effect,
    Creature,
    Other,
}

impl PartTag {
    pub fn name(&self) -> &'static str {
        match self {
            PartTag::Cheek => "cheek",
            PartTag::Eyebrow => "eyebrow",
            PartTag::Eye => "eye",
            PartTag::Mouth => "mouth",
            PartTag::Hair => "hair",
            PartTag::ArmLeft => "arm_left",
            PartTag::ArmRight => "arm_right",
            PartTag::Arm => "arm",
            PartTag::Hand => "hand",
            PartTag::Leg => "leg",
            PartTag::Body => "body",
            PartTag::Head => "head",
            PartTag::Neck => "neck",
            PartTag::Nose => "nose",
            PartTag::Effect => "effect",
            PartTag::Creature => "creature",
            PartTag::Other => "other",
        }
    }
}

impl fmt::Display for PartTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of classifying one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub category: Category,
    pub tag: PartTag,
}

impl Classification {
    pub const UNCLASSIFIED: Self = Self {
        category: Category::Unclassified,
        tag: PartTag::Other,
    };

    /// The sprite kind the source pipeline exported with premultiplied alpha.
    pub fn is_defective(&self) -> bool {
        self.category == Category::CharacterPart && self.tag == PartTag::Cheek
    }
}

const CHARACTER_TOKENS: &[(&str, PartTag)] = &[
    ("cheek", PartTag::Cheek),
    ("eyebrow", PartTag::Eyebrow),
    ("brow", PartTag::Eyebrow),
    ("eye", PartTag::Eye),
    ("mouth", PartTag::Mouth),
    ("hair", PartTag::Hair),
    ("arml", PartTag::ArmLeft),
    ("leftarm", PartTag::ArmLeft),
    ("armr", PartTag::ArmRight),
    ("rightarm", PartTag::ArmRight),
    ("arm", PartTag::Arm),
    ("hand", PartTag::Hand),
    ("leg", PartTag::Leg),
    ("body", PartTag::Body),
    ("torso", PartTag::Body),
    ("head", PartTag::Head),
    ("face", PartTag::Head),
    ("neck", PartTag::Neck),
    ("nose", PartTag::Nose),
    ("blend", PartTag::Effect),
    ("effect", PartTag::Effect),
    ("shadow", PartTag::Effect),
];

const CREATURE_TOKENS: &[&str] = &[
    "creature", "monster", "enemy", "animal", "pet", "wing", "tail", "claw", "paw", "fang",
    "horn", "beak",
];

/// Classify a part by its declared name.
///
/// Total: unknown names are `Unclassified`. A name matching both tables is
/// a character part.
pub fn classify(name: &str) -> Classification {
    let lower = name.to_lowercase();

    if let Some(&(_, tag)) = CHARACTER_TOKENS.iter().find(|(token, _)| lower.contains(token)) {
        return Classification {
            category: Category::CharacterPart,
            tag,
        };
    }

    if CREATURE_TOKENS.iter().any(|token| lower.contains(token)) {
        return Classification {
            category: Category::CreaturePart,
            tag: PartTag::Creature,
        };
    }

    Classification::UNCLASSIFIED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> PartTag {
        classify(name).tag
    }

    #[test]
    fn test_character_tokens_case_insensitive() {
        assert_eq!(classify("Body"), Classification { category: Category::CharacterPart, tag: PartTag::Body });
        assert_eq!(tag("HAIR_back"), PartTag::Hair);
        assert_eq!(tag("face_01"), PartTag::Head);
    }

    #[test]
    fn test_specific_tokens_win_over_contained_ones() {
        assert_eq!(tag("EyebrowL"), PartTag::Eyebrow);
        assert_eq!(tag("eye_open"), PartTag::Eye);
        assert_eq!(tag("ArmL_upper"), PartTag::ArmLeft);
        assert_eq!(tag("RightArm"), PartTag::ArmRight);
        assert_eq!(tag("arm_front"), PartTag::Arm);
    }

    #[test]
    fn test_cheek_is_defective() {
        let c = classify("Cheek_blush");
        assert_eq!(c.tag, PartTag::Cheek);
        assert!(c.is_defective());
        assert!(!classify("Mouth").is_defective());
    }

    #[test]
    fn test_creature_tokens() {
        let c = classify("Dragon_Wing_L");
        assert_eq!(c.category, Category::CreaturePart);
        assert_eq!(c.tag, PartTag::Creature);
        assert_eq!(classify("monster01").category, Category::CreaturePart);
    }

    #[test]
    fn test_character_takes_precedence() {
        // Matches "tail" (creature) and "hair" (character).
        let c = classify("hair_tail");
        assert_eq!(c.category, Category::CharacterPart);
        assert_eq!(c.tag, PartTag::Hair);
    }

    #[test]
    fn test_unknown_and_empty_names_are_unclassified() {
        assert_eq!(classify("Root"), Classification::UNCLASSIFIED);
        assert_eq!(classify(""), Classification::UNCLASSIFIED);
        assert_eq!(classify("ヒーロー"), Classification::UNCLASSIFIED);
    }

    #[test]
    fn test_token_tables_are_disjoint() {
        for (token, _) in CHARACTER_TOKENS {
            assert!(!CREATURE_TOKENS.contains(token), "{token} in both tables");
        }
    }
}
