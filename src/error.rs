use miette::Diagnostic;
use thiserror::Error;

use crate::container::{NodeId, TextureId};

/// Main error type for charex operations
#[derive(Error, Diagnostic, Debug)]
pub enum CharexError {
    #[error("IO error: {0}")]
    #[diagnostic(code(charex::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(charex::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Corrupt container{}: {message}", format_offset(.offset))]
    #[diagnostic(code(charex::container::corrupt))]
    CorruptContainer {
        /// Absolute byte offset, when the problem maps to one.
        offset: Option<u64>,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unsupported container version {found} (newest supported is {supported})")]
    #[diagnostic(
        code(charex::container::version),
        help("Re-export the container with an older format version or upgrade charex")
    )]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("Failed to decode texture {texture} ('{name}'): {message}")]
    #[diagnostic(code(charex::texture::decode))]
    TextureDecode {
        texture: TextureId,
        name: String,
        message: String,
    },

    #[error("Node {node} references parent {parent}, which does not exist")]
    #[diagnostic(code(charex::hierarchy::dangling_parent))]
    DanglingParentReference { node: NodeId, parent: NodeId },

    #[error("Parent cycle detected: {}", format_cycle(.cycle))]
    #[diagnostic(code(charex::hierarchy::cycle))]
    CycleDetected { cycle: Vec<NodeId> },

    #[error("Expected a single root node, found {}", .roots.len())]
    #[diagnostic(
        code(charex::hierarchy::multiple_roots),
        help("Use the 'synthesize' root policy to group several units under one root")
    )]
    MultipleRoots { roots: Vec<NodeId> },

    #[error("Unknown sprite id {id}")]
    #[diagnostic(code(charex::compose::unknown_sprite))]
    UnknownSpriteId { id: NodeId },

    #[error("Sprite {id} cannot be placed: {message}")]
    #[diagnostic(
        code(charex::compose::placement),
        help("Check the node's transform, or compose with a smaller --ratio")
    )]
    Placement { id: NodeId, message: String },

    #[error("Composite canvas {width}x{height} is too large (limit {limit} pixels)")]
    #[diagnostic(
        code(charex::compose::canvas),
        help("Select fewer sprites or compose with a smaller --ratio")
    )]
    CanvasTooLarge { width: u64, height: u64, limit: u64 },

    #[error("Config error: {message}")]
    #[diagnostic(code(charex::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Export error: {message}")]
    #[diagnostic(code(charex::export))]
    Export {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CharexError {
    /// Shorthand for a `CorruptContainer` error without help text.
    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        CharexError::CorruptContainer {
            offset: Some(offset),
            message: message.into(),
            help: None,
        }
    }

    /// Prefix a `CorruptContainer` message with the entry it came from.
    pub(crate) fn in_entry(self, index: u32) -> Self {
        match self {
            CharexError::CorruptContainer {
                offset,
                message,
                help,
            } => CharexError::CorruptContainer {
                offset,
                message: format!("entry {}: {}", index, message),
                help,
            },
            other => other,
        }
    }
}

fn format_offset(offset: &Option<u64>) -> String {
    match offset {
        Some(at) => format!(" at byte {}", at),
        None => String::new(),
    }
}

fn format_cycle(cycle: &[NodeId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, CharexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = CharexError::CycleDetected {
            cycle: vec![NodeId(3), NodeId(4), NodeId(3)],
        };
        assert_eq!(err.to_string(), "Parent cycle detected: #3 -> #4 -> #3");
    }

    #[test]
    fn test_corrupt_message_with_and_without_offset() {
        assert_eq!(
            CharexError::corrupt(12, "bad kind").in_entry(3).to_string(),
            "Corrupt container at byte 12: entry 3: bad kind"
        );
        let unplaced = CharexError::CorruptContainer {
            offset: None,
            message: "duplicate id".to_string(),
            help: None,
        };
        assert_eq!(unplaced.to_string(), "Corrupt container: duplicate id");
    }

    #[test]
    fn test_unknown_sprite_message() {
        let err = CharexError::UnknownSpriteId { id: NodeId(42) };
        assert_eq!(err.to_string(), "Unknown sprite id #42");
    }
}
