//! Rendering: colour correction, compositing, and PNG output.
//!
//! Nothing here mutates the catalog. Correction and tinting produce new
//! buffers at catalog build time; composition reads sprites and writes only to the
//! canvas it allocates.

mod blend;
mod compose;
mod correct;
mod png;

pub use blend::{paint, source_over};
pub use compose::{CompositeImage, CompositionRequest, Compositor, Selection, DEFAULT_RATIO};
pub use correct::{apply_tint, correct, tint_image, unpremultiply};
pub use png::{scale_pixels, write_png};
