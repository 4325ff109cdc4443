//! Music library: the `Track` model and directory scanning.
//!
//! The library view is a flattened tree: directories appear as
//! non-playable entries so they can be shown (and rejected by the queue)
//! next to the audio files they contain.

mod model;
mod scan;

pub use model::*;
pub use scan::*;
