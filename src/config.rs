//! Typed settings and filesystem locations.
//!
//! Settings are produced by the Lua configuration (see [`crate::script`])
//! and then layered with `LYRE__*` environment overrides.

mod load;
mod schema;

pub use load::*;
pub use schema::*;
