//! # modwatch-pipeline
//!
//! Reference implementations of the host loading contract defined in
//! `modwatch-core`:
//!
//! - [`MemoryPipeline`] — in-process resolver chain and unit table, with
//!   units produced by registered factories. Backs the test suite and
//!   hosts that manage their own plugin artifacts.
//! - `LibraryResolver` (feature `dynamic`) — resolves unit names to
//!   shared libraries on disk via `libloading`.

#[cfg(feature = "dynamic")]
pub mod dynamic;
pub mod memory;

pub use memory::{MemoryPipeline, MemoryUnit, UnitFactory};

#[cfg(feature = "dynamic")]
pub use dynamic::{LibraryResolver, LibraryUnit};
