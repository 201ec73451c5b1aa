//! Declaration emission for bundled TypeScript and Vue projects
//!
//! [`DtsPlugin`] observes the modules a bundler transforms, registers the
//! declaration-relevant ones with a [`CompilerEngine`], and at the end of the
//! build writes one `.d.ts` per emitted declaration into the output directory.

pub mod admission;
pub mod config;
pub mod driver;
pub mod emit;
pub mod engine;
pub mod filter;
pub mod module_registry;
pub mod paths;
pub mod plugin;
pub mod project;
pub mod session;
pub mod sfc;
pub mod sink;
pub mod types;

pub use config::Config;
pub use emit::{EmitSummary, OutputOptions};
pub use engine::{CompilerEngine, TscEngine};
pub use plugin::DtsPlugin;
