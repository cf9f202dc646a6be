//! Bond length analysis of molecular trajectories.
//!
//! A [SystemDescriptor](initialization::SystemDescriptor) groups all atom pairs
//! of a molecule into bond types. Every frame of a trajectory is turned into a
//! [Frame](molecule::Frame) with its distances and bond lists, which the
//! configured [Rule](finder::Rule)s reduce to one value each.

pub mod analysis;
pub mod defaults;
pub mod error;
pub mod finder;
pub mod initialization;
pub mod molecule;
pub mod output;

pub use error::AnalyzeError;
