//! Version and stability parsing for release tags.
//!
//! Platform versions carry four numeric components (`6.4.20.0`), which is
//! why they are modelled here rather than as SemVer.

mod parser;
mod stability;

pub use parser::{ReleaseVersion, VersionParser};
pub use stability::{Stability, UnknownStability};
