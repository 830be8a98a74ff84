//! Staging and packing of release artifacts.
//!
//! - [`builder`]: drives a whole build, one variation at a time
//! - [`extract`]: unpacks downloaded tarballs into the staging tree
//! - [`compress`]: packs the staging tree into the final `.orig.tar.gz`
//!
//! ## Build Steps
//!
//! ```text
//! for each variation:
//!     resolve dest -> mkdir -p -> fetch (gs:// | http) -> extract -> rm dest
//! compress <out>/<name> -> <out>/<name>_<version>.orig.tar.gz
//! rm -r <out>/<name>
//! ```
//!
//! Any step failing stops the build right there.

mod builder;
mod compress;
mod extract;

pub use builder::ArchiveBuilder;
pub use compress::{CompressOptions, compress};
pub use extract::extract;
