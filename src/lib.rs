//! A symbol index core for a Ruby language server: constant/method
//! resolution over a C3-like ancestor linearization, prefix and fuzzy
//! search, and reference finding, fed incrementally by a `ruby_prism`-based
//! Declaration Listener and, for sidecar type signatures, by the
//! `rbs-parser` adjunct. See SPEC_FULL.md and DESIGN.md.

pub mod config;
pub mod enhancement;
pub mod entry;
pub mod error;
pub mod index;
pub mod listener;
pub mod location;
pub mod prefix_tree;
pub mod rbs_adjunct;
pub mod reference;
pub mod uri;

pub use config::Config;
pub use entry::{Entry, EntryBuilder, EntryKind, Visibility};
pub use error::{ConfigValidationError, IndexingError, NonExistingNamespace, UnresolvableAlias};
pub use index::{CallInfo, Enhancement, Index};
pub use listener::DeclarationListener;
pub use location::{Encoding, Location, OffsetCache};
pub use reference::{Reference, ReferenceFinder, ReferenceTarget};
pub use uri::Uri;
