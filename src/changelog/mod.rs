//! Per-package changelog files
//!
//! A changelog is a title, one metadata record in an HTML comment, and a
//! list of entries, newest first. [ChangelogDocument] is the parse/render
//! pair for the whole file and [ChangelogWriter] does merge-or-create
//! writes against it.

pub mod document;
pub mod entry;
pub mod metadata;
pub mod writer;

pub use document::{ChangelogDocument, EntryBlock};
pub use entry::{ChangelogEntry, EntrySection, Section};
pub use metadata::ChangelogMetadata;
pub use writer::ChangelogWriter;
