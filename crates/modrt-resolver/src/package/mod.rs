// Package declarations and per-name records
//
// Entries are what modules declare; records aggregate every entry for one
// package name and track which export currently serves it.

mod entry;
mod record;

pub use entry::{Direction, EntryRef, ImportKind, PackageEntry};
pub use record::PackageRecord;
