// file: src/writeexts/mod.rs
// version: 1.0.0
// guid: 5011a4cb-e1d2-43b8-8e98-a9cd0e4414c8

//! Helpers for write extensions that persist deployment records

pub mod records;
pub mod validators;

pub use records::{sorted_records, write_from_dict, OwnershipPolicy, RecordWriter};
pub use validators::{AcceptAll, AllOf, DigitsOnly, MatchesPattern, NoNewline, NonEmpty, RecordValidator};
