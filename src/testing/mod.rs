//! Seeded synthetic datasets for tests and benchmarks.

mod data;

pub use data::{interleaved_blobs, BlobSpec};
