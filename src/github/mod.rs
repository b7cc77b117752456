//! GitHub access: repository references, the REST/raw client and snapshot
//! fetching with the `main` to `master` branch fallback.

pub mod client;
pub mod fetcher;
pub mod reference;
pub mod snapshot;

pub use client::{GitHubClient, TreeEntry};
pub use fetcher::{RepositorySnapshotFetcher, is_eligible, select_paths};
pub use reference::RepositoryReference;
pub use snapshot::{FileSampleSet, SourceFileSample, truncate_chars};
