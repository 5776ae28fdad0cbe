//! # tagcache
//!
//! A small persistent cache of Ansible playbook tags keyed by repository path.
//!
//! Listing tags with `ansible-playbook --list-tags` is slow. The result only
//! changes when the repository does, so each entry remembers the HEAD commit it
//! was recorded at. An entry whose commit differs from the current HEAD is
//! stale and gets rediscovered.
//!
//! ## Example
//!
//! ```no_run
//! use tagcache::{TagCache, parse_list_tags};
//!
//! let mut cache = TagCache::open("/srv/git/sb/cache.json")?;
//! let head = "4f1c2e0";
//!
//! let lookup = cache.resolve("/srv/git/saltbox", head, || {
//!     parse_list_tags("TASK TAGS: [plex, sonarr]")
//! })?;
//! if !lookup.is_cached() {
//!     cache.flush()?;
//! }
//!
//! let unknown = cache.missing_tags("/srv/git/saltbox", ["plex", "radar"]);
//! assert!(unknown.contains("radar"));
//! # Ok::<(), tagcache::Error>(())
//! ```
//!
//! ## File format
//!
//! ```json
//! {"/srv/git/saltbox": {"commit": "4f1c2e0", "tags": ["plex", "sonarr"]}}
//! ```
//!
//! A missing file is an empty cache. A file that does not parse is an error;
//! it is never silently replaced.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types for tag cache operations.
pub mod error;
/// Parsing of ansible-playbook tag listings.
pub mod parse;
/// The file-backed cache store.
pub mod store;
/// Cache entry and lookup types.
pub mod types;

pub use error::{Error, Result};
pub use parse::parse_list_tags;
pub use store::TagCache;
pub use types::{CacheEntry, Lookup};
