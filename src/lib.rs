//! A DN↔ID index for a directory-service backend: the subsystem that
//! maps a Distinguished Name to its assigned entry ID, in both
//! directions and at every granularity an LDAP-shaped backend asks for
//! — exact lookup, longest-prefix "matched DN" fallback, one-level and
//! full-subtree enumeration.
//!
//! Two interchangeable implementations live side by side, chosen at
//! configuration time:
//!
//! - [index::flat::FlatIndex] keys a single KV table directly off the
//!   normalized DN string, with one key prefix per logical sub-table
//!   (`BASE`, `ONE`, `SUBTREE`).
//! - [index::hier::HierIndex] keys the same relation off the integer
//!   ID instead and reconstructs an in-memory tree at startup, trading
//!   a build pass for O(depth) traversal in place of a DN-prefix scan.
//!
//! Both implement the same [index::DnIndex] capability set and are
//! generic over the [store::Store] they run against, so the same index
//! logic exercises an in-memory [store::MemStore] in tests and a
//! file-backed `LmdbStore` in production.

pub mod config;
pub mod dn;
mod error;
pub mod idl;
pub mod index;
pub mod store;
pub mod types;

pub use crate::config::{Config, Variant};
pub use crate::dn::Dn;
pub use crate::error::{Error, Result};
pub use crate::idl::Idl;
pub use crate::index::{flat::FlatIndex, hier::HierIndex, DnIndex, Matched, NewEntry};
#[cfg(feature = "lmdb-backend")]
pub use crate::store::LmdbStore;
pub use crate::store::{MemStore, Store};
pub use crate::types::{Id, Prefix, NOID, NO_PARENT, ROOT_ID};
