//! Core scalar types shared by both index variants.

/// A stable integer identifier for a directory entry. Fixed at 32 bits.
pub type Id = u32;

/// Reserved sentinel meaning "absent". Never a valid entry id.
pub const NOID: Id = 0;

/// Reserved for the backend root/suffix entry; no other entry may use
/// this id.
pub const ROOT_ID: Id = 1;

/// Denotes "no parent" in a hierarchical node's on-disk parent field.
pub const NO_PARENT: Id = 0;

/// One level of hierarchical enumeration versus the full subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    One,
    Subtree,
}
