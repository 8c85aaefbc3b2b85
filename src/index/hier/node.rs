//! On-disk and in-memory node shapes for the hierarchical variant.

use crate::{err_at, types::Id, Result};

/// The on-disk value stored at key `id`: `parent:ID | rdn_len:u32 |
/// nrdn_len:u32 | rdn_bytes | NUL | nrdn_bytes | NUL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskNode {
    pub parent: Id,
    pub rdn: String,
    pub nrdn: String,
}

impl DiskNode {
    pub fn encode(&self) -> Vec<u8> {
        let rdn = self.rdn.as_bytes();
        let nrdn = self.nrdn.as_bytes();
        let mut out = Vec::with_capacity(4 + 4 + 4 + rdn.len() + 1 + nrdn.len() + 1);
        out.extend_from_slice(&self.parent.to_be_bytes());
        out.extend_from_slice(&(rdn.len() as u32).to_be_bytes());
        out.extend_from_slice(&(nrdn.len() as u32).to_be_bytes());
        out.extend_from_slice(rdn);
        out.push(0);
        out.extend_from_slice(nrdn);
        out.push(0);
        out
    }

    pub fn decode(buf: &[u8]) -> Result<DiskNode> {
        if buf.len() < 12 {
            return err_at!(Corrupt, msg: "diskNode too short: {} bytes", buf.len());
        }
        let parent = Id::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let rdn_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
        let nrdn_len = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;

        let want = 12 + rdn_len + 1 + nrdn_len + 1;
        if buf.len() != want {
            return err_at!(
                Corrupt,
                msg: "diskNode length mismatch: have {} want {}",
                buf.len(),
                want
            );
        }

        let rdn_start = 12;
        let rdn_end = rdn_start + rdn_len;
        let nrdn_start = rdn_end + 1;
        let nrdn_end = nrdn_start + nrdn_len;

        let rdn = err_at!(Corrupt, String::from_utf8(buf[rdn_start..rdn_end].to_vec()))?;
        let nrdn = err_at!(Corrupt, String::from_utf8(buf[nrdn_start..nrdn_end].to_vec()))?;

        Ok(DiskNode { parent, rdn, nrdn })
    }
}

/// In-memory counterpart of a [DiskNode], held in the [super::tree::Tree]
/// arena. `parent`/`kids` are arena slot indices rather than raw
/// pointers or back-references, which keeps the tree free of cycles and
/// lets a node move or be dropped without chasing pointers to fix up.
pub struct IdNode {
    pub id: Id,
    pub parent: Option<usize>,
    pub disk: DiskNode,
    /// Direct children, arena indices, kept sorted by `nrdn`. Guarded by
    /// its own lock, independent of the arena's lock, so sibling lookups
    /// under one parent don't contend with inserts elsewhere in the tree.
    pub kids: std::sync::RwLock<Vec<usize>>,
}

impl IdNode {
    pub fn new(id: Id, parent: Option<usize>, disk: DiskNode) -> IdNode {
        IdNode {
            id,
            parent,
            disk,
            kids: std::sync::RwLock::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
