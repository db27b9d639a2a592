use blobsas_core::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Permissions granted by a blob SAS.
///
/// Rendered in the order the service expects: `racwdxytmei`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobSasPermissions {
    /// Read the content, properties and metadata (`r`).
    pub read: bool,
    /// Add a block to an append blob (`a`).
    pub add: bool,
    /// Write a new blob (`c`).
    pub create: bool,
    /// Create or overwrite the content, properties and metadata (`w`).
    pub write: bool,
    /// Delete the blob (`d`).
    pub delete: bool,
    /// Delete a blob version (`x`).
    pub delete_previous_version: bool,
    /// Permanently delete a soft deleted snapshot or version (`y`).
    pub permanent_delete: bool,
    /// Read or write blob index tags (`t`).
    pub tag: bool,
    /// Move the blob, only for accounts with a hierarchical namespace (`m`).
    pub move_blob: bool,
    /// Execute, only for accounts with a hierarchical namespace (`e`).
    pub execute: bool,
    /// Set or delete the immutability policy or legal hold (`i`).
    pub set_immutability_policy: bool,
}

impl BlobSasPermissions {
    /// Read only access, the only permission the quickstart hands out.
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    /// Returns true if no permission is granted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn flags(&self) -> [(char, bool); 11] {
        [
            ('r', self.read),
            ('a', self.add),
            ('c', self.create),
            ('w', self.write),
            ('d', self.delete),
            ('x', self.delete_previous_version),
            ('y', self.permanent_delete),
            ('t', self.tag),
            ('m', self.move_blob),
            ('e', self.execute),
            ('i', self.set_immutability_policy),
        ]
    }
}

impl Display for BlobSasPermissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (c, set) in self.flags() {
            if set {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for BlobSasPermissions {
    type Err = Error;

    /// Parse permissions from letters in any order, like `wr`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            let flag = match c {
                'r' => &mut p.read,
                'a' => &mut p.add,
                'c' => &mut p.create,
                'w' => &mut p.write,
                'd' => &mut p.delete,
                'x' => &mut p.delete_previous_version,
                'y' => &mut p.permanent_delete,
                't' => &mut p.tag,
                'm' => &mut p.move_blob,
                'e' => &mut p.execute,
                'i' => &mut p.set_immutability_policy,
                _ => {
                    return Err(Error::request_invalid(format!(
                        "invalid blob sas permission '{c}' in '{s}'"
                    )))
                }
            };
            *flag = true;
        }
        Ok(p)
    }
}
