//! Hierarchical sort keys.
//!
//! Every counted item carries an [`Order`] that encodes where it sits in the
//! tree of command-line arguments, directory listings and archive members.
//! Sorting results by order reproduces the input layout no matter which task
//! finished first.

use std::cmp::Ordering;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::Arc;

/// Index path such as `2.0.3`, stored as a leaf with a shared parent chain.
#[derive(Clone, Debug)]
pub struct Order {
    index: usize,
    parent: Option<Arc<Order>>,
}

impl Order {
    /// First top-level position, index 0.
    pub const fn root() -> Self {
        Self {
            index: 0,
            parent: None,
        }
    }

    pub const fn with_index(index: usize) -> Self {
        Self {
            index,
            parent: None,
        }
    }

    /// First child of this position.
    pub fn sub(&self) -> Self {
        Self {
            index: 0,
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Next sibling; the parent chain is shared, not copied.
    pub fn next(&self) -> Self {
        Self {
            index: self.index + 1,
            parent: self.parent.clone(),
        }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<&Order> {
        self.parent.as_deref()
    }

    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut cursor = self.parent();
        while let Some(order) = cursor {
            depth += 1;
            cursor = order.parent();
        }
        depth
    }

    /// Indices from the outermost level down to this one.
    pub fn path(&self) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.depth());
        let mut cursor = Some(self);
        while let Some(order) = cursor {
            path.push(order.index);
            cursor = order.parent();
        }
        path.reverse();
        path
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::root()
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Order {}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    // Slice ordering is lexicographic with a strict prefix sorting first,
    // which is exactly 1.2 < 1.2.1 < 1.3.
    fn cmp(&self, other: &Self) -> Ordering {
        self.path().cmp(&other.path())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}.")?;
        }
        write!(f, "{}", self.index)
    }
}

impl FromStr for Order {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut order: Option<Order> = None;
        for part in s.split('.') {
            let index = part.trim().parse::<usize>()?;
            order = Some(match order {
                None => Order::with_index(index),
                Some(parent) => Order {
                    index,
                    parent: Some(Arc::new(parent)),
                },
            });
        }
        // split always yields at least one part, and an empty part fails to parse
        Ok(order.unwrap_or_default())
    }
}
