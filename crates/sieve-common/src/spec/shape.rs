use std::fmt;

use serde::{Deserialize, Serialize};

/// A tensor shape that may be only partially known.
///
/// `dims == None` means the rank itself is unknown.
/// Within a known rank, a `None` dimension is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartialShape {
    dims: Option<Vec<Option<u64>>>,
}

impl PartialShape {
    pub fn new(dims: Vec<Option<u64>>) -> Self {
        Self { dims: Some(dims) }
    }

    pub fn scalar() -> Self {
        Self::new(vec![])
    }

    pub fn unknown() -> Self {
        Self { dims: None }
    }

    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(|d| d.len())
    }

    pub fn dims(&self) -> Option<&[Option<u64>]> {
        self.dims.as_deref()
    }

    pub fn is_fully_defined(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|d| d.iter().all(|x| x.is_some()))
    }

    /// Two shapes are compatible if some fully defined shape could match both.
    pub fn is_compatible_with(&self, other: &PartialShape) -> bool {
        match (&self.dims, &other.dims) {
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| match (x, y) {
                        (Some(x), Some(y)) => x == y,
                        _ => true,
                    })
            }
            _ => true,
        }
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dims) = &self.dims else {
            return write!(f, "<unknown>");
        };
        write!(f, "[")?;
        for (i, dim) in dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "?")?,
            }
        }
        write!(f, "]")
    }
}
