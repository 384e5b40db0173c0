//! Newtype IDs for the source schema and the target class index.
//!
//! Image ids are the join key between images, label groups, partitions and
//! output file names, so they stay typed all the way to the writer instead of
//! being formatted into strings for lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! source_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self::new(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

source_id!(
    /// Identifier of a source image; also the base name of its output files.
    ImageId
);
source_id!(
    /// Identifier of a source annotation.
    AnnotationId
);
source_id!(
    /// Identifier of a source category (1-based in well-formed input).
    CategoryId
);

/// Zero-based YOLO class index.
///
/// Signed so that [`ClassId::UNKNOWN`] can mark annotations whose category
/// is missing from the category list.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub i64);

impl ClassId {
    /// Sentinel for an unresolved category.
    pub const UNKNOWN: ClassId = ClassId(-1);

    /// The class index for a source category: `category_id - 1`.
    ///
    /// Returns `None` for id 0 (which would collide with [`ClassId::UNKNOWN`])
    /// and for ids that do not fit in an `i64`.
    #[inline]
    pub fn from_category(id: CategoryId) -> Option<Self> {
        let id = i64::try_from(id.as_u64()).ok()?;
        match id.checked_sub(1)? {
            -1 => None,
            index => Some(Self(index)),
        }
    }

    #[inline]
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
