use std::fmt::Debug;

/// Width in bytes of the default [`Value`] payload.
pub const VALUE_SIZE: usize = 10;

/// The default fixed-width opaque payload stored alongside each key.
pub type Value = [u8; VALUE_SIZE];

/// A trait for types that can be stored as values in the index.
///
/// Values are fixed-width plain-old-data. Anything implementing [`bytemuck::Pod`] qualifies, which
/// is what lets the tree account for each node's byte size without knowing the concrete type.
pub trait StorableValue: bytemuck::Pod + Debug {
    /// The number of bytes per value
    const BYTES_PER_ELEMENT: usize = std::mem::size_of::<Self>();
}

impl<T: bytemuck::Pod + Debug> StorableValue for T {}

/// A single coordinate of a key.
///
/// Stored keys are always made of [`Coordinate::Specified`] values. [`Coordinate::Unspecified`]
/// only appears in query keys, where it acts as a wildcard for that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Coordinate {
    Specified(u64),
    #[default]
    Unspecified,
}

impl Coordinate {
    /// Returns the concrete value of this coordinate, if any.
    #[inline]
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Specified(v) => Some(*v),
            Self::Unspecified => None,
        }
    }

    #[inline]
    pub fn is_specified(&self) -> bool {
        matches!(self, Self::Specified(_))
    }
}

impl From<u64> for Coordinate {
    fn from(value: u64) -> Self {
        Self::Specified(value)
    }
}

impl From<Option<u64>> for Coordinate {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(v) => Self::Specified(v),
            None => Self::Unspecified,
        }
    }
}
