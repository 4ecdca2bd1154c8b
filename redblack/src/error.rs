use std::fmt::{self, Debug, Display};

/// Returned by [`insert`](crate::RbtreeGeneric::insert) when an element comparing equal is
/// already stored.
///
/// The rejected element is handed back unchanged. The element already in the tree is not
/// modified.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DuplicateKey<T>(pub T);

impl<T> DuplicateKey<T> {
    /// Returns the element that was not inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Hand-written so the error is usable for any T, not only T: Debug.
impl<T> Debug for DuplicateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateKey").finish_non_exhaustive()
    }
}

impl<T> Display for DuplicateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item already exists in tree.")
    }
}

impl<T> std::error::Error for DuplicateKey<T> {}

/// Returned by [`delete`](crate::RbtreeGeneric::delete) when no stored element compares equal
/// to the requested one. The tree is left unchanged.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NotFound;

impl Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item not found in tree.")
    }
}

impl std::error::Error for NotFound {}
