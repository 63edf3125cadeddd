/// Errors returned by the linked structures.
///
/// Polling an empty [`Queue`](crate::Queue) and inserting a duplicate into a
/// [`BinarySearchTree`](crate::BinarySearchTree) are ordinary outcomes
/// (`None` / `false`), not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("pop from an empty stack")]
    EmptyStack,

    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("no such element: the list is empty")]
    NoSuchElement,
}

pub type Result<T> = std::result::Result<T, Error>;
