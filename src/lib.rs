pub mod binary_tree;
pub mod error;
pub mod list;
pub mod queue;
pub mod stack;

pub use binary_tree::BinarySearchTree;
pub use error::{Error, Result};
pub use list::LinkedList;
pub use queue::Queue;
pub use stack::Stack;
