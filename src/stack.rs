use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};

struct Node<T> {
    elem: T,
    next: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(elem: T, next: Option<Box<Self>>) -> Self {
        Node { elem, next }
    }
}

/// LIFO stack over singly linked nodes. The head is the top.
pub struct Stack<T> {
    head: Option<Box<Node<T>>>,
    size: usize,
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Stack { head: None, size: 0 }
    }

    /// Builds a stack by pushing `elems` in order, so the last one ends up on
    /// top.
    pub fn of<I: IntoIterator<Item = T>>(elems: I) -> Self {
        elems.into_iter().collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn push(&mut self, elem: T) {
        let node = Box::new(Node::new(elem, self.head.take()));
        self.head = Some(node);
        self.size += 1;

        trace!(size = self.size, "stack push");
    }

    /// Removes the top element and returns it.
    ///
    /// Fails with [`Error::EmptyStack`] when there is nothing to pop.
    pub fn pop(&mut self) -> Result<T> {
        let head = self.head.take().ok_or(Error::EmptyStack)?;
        self.head = head.next;
        self.size -= 1;

        trace!(size = self.size, "stack pop");
        Ok(head.elem)
    }

    /// Returns the top element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.elem)
    }

    /// Iterates from the top of the stack to the bottom.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { next: self.head.as_deref() }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        // Unlink one node at a time, the default drop would recurse.
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.elem
        })
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut stack = Stack::new();
        stack.extend(iter);
        stack
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.push(elem);
        }
    }
}

impl<T: Clone> Clone for Stack<T> {
    fn clone(&self) -> Self {
        // Pushing the reversed top-to-bottom order keeps the same top.
        let elems: Vec<&T> = self.iter().collect();
        elems.into_iter().rev().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
