use std::{fmt, marker::PhantomData, ptr::NonNull};

use tracing::trace;

/// Queue node, linked both ways.
struct Node<T> {
    prev: Link<T>,
    next: Link<T>,
    elem: T,
}

type Link<T> = Option<NonNull<Node<T>>>;

/// FIFO queue over doubly linked nodes.
///
/// Elements are added at the tail and polled from the head, both in O(1).
pub struct Queue<T> {
    head: Link<T>,
    tail: Link<T>,
    size: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> Node<T> {
    fn new(prev: Link<T>, elem: T) -> NonNull<Node<T>> {
        let node = Box::new(Node { prev, next: None, elem });
        NonNull::from(Box::leak(node))
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Queue {
            head: None,
            tail: None,
            size: 0,
            _marker: PhantomData,
        }
    }

    /// Builds a queue by adding `elems` in order.
    pub fn of<I: IntoIterator<Item = T>>(elems: I) -> Self {
        elems.into_iter().collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Appends `elem` at the tail.
    pub fn add(&mut self, elem: T) {
        let node = Node::new(self.tail, elem);

        match self.tail {
            // SAFETY: tail points at a live node owned by this queue.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.size += 1;

        trace!(size = self.size, "queue add");
    }

    /// Removes and returns the head element, or `None` if the queue is empty.
    pub fn poll(&mut self) -> Option<T> {
        self.head.map(|head| {
            // SAFETY: head was allocated by `Node::new` and is unlinked here
            // before the box is reclaimed.
            let node = unsafe { Box::from_raw(head.as_ptr()) };

            self.head = node.next;
            match self.head {
                // SAFETY: the new head is a live node owned by this queue.
                Some(next) => unsafe { (*next.as_ptr()).prev = None },
                None => self.tail = None,
            }
            self.size -= 1;

            trace!(size = self.size, "queue poll");
            node.elem
        })
    }

    /// Returns the head element without removing it.
    pub fn peek(&self) -> Option<&T> {
        // SAFETY: head is live for as long as `self` is borrowed.
        self.head.map(|head| unsafe { &(*head.as_ptr()).elem })
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.size,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        while self.poll().is_some() {}
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the iterator borrows the queue, so every node stays live.
        self.next.map(|node| unsafe {
            self.remaining -= 1;
            self.next = (*node.as_ptr()).next;
            &(*node.as_ptr()).elem
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.add(elem);
        }
    }
}

impl<T: Clone> Clone for Queue<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
