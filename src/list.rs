use std::{fmt, marker::PhantomData, mem, ptr::NonNull};

use tracing::{debug, trace};

use crate::error::{Error, Result};

struct Node<T> {
    elem: T,
    next: Link<T>,
}

type Link<T> = Option<NonNull<Node<T>>>;

impl<T> Node<T> {
    fn new(elem: T, next: Link<T>) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node { elem, next })))
    }
}

/// Positional list over singly linked nodes.
///
/// The list owns every node reachable from `head`. `tail` is a second access
/// point to the last node so appends are O(1); both are `None` exactly when
/// the list is empty.
pub struct LinkedList<T> {
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

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        LinkedList {
            head: None,
            tail: None,
            size: 0,
            _marker: PhantomData,
        }
    }

    /// Builds a list by appending `elems` in order.
    pub fn of<I: IntoIterator<Item = T>>(elems: I) -> Self {
        elems.into_iter().collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Appends `elem` at the end of the list in O(1).
    pub fn add(&mut self, elem: T) {
        let node = Node::new(elem, None);

        match self.tail {
            // SAFETY: tail points at a live node owned by this list.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);

        self.size += 1;
        trace!(size = self.size, "list add");
    }

    /// Inserts `elem` before position `index`.
    ///
    /// `index == size` appends. Anything past that is
    /// [`Error::IndexOutOfBounds`].
    pub fn insert(&mut self, index: usize, elem: T) -> Result<()> {
        if index == self.size {
            self.add(elem);
            return Ok(());
        }

        let (prev, current) = self.locate(index)?;
        let node = Node::new(elem, Some(current));
        match prev {
            // SAFETY: `prev` came from walking this list's live chain.
            Some(prev) => unsafe { (*prev.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }

        self.size += 1;
        trace!(index, size = self.size, "list insert");
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        let (_, node) = self.locate(index)?;
        // SAFETY: the node is live for as long as `self` is borrowed.
        Ok(unsafe { &(*node.as_ptr()).elem })
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, elem: T) -> Result<T> {
        let (_, node) = self.locate(index)?;
        // SAFETY: `&mut self` guarantees no outstanding element borrows.
        Ok(unsafe { mem::replace(&mut (*node.as_ptr()).elem, elem) })
    }

    pub fn get_first(&self) -> Result<&T> {
        self.head
            // SAFETY: head is live for as long as `self` is borrowed.
            .map(|head| unsafe { &(*head.as_ptr()).elem })
            .ok_or(Error::NoSuchElement)
    }

    pub fn get_last(&self) -> Result<&T> {
        self.tail
            // SAFETY: tail is the last live node of the chain.
            .map(|tail| unsafe { &(*tail.as_ptr()).elem })
            .ok_or(Error::NoSuchElement)
    }

    /// Unlinks the node at `index` and returns its element.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        let (prev, node) = self.locate(index)?;

        // SAFETY: `node` is live and owned by this list; it is unlinked from
        // its predecessor before the box is reclaimed.
        let node = unsafe { Box::from_raw(node.as_ptr()) };
        match prev {
            Some(prev) => unsafe { (*prev.as_ptr()).next = node.next },
            None => self.head = node.next,
        }
        // Only moves when the removed node was the tail.
        if node.next.is_none() {
            self.tail = prev;
        }

        self.size -= 1;
        trace!(index, size = self.size, "list remove");
        Ok(node.elem)
    }

    /// Reverses the list in place by relinking the existing nodes.
    pub fn reverse(&mut self) {
        if self.size < 2 {
            return;
        }

        let mut reversed = None;
        let mut current = self.head;
        while let Some(node) = current {
            // SAFETY: every node reached from head is live; each `next` is
            // read before it is overwritten.
            unsafe {
                current = (*node.as_ptr()).next;
                (*node.as_ptr()).next = reversed;
            }
            reversed = Some(node);
        }

        self.tail = self.head;
        self.head = reversed;
        trace!(size = self.size, "list reverse");
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        let mut current = self.head.take();
        while let Some(node) = current {
            // SAFETY: each node was allocated by `Node::new` and is freed
            // once, after its successor has been read.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            current = node.next;
        }
        self.tail = None;
        self.size = 0;
        trace!("list clear");
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.size,
            _marker: PhantomData,
        }
    }

    /// Finds the node at `index` together with its predecessor.
    fn locate(&self, index: usize) -> Result<(Link<T>, NonNull<Node<T>>)> {
        if index < self.size {
            let mut prev = None;
            let mut current = self.head;
            for _ in 0..index {
                prev = current;
                // SAFETY: `index < size`, so every step lands on a live node.
                current = current.and_then(|node| unsafe { (*node.as_ptr()).next });
            }
            if let Some(node) = current {
                return Ok((prev, node));
            }
        }

        debug!(index, size = self.size, "list index out of bounds");
        Err(Error::IndexOutOfBounds {
            index,
            size: self.size,
        })
    }
}

impl<T: PartialEq> LinkedList<T> {
    /// Linear scan by equality.
    pub fn contains(&self, elem: &T) -> bool {
        self.iter().any(|e| e == elem)
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LinkedList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the iterator borrows the list, so every node stays live.
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

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.add(elem);
        }
    }
}

impl<T: Clone> Clone for LinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for LinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
