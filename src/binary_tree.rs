use std::{cmp::Ordering, fmt, marker::PhantomData, ptr, ptr::NonNull};

use tracing::trace;

/// Tree node.
struct Node<T> {
    left: Link<T>,
    right: Link<T>,
    elem: T,
}

/// Rusty pointers to nodes.
type Link<T> = Option<NonNull<Node<T>>>;

/// Unbalanced binary search tree.
///
/// Every element in a node's left subtree is less than the node's element and
/// every element in its right subtree is greater. Duplicates are never
/// stored. All walks use an explicit stack, so a degenerate tree costs heap,
/// not call stack.
pub struct BinarySearchTree<T> {
    root: Link<T>,
    size: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

/// Ascending in-order iterator. Holds at most one pending node per level.
pub struct Iter<'a, T> {
    stack: Vec<NonNull<Node<T>>>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> Node<T> {
    /// Create new leaf node.
    fn new(elem: T) -> NonNull<Node<T>> {
        let node = Box::new(Node {
            left: None,
            right: None,
            elem,
        });
        NonNull::from(Box::leak(node))
    }
}

impl<T: Ord> BinarySearchTree<T> {
    /// Builds a tree by inserting `elems` in order. Duplicates are dropped.
    pub fn of<I: IntoIterator<Item = T>>(elems: I) -> Self {
        elems.into_iter().collect()
    }

    /// Inserts `elem`, returning `false` and leaving the tree untouched if an
    /// equal element is already present.
    pub fn insert(&mut self, elem: T) -> bool {
        let mut slot: *mut Link<T> = &mut self.root;

        // SAFETY: `slot` always points at a link owned by this tree, either
        // the root or a child field of a live node.
        unsafe {
            while let Some(node) = *slot {
                let node = node.as_ptr();
                slot = match elem.cmp(&(*node).elem) {
                    Ordering::Less => ptr::addr_of_mut!((*node).left),
                    Ordering::Greater => ptr::addr_of_mut!((*node).right),
                    Ordering::Equal => {
                        trace!(size = self.size, "tree insert rejected duplicate");
                        return false;
                    }
                };
            }
            *slot = Some(Node::new(elem));
        }

        self.size += 1;
        trace!(size = self.size, "tree insert");
        true
    }

    /// Returns `true` if an element equal to `elem` is in the tree.
    pub fn contains(&self, elem: &T) -> bool {
        let mut current = self.root;

        while let Some(node) = current {
            // SAFETY: every link reachable from the root is a live node.
            let node = unsafe { &*node.as_ptr() };
            current = match elem.cmp(&node.elem) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return true,
            };
        }

        false
    }
}

impl<T> BinarySearchTree<T> {
    /// Creates a new tree with no elements.
    pub fn new() -> Self {
        BinarySearchTree {
            root: None,
            size: 0,
            _marker: PhantomData,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of edges on the longest path from the root to a leaf.
    ///
    /// Both an empty tree and a single node have depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(NonNull<Node<T>>, usize)> =
            self.root.map(|root| (root, 0)).into_iter().collect();

        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            // SAFETY: reachable links are live nodes.
            let node = unsafe { &*node.as_ptr() };
            for child in [node.left, node.right].into_iter().flatten() {
                pending.push((child, depth + 1));
            }
        }

        deepest
    }

    /// Calls `visitor` once for every element, in ascending order.
    pub fn in_order_traversal<F: FnMut(&T)>(&self, mut visitor: F) {
        for elem in self.iter() {
            visitor(elem);
        }
    }

    /// Lazily walks the tree in ascending order, starting from the root each
    /// time it is called.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.size,
            _marker: PhantomData,
        };
        iter.push_left(self.root);
        iter
    }
}

impl<T> Default for BinarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for BinarySearchTree<T> {
    fn drop(&mut self) {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.take().into_iter().collect();

        while let Some(node) = pending.pop() {
            // SAFETY: each node was allocated by `Node::new` and is reached
            // exactly once, through its single parent link.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            pending.extend(node.left);
            pending.extend(node.right);
        }
    }
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            // SAFETY: the iterator borrows the tree, so every node stays live.
            link = unsafe { (*node.as_ptr()).left };
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        // SAFETY: stacked nodes belong to the borrowed tree and outlive `'a`.
        unsafe {
            self.push_left((*node.as_ptr()).right);
            self.remaining -= 1;
            Some(&(*node.as_ptr()).elem)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BinarySearchTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> FromIterator<T> for BinarySearchTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BinarySearchTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for BinarySearchTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<T: Clone> Clone for BinarySearchTree<T> {
    /// Copies node by node, so the clone has the same shape.
    fn clone(&self) -> Self {
        let mut tree = BinarySearchTree::new();
        // Source node paired with the empty link its copy goes into.
        let mut pending: Vec<(NonNull<Node<T>>, *mut Link<T>)> = Vec::new();
        if let Some(root) = self.root {
            pending.push((root, ptr::addr_of_mut!(tree.root)));
        }

        while let Some((source, slot)) = pending.pop() {
            // SAFETY: `source` is a live node of `self`. `slot` is a link
            // inside `tree`, whose nodes stay put until it is returned.
            unsafe {
                let source = &*source.as_ptr();
                let copy = Node::new(source.elem.clone());
                *slot = Some(copy);
                if let Some(left) = source.left {
                    pending.push((left, ptr::addr_of_mut!((*copy.as_ptr()).left)));
                }
                if let Some(right) = source.right {
                    pending.push((right, ptr::addr_of_mut!((*copy.as_ptr()).right)));
                }
            }
        }

        tree.size = self.size;
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for BinarySearchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BinarySearchTree;
    use crate::test_support::init_tracing;

    fn tree_values() -> Vec<i32> {
        vec![40, 20, 60, 10, 30, 25, 35, 50, 45, 70, 80, 75]
    }

    /// Checks the ordering property on every node and that `size` matches the
    /// node count.
    fn assert_ordered<T: Ord>(tree: &BinarySearchTree<T>) {
        let elems: Vec<&T> = tree.iter().collect();
        assert_eq!(elems.len(), tree.size());
        assert!(elems.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_insert() {
        init_tracing();
        let numbers = tree_values();

        let mut tree = BinarySearchTree::new();

        assert!(tree.insert(numbers[0]));
        assert!(tree.contains(&numbers[0]));

        assert!(tree.insert(numbers[1]));
        assert!(tree.contains(&numbers[1]));

        assert!(tree.insert(numbers[2]));
        assert!(tree.contains(&numbers[2]));

        assert_eq!(tree.size(), 3);

        for n in &numbers[3..] {
            assert!(tree.insert(*n));
        }

        for n in &numbers {
            assert!(tree.contains(n));
        }

        assert_eq!(tree.size(), numbers.len());
        assert_ordered(&tree);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut tree = BinarySearchTree::of(tree_values());
        let size = tree.size();

        for n in tree_values() {
            assert!(!tree.insert(n));
        }
        assert_eq!(tree.size(), size);
        assert_ordered(&tree);

        let tree = BinarySearchTree::of([3, 3, 3]);
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn test_contains_missing() {
        let tree = BinarySearchTree::of(tree_values());

        for n in [0, 11, 41, 65, 100] {
            assert!(!tree.contains(&n));
        }
        assert!(!BinarySearchTree::<i32>::new().contains(&1));
    }

    #[test]
    fn test_depth() {
        assert_eq!(BinarySearchTree::<i32>::new().depth(), 0);
        assert_eq!(BinarySearchTree::of([5]).depth(), 0);
        assert_eq!(BinarySearchTree::of([5, 3]).depth(), 1);
        assert_eq!(BinarySearchTree::of([5, 3, 1]).depth(), 2);
        assert_eq!(BinarySearchTree::of([5, 3, 8]).depth(), 1);
        assert_eq!(BinarySearchTree::of(tree_values()).depth(), 4);
    }

    #[test]
    fn test_in_order_traversal() {
        let tree = BinarySearchTree::of([5, 3, 8, 1, 4]);

        let mut visited = Vec::new();
        tree.in_order_traversal(|e| visited.push(*e));
        assert_eq!(visited, [1, 3, 4, 5, 8]);

        let mut count = 0;
        BinarySearchTree::<i32>::new().in_order_traversal(|_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_iter() {
        let mut values = tree_values();

        let mut tree = BinarySearchTree::new();

        for value in values.iter() {
            tree.insert(*value);
        }

        let mut iter = tree.iter();
        assert_eq!(iter.len(), values.len());

        values.sort();

        for value in values.iter() {
            let tree_value = iter.next();
            assert!(tree_value.is_some());
            assert_eq!(value, tree_value.unwrap());
        }

        assert!(iter.next().is_none());

        // A fresh call starts over from the root.
        assert_eq!(tree.iter().next(), Some(&10));
        assert_eq!(tree.iter().count(), values.len());
    }

    #[test]
    fn test_clone_keeps_shape() {
        let tree = BinarySearchTree::of(tree_values());
        let mut copy = tree.clone();

        assert_eq!(copy.depth(), tree.depth());
        assert!(copy.insert(1));
        assert!(!tree.contains(&1));
        assert_eq!(copy.size(), tree.size() + 1);
        assert_eq!(format!("{:?}", BinarySearchTree::of([2, 1])), "{1, 2}");
    }

    #[test]
    fn test_degenerate_tree() {
        let tree: BinarySearchTree<u32> = (0..10_000).collect();

        assert_eq!(tree.size(), 10_000);
        assert_eq!(tree.depth(), 9_999);
        assert!(tree.contains(&9_999));
        assert_eq!(tree.iter().last(), Some(&9_999));

        let copy = tree.clone();
        assert_eq!(copy.size(), 10_000);
        assert_eq!(copy.depth(), 9_999);
        assert!(copy.iter().eq(tree.iter()));
        drop(tree);
        assert!(copy.contains(&0));
    }
}
