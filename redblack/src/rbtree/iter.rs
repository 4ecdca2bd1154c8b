use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::{Node, NodeId};

// All four walks keep their pending work in an explicit stack or queue between calls to next(),
// so a deep tree never deepens the call stack.

/// The order in which a [`Traversal`] visits the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Left subtree, node, right subtree. Ascending order.
    In,
    /// Node, left subtree, right subtree.
    Pre,
    /// Left subtree, right subtree, node.
    Post,
    /// Breadth-first, one level at a time starting at the root.
    Level,
}

/// Iterator over the elements of a tree in ascending order.
///
/// Created by [`RbtreeGeneric::in_order`](crate::RbtreeGeneric::in_order).
pub struct InOrder<'a, T> {
    nodes: &'a [Node<T>],
    stack: Vec<NodeId>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> InOrder<'a, T> {
    pub(super) fn new(nodes: &'a [Node<T>], root: Option<NodeId>) -> Self {
        Self {
            nodes,
            stack: Vec::new(),
            current: root,
            remaining: nodes.len(),
        }
    }

    pub(super) fn next_id(&mut self) -> Option<NodeId> {
        while let Some(n) = self.current {
            self.stack.push(n);
            self.current = self.nodes[n.0].left;
        }

        let n = self.stack.pop()?;
        self.current = self.nodes[n.0].right;
        self.remaining -= 1;
        Some(n)
    }
}

/// Iterator visiting each node before its subtrees.
///
/// Created by [`RbtreeGeneric::pre_order`](crate::RbtreeGeneric::pre_order).
pub struct PreOrder<'a, T> {
    nodes: &'a [Node<T>],
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, T> PreOrder<'a, T> {
    pub(super) fn new(nodes: &'a [Node<T>], root: Option<NodeId>) -> Self {
        Self {
            nodes,
            stack: root.into_iter().collect(),
            remaining: nodes.len(),
        }
    }

    fn next_id(&mut self) -> Option<NodeId> {
        let n = self.stack.pop()?;
        let nb = &self.nodes[n.0];

        // Right goes in first so left comes out first.
        self.stack.extend(nb.right);
        self.stack.extend(nb.left);
        self.remaining -= 1;
        Some(n)
    }
}

/// Iterator visiting each node after both of its subtrees.
///
/// Created by [`RbtreeGeneric::post_order`](crate::RbtreeGeneric::post_order).
pub struct PostOrder<'a, T> {
    nodes: &'a [Node<T>],
    // The flag is set once the node's children have been pushed above it.
    stack: Vec<(NodeId, bool)>,
    remaining: usize,
}

impl<'a, T> PostOrder<'a, T> {
    pub(super) fn new(nodes: &'a [Node<T>], root: Option<NodeId>) -> Self {
        Self {
            nodes,
            stack: root.into_iter().map(|r| (r, false)).collect(),
            remaining: nodes.len(),
        }
    }

    fn next_id(&mut self) -> Option<NodeId> {
        loop {
            let (n, expanded) = self.stack.last_mut()?;
            let n = *n;

            if *expanded {
                self.stack.pop();
                self.remaining -= 1;
                return Some(n);
            }

            *expanded = true;
            let nb = &self.nodes[n.0];
            self.stack.extend(nb.right.map(|r| (r, false)));
            self.stack.extend(nb.left.map(|l| (l, false)));
        }
    }
}

/// Iterator visiting the tree breadth-first.
///
/// Created by [`RbtreeGeneric::level_order`](crate::RbtreeGeneric::level_order).
pub struct LevelOrder<'a, T> {
    nodes: &'a [Node<T>],
    queue: VecDeque<NodeId>,
    remaining: usize,
}

impl<'a, T> LevelOrder<'a, T> {
    pub(super) fn new(nodes: &'a [Node<T>], root: Option<NodeId>) -> Self {
        Self {
            nodes,
            queue: root.into_iter().collect(),
            remaining: nodes.len(),
        }
    }

    fn next_id(&mut self) -> Option<NodeId> {
        let n = self.queue.pop_front()?;
        let nb = &self.nodes[n.0];

        self.queue.extend(nb.left);
        self.queue.extend(nb.right);
        self.remaining -= 1;
        Some(n)
    }
}

macro_rules! node_iterator {
    ($name:ident) => {
        impl<'a, T> Iterator for $name<'a, T> {
            type Item = &'a T;

            fn next(&mut self) -> Option<Self::Item> {
                let nodes = self.nodes;
                self.next_id().map(|n| &nodes[n.0].item)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.remaining, Some(self.remaining))
            }
        }

        impl<T> ExactSizeIterator for $name<'_, T> {}

        impl<T> FusedIterator for $name<'_, T> {}
    };
}

node_iterator!(InOrder);
node_iterator!(PreOrder);
node_iterator!(PostOrder);
node_iterator!(LevelOrder);

/// A traversal whose [`Order`] is picked at runtime.
///
/// Created by [`RbtreeGeneric::traverse`](crate::RbtreeGeneric::traverse).
pub enum Traversal<'a, T> {
    /// See [`InOrder`].
    In(InOrder<'a, T>),
    /// See [`PreOrder`].
    Pre(PreOrder<'a, T>),
    /// See [`PostOrder`].
    Post(PostOrder<'a, T>),
    /// See [`LevelOrder`].
    Level(LevelOrder<'a, T>),
}

impl<'a, T> Iterator for Traversal<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::In(it) => it.next(),
            Self::Pre(it) => it.next(),
            Self::Post(it) => it.next(),
            Self::Level(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::In(it) => it.size_hint(),
            Self::Pre(it) => it.size_hint(),
            Self::Post(it) => it.size_hint(),
            Self::Level(it) => it.size_hint(),
        }
    }
}

impl<T> ExactSizeIterator for Traversal<'_, T> {}

impl<T> FusedIterator for Traversal<'_, T> {}

#[cfg(test)]
mod tests {
    use super::Order;
    use crate::Rbtree;

    fn tree(items: &[u32]) -> Rbtree<u32> {
        let mut rb = Rbtree::default();
        for &i in items {
            assert!(rb.insert(i).is_ok());
        }
        rb
    }

    fn walk(rb: &Rbtree<u32>, order: Order) -> Vec<u32> {
        rb.traverse(order).copied().collect()
    }

    #[test]
    fn three_nodes() {
        let rb = tree(&[10, 5, 15]);

        assert_eq!(rb.in_order().copied().collect::<Vec<_>>(), [5, 10, 15]);
        assert_eq!(rb.pre_order().copied().collect::<Vec<_>>(), [10, 5, 15]);
        assert_eq!(rb.post_order().copied().collect::<Vec<_>>(), [5, 15, 10]);
        assert_eq!(rb.level_order().copied().collect::<Vec<_>>(), [10, 5, 15]);
    }

    #[test]
    fn seven_nodes() {
        // (5 (2 (1) (3)) (7 (6) (8)))
        let rb = tree(&[5, 2, 7, 1, 3, 6, 8]);

        assert_eq!(walk(&rb, Order::In), [1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(walk(&rb, Order::Pre), [5, 2, 1, 3, 7, 6, 8]);
        assert_eq!(walk(&rb, Order::Post), [1, 3, 2, 6, 8, 7, 5]);
        assert_eq!(walk(&rb, Order::Level), [5, 2, 7, 1, 3, 6, 8]);
    }

    #[test]
    fn lopsided() {
        // (2 (1) (4 (3) (5 () (6))))
        let rb = tree(&[1, 2, 3, 4, 5, 6]);

        assert_eq!(walk(&rb, Order::In), [1, 2, 3, 4, 5, 6]);
        assert_eq!(walk(&rb, Order::Pre), [2, 1, 4, 3, 5, 6]);
        assert_eq!(walk(&rb, Order::Post), [1, 3, 6, 5, 4, 2]);
        assert_eq!(walk(&rb, Order::Level), [2, 1, 4, 3, 5, 6]);
    }

    #[test]
    fn empty() {
        let rb = Rbtree::<u32>::default();

        for order in [Order::In, Order::Pre, Order::Post, Order::Level] {
            let mut it = rb.traverse(order);
            assert_eq!(it.len(), 0);
            assert_eq!(it.next(), None);
            assert_eq!(it.next(), None);
        }
    }

    #[test]
    fn exact_size_and_fused() {
        let rb: Rbtree<u32> = (0..100).collect();

        for order in [Order::In, Order::Pre, Order::Post, Order::Level] {
            let mut it = rb.traverse(order);
            assert_eq!(it.len(), 100);
            it.next();
            it.next();
            assert_eq!(it.len(), 98);

            let mut rest: Vec<u32> = it.by_ref().copied().collect();
            assert_eq!(rest.len(), 98);
            assert_eq!(it.next(), None);

            // Every walk visits each element exactly once.
            rest.sort_unstable();
            rest.dedup();
            assert_eq!(rest.len(), 98);
        }
    }

    #[test]
    fn into_iterator() {
        let rb: Rbtree<u32> = [3, 1, 2].into_iter().collect();
        let mut seen = Vec::new();
        for i in &rb {
            seen.push(*i);
        }
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn deep_tree() {
        let rb: Rbtree<u32> = (0..100_000).collect();

        assert!(rb.in_order().copied().eq(0..100_000u32));
        assert_eq!(rb.pre_order().count(), 100_000);
        assert_eq!(rb.post_order().count(), 100_000);
        assert_eq!(rb.level_order().count(), 100_000);
        assert_eq!(rb.post_order().last(), rb.level_order().next());
    }
}
