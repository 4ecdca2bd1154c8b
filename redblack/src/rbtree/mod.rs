use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::mem::swap;

use log::{debug, trace};

use crate::error::{DuplicateKey, NotFound};

mod iter;

pub use iter::{InOrder, LevelOrder, Order, PostOrder, PreOrder, Traversal};

// Nodes live in a dense arena and refer to each other by index. The left/right links are the
// owning relation; parent links are back-references used only while walking up during fixups.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

struct Node<T> {
    item: T,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// An ordered set of elements kept in a red-black tree, ordered by the comparator `C`.
///
/// The comparator must define a strict total order over the elements for the lifetime of the
/// tree. It is a logic error for an element to be mutated in a way that changes how it compares.
///
/// See [`Rbtree`] for the common case of ordering by [`Ord`].
pub struct RbtreeGeneric<T, C> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
    size: usize,
    compare: C,
}

/// Type alias for [`RbtreeGeneric`] ordered by the elements' [`Ord`] implementation.
pub type Rbtree<T> = RbtreeGeneric<T, fn(&T, &T) -> Ordering>;

impl<T: Ord> Default for Rbtree<T> {
    fn default() -> Self {
        Self::new(T::cmp)
    }
}

impl<T: Debug, C> Debug for RbtreeGeneric<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.in_order()).finish()
    }
}

impl<T: Ord> FromIterator<T> for Rbtree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T, C> Extend<T> for RbtreeGeneric<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    // Elements equal to one already stored are dropped, the stored one is kept.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            let _ = self.insert(item);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a RbtreeGeneric<T, C> {
    type IntoIter = InOrder<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}

// Structural helpers. None of these consult the comparator.
//
// c - current
// p - parent
// g - grandparent
// s - sibling
// u - uncle
impl<T, C> RbtreeGeneric<T, C> {
    #[inline]
    fn node(&self, n: NodeId) -> &Node<T> {
        &self.nodes[n.0]
    }

    #[inline]
    fn node_mut(&mut self, n: NodeId) -> &mut Node<T> {
        &mut self.nodes[n.0]
    }

    // Absent children are leaves, and leaves are black.
    #[inline]
    fn is_red(&self, n: Option<NodeId>) -> bool {
        n.is_some_and(|n| self.node(n).color == Color::Red)
    }

    #[inline]
    fn set_color(&mut self, n: NodeId, color: Color) {
        self.node_mut(n).color = color;
    }

    fn is_left_child(&self, n: NodeId) -> bool {
        match self.node(n).parent {
            Some(p) => self.node(p).left == Some(n),
            None => false,
        }
    }

    fn sibling(&self, n: NodeId) -> Option<NodeId> {
        let p = self.node(n).parent?;
        let pb = self.node(p);
        if pb.left == Some(n) { pb.right } else { pb.left }
    }

    fn grandparent(&self, n: NodeId) -> Option<NodeId> {
        self.node(self.node(n).parent?).parent
    }

    fn uncle(&self, n: NodeId) -> Option<NodeId> {
        self.sibling(self.node(n).parent?)
    }

    fn find_min(&self, mut n: NodeId) -> NodeId {
        while let Some(l) = self.node(n).left {
            n = l;
        }
        n
    }

    fn find_max(&self, mut n: NodeId) -> NodeId {
        while let Some(r) = self.node(n).right {
            n = r;
        }
        n
    }

    // Puts `new` where `old` hangs from its parent, or at the root. `old` keeps its stale parent
    // link, callers either re-point it or discard the node.
    fn replace_subtree(&mut self, old: NodeId, new: Option<NodeId>) {
        let p = self.node(old).parent;
        match p {
            None => self.root = new,
            Some(p) => {
                let pb = self.node_mut(p);
                if pb.left == Some(old) {
                    pb.left = new;
                } else {
                    pb.right = new;
                }
            }
        }

        if let Some(new) = new {
            self.node_mut(new).parent = p;
        }
    }

    fn rotate_left(&mut self, n: NodeId) {
        // Right child becomes the new parent
        let r = self.node(n).right.expect("Tried to make None child into parent");
        self.replace_subtree(n, Some(r));

        let inner = self.node(r).left;
        self.node_mut(n).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(n);
        }

        self.node_mut(r).left = Some(n);
        self.node_mut(n).parent = Some(r);
    }

    fn rotate_right(&mut self, n: NodeId) {
        // Left child becomes the new parent
        let l = self.node(n).left.expect("Tried to make None child into parent");
        self.replace_subtree(n, Some(l));

        let inner = self.node(l).right;
        self.node_mut(n).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(n);
        }

        self.node_mut(l).right = Some(n);
        self.node_mut(n).parent = Some(l);
    }

    fn swap_items(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        swap(&mut head[lo].item, &mut tail[0].item);
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    // Frees a node that has already been spliced out of the tree. The last node in the arena is
    // moved into the freed slot, so every link pointing at it is re-pointed first.
    fn release(&mut self, n: NodeId) -> T {
        let last = NodeId(self.nodes.len() - 1);

        if n != last {
            let lb = self.node(last);
            let (parent, left, right) = (lb.parent, lb.left, lb.right);

            match parent {
                None => self.root = Some(n),
                Some(p) => {
                    let pb = self.node_mut(p);
                    if pb.left == Some(last) {
                        pb.left = Some(n);
                    } else {
                        pb.right = Some(n);
                    }
                }
            }

            for child in [left, right].into_iter().flatten() {
                self.node_mut(child).parent = Some(n);
            }
        }

        self.nodes.swap_remove(n.0).item
    }

    /// Returns the number of elements in the tree.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of nodes on the longest path from the root down to a leaf, or 0 for an
    /// empty tree.
    ///
    /// For `n` elements this never exceeds `2 * log2(n + 1)`.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<NodeId> = self.root.into_iter().collect();

        while !level.is_empty() {
            height += 1;
            level = level
                .into_iter()
                .flat_map(|n| {
                    let nb = self.node(n);
                    [nb.left, nb.right]
                })
                .flatten()
                .collect();
        }

        height
    }

    /// Returns the smallest element, or `None` if the tree is empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.root.map(|root| &self.node(self.find_min(root)).item)
    }

    /// Returns the largest element, or `None` if the tree is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.root.map(|root| &self.node(self.find_max(root)).item)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.size = 0;
    }

    /// Visits the left subtree, then the node, then the right subtree. Elements come out in
    /// ascending order.
    pub fn in_order(&self) -> InOrder<'_, T> {
        InOrder::new(&self.nodes, self.root)
    }

    /// Visits the node, then its left subtree, then its right subtree.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder::new(&self.nodes, self.root)
    }

    /// Visits the left subtree, then the right subtree, then the node.
    pub fn post_order(&self) -> PostOrder<'_, T> {
        PostOrder::new(&self.nodes, self.root)
    }

    /// Visits the tree breadth-first, one level at a time from the root.
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(&self.nodes, self.root)
    }

    /// Returns a traversal in the given order, for when the order is only known at runtime.
    pub fn traverse(&self, order: Order) -> Traversal<'_, T> {
        match order {
            Order::In => Traversal::In(self.in_order()),
            Order::Pre => Traversal::Pre(self.pre_order()),
            Order::Post => Traversal::Post(self.post_order()),
            Order::Level => Traversal::Level(self.level_order()),
        }
    }

    /// Consumes the tree and returns all of its elements in ascending order.
    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        let mut rank = vec![0; self.nodes.len()];

        let mut walk = self.in_order();
        let mut pos = 0;
        while let Some(n) = walk.next_id() {
            rank[n.0] = pos;
            pos += 1;
        }

        let mut out: Vec<Option<T>> = self.nodes.iter().map(|_| None).collect();
        for (node, r) in self.nodes.into_iter().zip(rank) {
            out[r] = Some(node.item);
        }

        out.into_iter().flatten().collect()
    }
}

impl<T, C> RbtreeGeneric<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty tree ordered by `compare`.
    ///
    /// `compare` must define a strict total order for as long as the tree lives.
    #[must_use]
    pub const fn new(compare: C) -> Self {
        Self { nodes: Vec::new(), root: None, size: 0, compare }
    }

    fn find_node(&self, item: &T) -> Option<NodeId> {
        let mut n = self.root?;

        loop {
            let nb = self.node(n);
            let next = match (self.compare)(item, &nb.item) {
                Ordering::Equal => break,
                Ordering::Less => nb.left,
                Ordering::Greater => nb.right,
            };

            n = next?;
        }

        Some(n)
    }

    /// Returns `true` if an element comparing equal to `item` is stored.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.find_node(item).is_some()
    }

    /// Returns the stored element comparing equal to `item`, if any.
    #[must_use]
    pub fn get(&self, item: &T) -> Option<&T> {
        self.find_node(item).map(|n| &self.node(n).item)
    }

    /// Adds `item` to the tree.
    ///
    /// If an element comparing equal is already stored the tree is left untouched and `item` is
    /// returned inside the [`DuplicateKey`] error.
    pub fn insert(&mut self, item: T) -> Result<(), DuplicateKey<T>> {
        let mut p = None;
        let mut next = self.root;
        let mut left = false;

        while let Some(c) = next {
            let cb = self.node(c);
            next = match (self.compare)(&item, &cb.item) {
                Ordering::Equal => {
                    debug!("Insert rejected, an equal element is already stored");
                    return Err(DuplicateKey(item));
                }
                Ordering::Less => {
                    left = true;
                    cb.left
                }
                Ordering::Greater => {
                    left = false;
                    cb.right
                }
            };
            p = Some(c);
        }

        let n = self.alloc(Node {
            item,
            color: Color::Red,
            parent: p,
            left: None,
            right: None,
        });

        match p {
            None => self.root = Some(n),
            Some(p) if left => self.node_mut(p).left = Some(n),
            Some(p) => self.node_mut(p).right = Some(n),
        }

        self.size += 1;
        self.fix_after_insert(n);
        Ok(())
    }

    /// Removes the element comparing equal to `item` and returns it.
    ///
    /// Returns [`NotFound`] and leaves the tree untouched if there is no such element.
    pub fn delete(&mut self, item: &T) -> Result<T, NotFound> {
        let Some(mut d) = self.find_node(item) else {
            debug!("Delete rejected, no equal element is stored");
            return Err(NotFound);
        };

        // Ensure the node has at most one child by trading places with its in-order predecessor.
        // Only the items move, the predecessor's node is the one that gets removed.
        let db = self.node(d);
        if let (Some(left), Some(_)) = (db.left, db.right) {
            let pred = self.find_max(left);
            self.swap_items(d, pred);
            d = pred;
        }

        let db = self.node(d);
        let child = db.left.or(db.right);

        if db.color == Color::Black {
            if self.is_red(child) {
                // The red child takes over the removed black, nothing else changes.
                if let Some(child) = child {
                    self.set_color(child, Color::Black);
                }
            } else {
                // Fix the tree while d still sits in it, the walk needs its parent and sibling.
                self.fix_before_delete(d);
            }
        }

        self.replace_subtree(d, child);

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }

        self.size -= 1;
        Ok(self.release(d))
    }

    fn fix_after_insert(&mut self, mut c: NodeId) {
        loop {
            let Some(p) = self.node(c).parent else {
                // We've reached the root, and it cannot be red
                self.set_color(c, Color::Black);
                return;
            };

            if !self.is_red(Some(p)) {
                return;
            }

            let g = self.grandparent(c).expect("A red parent cannot be the root");
            let u = self.uncle(c);

            if let Some(u) = u.filter(|&u| self.is_red(Some(u))) {
                // Parent and uncle are both red, push the redness up to the grandparent and
                // continue from there.
                trace!("Insert fixup: recolouring and moving up");
                self.set_color(p, Color::Black);
                self.set_color(u, Color::Black);
                self.set_color(g, Color::Red);
                c = g;
                continue;
            }

            // Inner grandchildren are rotated onto the outside first.
            let p_left = self.node(g).left == Some(p);
            if p_left && self.node(p).right == Some(c) {
                self.rotate_left(p);
                c = p;
            } else if !p_left && self.node(p).left == Some(c) {
                self.rotate_right(p);
                c = p;
            }

            let p = self.node(c).parent.expect("Rotated node must have a parent");
            trace!("Insert fixup: rotating at grandparent");
            self.set_color(p, Color::Black);
            self.set_color(g, Color::Red);
            if self.is_left_child(c) {
                self.rotate_right(g);
            } else {
                self.rotate_left(g);
            }
            return;
        }
    }

    // Called for a black node with no red child that is about to be removed. Its position is
    // treated as missing one black until the deficit is absorbed or reaches the root.
    fn fix_before_delete(&mut self, mut n: NodeId) {
        loop {
            let Some(p) = self.node(n).parent else {
                return;
            };

            let s = self.sibling(n).expect("Non-root black node must have sibling");
            if self.is_red(Some(s)) {
                // The sibling is red, make it black and make it into the new parent.
                trace!("Delete fixup: rotating red sibling above parent");
                self.set_color(p, Color::Red);
                self.set_color(s, Color::Black);
                if self.is_left_child(n) {
                    self.rotate_left(p);
                } else {
                    self.rotate_right(p);
                }
            }

            let s = self.sibling(n).expect("Non-root black node must have sibling");
            let sb = self.node(s);
            let (s_left, s_right) = (sb.left, sb.right);
            let nephews_black = !self.is_red(s_left) && !self.is_red(s_right);

            if !self.is_red(Some(p)) && !self.is_red(Some(s)) && nephews_black {
                // Parent, sibling and both its children are black. Mark the sibling red so the
                // subtree at p is balanced but one black short, and continue up the tree.
                trace!("Delete fixup: recolouring sibling and moving up");
                self.set_color(s, Color::Red);
                n = p;
                continue;
            }

            if self.is_red(Some(p)) && !self.is_red(Some(s)) && nephews_black {
                // Move the redness down from the parent to the sibling.
                self.set_color(s, Color::Red);
                self.set_color(p, Color::Black);
                return;
            }

            let left = self.is_left_child(n);
            let (near, far) = if left { (s_left, s_right) } else { (s_right, s_left) };

            if !self.is_red(Some(s)) && self.is_red(near) && !self.is_red(far) {
                // A single red child on the inside gets rotated onto the outside.
                let near = near.expect("Red child cannot be None");
                self.set_color(s, Color::Red);
                self.set_color(near, Color::Black);
                if left {
                    self.rotate_right(s);
                } else {
                    self.rotate_left(s);
                }
            }

            // The sibling's far child is red. Rotate the sibling onto the parent, give it the
            // parent's colour and make both of its children black.
            trace!("Delete fixup: rotating sibling above parent");
            let s = self.sibling(n).expect("Non-root black node must have sibling");
            let p_color = self.node(p).color;
            self.set_color(s, p_color);
            self.set_color(p, Color::Black);

            let sb = self.node(s);
            let far = if left { sb.right } else { sb.left };
            self.set_color(far.expect("Sibling must have a red outer child"), Color::Black);

            if left {
                self.rotate_left(p);
            } else {
                self.rotate_right(p);
            }
            return;
        }
    }
}

#[cfg(test)]
impl<T, C> RbtreeGeneric<T, C>
where
    T: std::fmt::Display,
{
    fn print_node(&self, n: NodeId) -> String {
        let nb = self.node(n);
        let left = nb.left.map(|l| self.print_node(l)).unwrap_or_default();
        let right = nb.right.map(|r| self.print_node(r)).unwrap_or_default();
        let c = if nb.color == Color::Red { "r" } else { "b" };

        format!("({} {c} {left} {right})", nb.item)
    }

    pub(crate) fn print(&self) -> String {
        self.root.map(|r| self.print_node(r)).unwrap_or_default()
    }
}

#[cfg(test)]
impl<T, C> RbtreeGeneric<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    // Returns the black-height of the subtree at n.
    fn verify_node(&self, n: NodeId, reached: &mut usize) -> usize {
        *reached += 1;
        let nb = self.node(n);

        let mut black = [0, 0];
        for (i, (child, side)) in
            [(nb.left, Ordering::Less), (nb.right, Ordering::Greater)].into_iter().enumerate()
        {
            let Some(c) = child else {
                continue;
            };
            let cb = self.node(c);

            assert_eq!(cb.parent, Some(n));
            assert_eq!((self.compare)(&cb.item, &nb.item), side);
            // red nodes cannot have red children
            assert!(nb.color == Color::Black || cb.color == Color::Black);

            black[i] = self.verify_node(c, reached);
        }

        assert_eq!(black[0], black[1]);
        if nb.color == Color::Black { black[0] + 1 } else { black[0] }
    }

    pub(crate) fn verify(&self) {
        assert_eq!(self.nodes.len(), self.size);

        match self.root {
            None => {
                assert_eq!(self.size, 0);
            }
            Some(root) => {
                let rb = self.node(root);
                assert!(rb.parent.is_none());
                assert_eq!(rb.color, Color::Black);

                let mut reached = 0;
                self.verify_node(root, &mut reached);
                assert_eq!(reached, self.size);
            }
        }

        let items: Vec<&T> = self.in_order().collect();
        assert_eq!(items.len(), self.size);
        assert!(items.windows(2).all(|w| (self.compare)(w[0], w[1]) == Ordering::Less));

        let bound = 2.0 * ((self.size + 1) as f64).log2();
        assert!(self.height() as f64 <= bound, "height {} over {bound}", self.height());
    }
}
