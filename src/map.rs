//! A threaded, weight-balanced BST map. Nodes without a right child keep a "thread" to their
//! in-order successor instead, so walking the map in key order needs neither parent pointers nor
//! a stack. Balance is kept by subtree sizes rather than heights: when an insertion leaves a node
//! with one side more than twice (plus one) the size of the other, the topmost such node's subtree
//! is flattened and rebuilt perfectly balanced.
//!
//! # Examples
//!
//! ```
//! use threaded_bst::Map;
//!
//! let mut map = Map::new();
//!
//! // Nothing in here yet.
//! assert_eq!(map.find(&1), None);
//! assert_eq!(map.get(&1), 0);
//!
//! map.insert(1, 2);
//! assert_eq!(map.find(&1), Some(&2));
//!
//! // Inserting a new value for the same key overwrites the value.
//! map.insert(1, 3);
//! assert_eq!(map.get(&1), 3);
//! assert_eq!(map.len(), 1);
//!
//! // Keys come out in order no matter how they went in.
//! map.insert(0, 1);
//! assert_eq!(map.iter().collect::<Vec<_>>(), [&0, &1]);
//! ```

use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::iter::FusedIterator;
use std::mem;
use std::ptr;

use tracing::{debug, trace};

use crate::error::InvariantError;

/// Index of a node in its map's arena. Rebuilding relinks nodes but never moves them, so an id is
/// stable for as long as its key is in the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

/// The right link of a node. A node either owns its right child or, having none, threads to its
/// in-order successor (`None` for the largest key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Right {
    Child(NodeId),
    Thread(Option<NodeId>),
}

impl Right {
    fn child(self) -> Option<NodeId> {
        match self {
            Self::Child(id) => Some(id),
            Self::Thread(_) => None,
        }
    }
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Right,

    /// Number of nodes in the left subtree.
    left_count: usize,
    /// Number of nodes in the right subtree.
    right_count: usize,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, right: Right) -> Self {
        Self {
            key,
            value,
            left: None,
            right,
            left_count: 0,
            right_count: 0,
        }
    }

    fn is_balanced(&self) -> bool {
        is_balanced(self.left_count, self.right_count)
    }
}

/// The weight bound every node has to satisfy: the bigger side holds at most twice the nodes of
/// the smaller side, plus one.
fn is_balanced(left: usize, right: usize) -> bool {
    left.max(right) <= 2 * left.min(right) + 1
}

/// An ordered map backed by a threaded, weight-balanced BST. Lookups and inserts take
/// `O(lg N)`.
///
/// There is no way to remove a single key; [`Map::clear`] empties the whole map.
pub struct Map<K, V> {
    // Every node lives here. Links between nodes are indices into this arena so the right links
    // can double as threads without any shared ownership.
    nodes: Vec<Node<K, V>>,
    root: Option<NodeId>,
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for Map<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Copies every node. Links are arena indices so the copy has the same shape and threads but
    /// shares nothing with the original.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }

    /// Replaces the contents of `self` with a copy of `source`, reusing the arena's allocation.
    fn clone_from(&mut self, source: &Self) {
        self.nodes.clone_from(&source.nodes);
        self.root = source.root;
    }
}

impl<K, V> fmt::Debug for Map<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// Two maps are equal when they hold the same entries. Their shapes may differ.
impl<K, V> PartialEq for Map<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.entries().eq(other.entries())
    }
}

impl<K: Eq, V: Eq> Eq for Map<K, V> {}

impl<K: Ord, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Map<K, V> {
    /// Generate a new, empty `Map`.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// The number of key/value pairs in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the map holds no pairs at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Potentially finds the value associated with the given key. If no node has the
    /// corresponding key, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let mut map = Map::new();
    /// map.insert(1, 2);
    ///
    /// assert_eq!(map.find(&1), Some(&2));
    /// assert_eq!(map.find(&42), None);
    /// ```
    pub fn find(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        self.find_id(key).map(|id| &self.node(id).value)
    }

    /// Returns a copy of the value stored at `key`, or `V::default()` if the key isn't present.
    /// A missing key is *not* added to the map; see [`Map::get_or_insert_default`] for that.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let mut map = Map::new();
    /// map.insert("lorem", 7);
    ///
    /// assert_eq!(map.get(&"lorem"), 7);
    /// assert_eq!(map.get(&"ipsum"), 0);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn get(&self, key: &K) -> V
    where
        K: Ord,
        V: Clone + Default,
    {
        self.find(key).cloned().unwrap_or_default()
    }

    /// Whether the map has an entry for `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        self.find_id(key).is_some()
    }

    /// Inserts the given value into the map at the given key. Inserting a new value for an
    /// existing key overwrites its value in place and returns the old one; the shape of the tree
    /// doesn't change in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let mut map = Map::new();
    ///
    /// assert_eq!(map.insert(1, 2), None);
    /// assert_eq!(map.find(&1), Some(&2));
    ///
    /// assert_eq!(map.insert(1, 3), Some(2));
    /// assert_eq!(map.find(&1), Some(&3));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        match self.find_id(&key) {
            Some(id) => Some(mem::replace(&mut self.node_mut(id).value, value)),
            None => {
                self.insert_new(key, value);
                None
            }
        }
    }

    /// Returns the value stored at `key`, first inserting `V::default()` if the key isn't
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let mut counts: Map<&str, i32> = Map::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    ///
    /// assert_eq!(counts.get(&"a"), 2);
    /// assert_eq!(counts.get(&"b"), 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        K: Ord,
        V: Default,
    {
        let id = match self.find_id(&key) {
            Some(id) => id,
            None => self.insert_new(key, V::default()),
        };
        &mut self.node_mut(id).value
    }

    /// Removes every pair from the map.
    pub fn clear(&mut self) {
        trace!(len = self.len(), "clearing map");
        // Threads are plain indices, so dropping the arena drops each node exactly once.
        self.root = None;
        self.nodes.clear();
    }

    /// A cursor at the smallest key, or an end cursor if the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor {
            map: self,
            current: self.root.map(|root| self.leftmost(root)),
        }
    }

    /// A cursor one past the largest key.
    ///
    /// Note that two end cursors are never equal unless they are the same cursor, so check
    /// [`Cursor::is_end`] rather than comparing against a fresh `end()`.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor {
            map: self,
            current: None,
        }
    }

    /// An iterator over the keys of the map, in ascending order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cursor: self.begin(),
            remaining: self.len(),
        }
    }

    /// How many levels of nodes there are along owned links. An empty map has a height of 0 and a
    /// map with only a root has a height of 1.
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| self.subtree_height(root))
    }

    /// Lists every pair in key order, one `key: {key} value: {value}` line each.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let map: Map<_, _> = [(8, 80), (15, 150)].into_iter().collect();
    ///
    /// assert_eq!(map.to_ordered_text(), "key: 8 value: 80\nkey: 15 value: 150\n");
    /// ```
    pub fn to_ordered_text(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut text = String::new();
        for (key, value) in self.entries() {
            // Writing to a `String` can't fail.
            let _ = writeln!(text, "key: {key} value: {value}");
        }
        text
    }

    /// Lists every node in pre-order with the sizes of its subtrees, one
    /// `key: {key}, nL: {left}, nR: {right}` line each.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::Map;
    ///
    /// let map: Map<_, _> = [(1, ()), (2, ()), (3, ())].into_iter().collect();
    ///
    /// assert_eq!(
    ///     map.to_balance_text(),
    ///     "key: 2, nL: 1, nR: 1\nkey: 1, nL: 0, nR: 0\nkey: 3, nL: 0, nR: 0\n"
    /// );
    /// ```
    pub fn to_balance_text(&self) -> String
    where
        K: fmt::Display,
    {
        let mut text = String::new();
        if let Some(root) = self.root {
            self.write_balance(root, &mut text);
        }
        text
    }

    /// Copies every pair out of the map, in key order.
    pub fn to_ordered_pairs(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.entries()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Walks the whole tree and checks that:
    ///
    /// 1. keys are strictly increasing in order,
    /// 2. every thread points at the next node in order,
    /// 3. every node's recorded subtree sizes are exact and within the weight bound,
    /// 4. every stored pair is reachable from the root.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Ord,
    {
        let mut in_order = Vec::with_capacity(self.len());
        if let Some(root) = self.root {
            self.audit(root, &mut in_order)?;
        }

        if in_order.len() != self.len() {
            return Err(InvariantError::LengthMismatch {
                recorded: self.len(),
                reachable: in_order.len(),
            });
        }

        for (position, pair) in in_order.windows(2).enumerate() {
            if self.node(pair[0]).key >= self.node(pair[1]).key {
                return Err(InvariantError::OutOfOrder {
                    position: position + 1,
                });
            }
        }

        for (position, &id) in in_order.iter().enumerate() {
            if let Right::Thread(next) = self.node(id).right {
                if next != in_order.get(position + 1).copied() {
                    return Err(InvariantError::BrokenThread { position });
                }
            }
        }

        Ok(())
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.0]
    }

    fn find_id(&self, key: &K) -> Option<NodeId>
    where
        K: Ord,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                // Hitting a thread means the key would have been our right child.
                Ordering::Greater => node.right.child(),
            };
        }
        None
    }

    /// Inserts a key that isn't in the map yet and returns the id of its node.
    ///
    /// Every node on the way down counts the new node on the side it goes to. The first of them
    /// (closest to the root) pushed out of balance gets its whole subtree rebuilt once the new
    /// node is attached. Rebuilding that subtree also fixes any node below it so one rebuild is
    /// always enough.
    fn insert_new(&mut self, key: K, value: V) -> NodeId
    where
        K: Ord,
    {
        let id = NodeId(self.nodes.len());
        let Some(root) = self.root else {
            self.nodes.push(Node::new(key, value, Right::Thread(None)));
            self.root = Some(id);
            return id;
        };

        // The parent stays `None` if the violator is the root.
        let mut violator = None;
        let mut violator_parent = None;

        let mut parent = root;
        let mut current = Some(root);
        while let Some(visiting) = current {
            parent = visiting;
            let node = self.node_mut(visiting);
            current = if key < node.key {
                node.left_count += 1;
                node.left
            } else {
                node.right_count += 1;
                node.right.child()
            };

            if violator.is_none() {
                if node.is_balanced() {
                    violator_parent = Some(visiting);
                } else {
                    violator = Some(visiting);
                }
            }
        }

        // A new left child threads back to its parent. A new right child takes over its parent's
        // thread since it's now the last node before that successor.
        let parent_node = self.node_mut(parent);
        let right = if key < parent_node.key {
            parent_node.left = Some(id);
            Right::Thread(Some(parent))
        } else {
            mem::replace(&mut parent_node.right, Right::Child(id))
        };
        debug_assert!(matches!(right, Right::Thread(_)));
        self.nodes.push(Node::new(key, value, right));

        if let Some(violator) = violator {
            let rebuilt = self.rebuild(violator);
            match violator_parent {
                None => self.root = Some(rebuilt),
                Some(violator_parent) => {
                    let violator_parent = self.node_mut(violator_parent);
                    if violator_parent.left == Some(violator) {
                        violator_parent.left = Some(rebuilt);
                    } else {
                        violator_parent.right = Right::Child(rebuilt);
                    }
                }
            }
        }

        id
    }

    /// Relinks the nodes of the subtree rooted at `subtree` into a perfectly balanced shape and
    /// returns the new subtree root. The caller has to point the subtree's parent at it.
    fn rebuild(&mut self, subtree: NodeId) -> NodeId {
        let boundary = self.subtree_successor(subtree);
        let ids = self.collect_subtree(subtree, boundary);
        debug!(size = ids.len(), "rebuilding unbalanced subtree");

        let rebuilt = self.build_balanced(&ids, boundary);

        if cfg!(debug_assertions) {
            let root = self.node(rebuilt);
            assert_eq!(root.left_count + root.right_count + 1, ids.len());
            assert!(root.is_balanced());
        }
        rebuilt
    }

    /// The node right after the whole subtree in key order, i.e. the thread of its rightmost
    /// node.
    fn subtree_successor(&self, subtree: NodeId) -> Option<NodeId> {
        let mut current = subtree;
        loop {
            match self.node(current).right {
                Right::Child(child) => current = child,
                Right::Thread(next) => return next,
            }
        }
    }

    /// Lists the subtree's nodes in key order by following threads from its leftmost node until
    /// reaching `boundary`, the subtree's successor.
    fn collect_subtree(&self, subtree: NodeId, boundary: Option<NodeId>) -> Vec<NodeId> {
        let root = self.node(subtree);
        let mut ids = Vec::with_capacity(root.left_count + root.right_count + 1);
        let mut current = Some(self.leftmost(subtree));
        while current != boundary {
            let Some(id) = current else {
                break;
            };
            ids.push(id);
            current = self.successor(id);
        }
        ids
    }

    /// Links the sorted, non-empty `ids` into a balanced subtree rooted at the lower median and
    /// returns that root. The largest node threads to `thread`.
    fn build_balanced(&mut self, ids: &[NodeId], thread: Option<NodeId>) -> NodeId {
        match *ids {
            [only] => {
                self.relink(only, None, Right::Thread(thread), 0, 0);
                only
            }
            [lower, higher] => {
                self.relink(higher, None, Right::Thread(thread), 0, 0);
                self.relink(lower, None, Right::Child(higher), 0, 1);
                lower
            }
            _ => {
                let mid = (ids.len() - 1) / 2;
                let root = ids[mid];
                let left = self.build_balanced(&ids[..mid], Some(root));
                let right = self.build_balanced(&ids[mid + 1..], thread);
                self.relink(
                    root,
                    Some(left),
                    Right::Child(right),
                    mid,
                    ids.len() - mid - 1,
                );
                root
            }
        }
    }

    fn relink(
        &mut self,
        id: NodeId,
        left: Option<NodeId>,
        right: Right,
        left_count: usize,
        right_count: usize,
    ) {
        let node = self.node_mut(id);
        node.left = left;
        node.right = right;
        node.left_count = left_count;
        node.right_count = right_count;
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    /// The next node in key order. A thread leads straight there, otherwise it's the leftmost
    /// node of the right subtree.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).right {
            Right::Thread(next) => next,
            Right::Child(child) => Some(self.leftmost(child)),
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        let mut cursor = self.begin();
        std::iter::from_fn(move || {
            let entry = cursor.entry();
            cursor.move_next();
            entry
        })
    }

    fn subtree_height(&self, id: NodeId) -> usize {
        let node = self.node(id);
        let left = node.left.map_or(0, |left| self.subtree_height(left));
        let right = node.right.child().map_or(0, |right| self.subtree_height(right));
        left.max(right) + 1
    }

    fn write_balance(&self, id: NodeId, text: &mut String)
    where
        K: fmt::Display,
    {
        let node = self.node(id);
        let _ = writeln!(
            text,
            "key: {}, nL: {}, nR: {}",
            node.key, node.left_count, node.right_count
        );
        if let Some(left) = node.left {
            self.write_balance(left, text);
        }
        if let Some(right) = node.right.child() {
            self.write_balance(right, text);
        }
    }

    /// Pushes the subtree's nodes in key order, following owned links only, and returns the
    /// subtree's size. Fails on the first node whose recorded sizes are wrong or unbalanced.
    fn audit(&self, id: NodeId, in_order: &mut Vec<NodeId>) -> Result<usize, InvariantError> {
        let node = self.node(id);
        let left = match node.left {
            Some(left) => self.audit(left, in_order)?,
            None => 0,
        };
        let position = in_order.len();
        in_order.push(id);
        let right = match node.right.child() {
            Some(right) => self.audit(right, in_order)?,
            None => 0,
        };

        if (node.left_count, node.right_count) != (left, right) {
            return Err(InvariantError::StaleCount {
                position,
                recorded_left: node.left_count,
                recorded_right: node.right_count,
                actual_left: left,
                actual_right: right,
            });
        }
        if !is_balanced(left, right) {
            return Err(InvariantError::Unbalanced {
                position,
                left,
                right,
            });
        }
        Ok(left + right + 1)
    }
}

/// A position in a [`Map`]: either at one of its keys or one past the largest key (the "end").
///
/// Cursors at the same key of the same map are equal. End cursors are the exception: two of them
/// are only equal when they are the very same cursor, so use [`Cursor::is_end`] to find the end.
///
/// # Examples
///
/// ```
/// use threaded_bst::Map;
///
/// let map: Map<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
///
/// let mut keys: Vec<&i32> = Vec::new();
/// let mut cursor = map.begin();
/// while !cursor.is_end() {
///     keys.extend(cursor.key());
///     cursor.move_next();
/// }
/// assert_eq!(keys, [&1, &2]);
///
/// assert!(map.end() != map.end());
/// ```
pub struct Cursor<'a, K, V> {
    map: &'a Map<K, V>,
    current: Option<NodeId>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            current: self.current,
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("key", &self.key()).finish()
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self.current, other.current) {
            (None, None) => ptr::eq(self, other),
            (current, other_current) => ptr::eq(self.map, other.map) && current == other_current,
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// The key under the cursor, or `None` at the end.
    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(key, _)| key)
    }

    /// Whether the cursor is one past the largest key.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Steps to the next key in order. Stepping past the end leaves the cursor at the end.
    pub fn move_next(&mut self) {
        if let Some(id) = self.current {
            self.current = self.map.successor(id);
        }
    }

    fn entry(&self) -> Option<(&'a K, &'a V)> {
        let map = self.map;
        self.current.map(|id| {
            let node = map.node(id);
            (&node.key, &node.value)
        })
    }
}

/// An iterator over the keys of a [`Map`] in ascending order, created by [`Map::iter`].
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let key = self.cursor.key()?;
        self.cursor.move_next();
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a map and a `BTreeMap`, checking after every operation that
    /// the map is still a valid threaded, weight-balanced tree holding the same pairs.
    fn do_ops<K, V>(ops: &[Op<K, V>], map: &mut Map<K, V>, expected: &mut BTreeMap<K, V>) -> bool
    where
        K: Clone + Ord,
        V: Clone + Default + PartialEq,
    {
        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    if map.insert(k.clone(), v.clone()) != expected.insert(k.clone(), v.clone()) {
                        return false;
                    }
                }
                Op::GetOrInsertDefault(k) => {
                    let value = map.get_or_insert_default(k.clone()).clone();
                    if value != *expected.entry(k.clone()).or_default() {
                        return false;
                    }
                }
                Op::Clear => {
                    map.clear();
                    expected.clear();
                }
                Op::Iter => {
                    if !map.iter().eq(expected.keys()) {
                        return false;
                    }
                }
            }
            if map.check_invariants().is_err() || map.len() != expected.len() {
                return false;
            }
        }
        true
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
            let mut map = Map::new();
            let mut expected = BTreeMap::new();

            do_ops(&ops, &mut map, &mut expected)
                && expected.iter().all(|(key, value)| map.find(key) == Some(value))
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let mut map = Map::new();
            for x in &xs {
                map.insert(*x, *x);
            }

            xs.iter().all(|x| map.find(x) == Some(x))
        }
    }

    quickcheck::quickcheck! {
        fn stays_balanced(xs: Vec<u16>) -> bool {
            let mut map = Map::new();
            xs.iter().all(|x| {
                map.insert(*x, ());
                map.check_invariants().is_ok()
            })
        }
    }
}
