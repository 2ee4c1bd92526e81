//! Errors reported when auditing a [`Map`][crate::Map].

use thiserror::Error;

/// A broken structural invariant found by [`Map::check_invariants`][crate::Map::check_invariants].
///
/// Nodes are identified by their `position` in key order (0 is the smallest key) so the error
/// doesn't need to carry the key type around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The key at `position` is not strictly greater than the key before it. This also catches
    /// duplicate keys.
    #[error("key at position {position} is not greater than its predecessor")]
    OutOfOrder {
        /// In-order position of the offending node.
        position: usize,
    },
    /// The node at `position` has a thread that doesn't point at its in-order successor.
    #[error("thread of node at position {position} does not point at its successor")]
    BrokenThread {
        /// In-order position of the offending node.
        position: usize,
    },
    /// The subtree sizes recorded on a node don't match its actual subtrees.
    #[error(
        "node at position {position} records ({recorded_left}, {recorded_right}) \
         but has subtrees of size ({actual_left}, {actual_right})"
    )]
    StaleCount {
        /// In-order position of the offending node.
        position: usize,
        /// Recorded size of the left subtree.
        recorded_left: usize,
        /// Recorded size of the right subtree.
        recorded_right: usize,
        /// Actual size of the left subtree.
        actual_left: usize,
        /// Actual size of the right subtree.
        actual_right: usize,
    },
    /// The node at `position` breaks the weight bound `max <= 2 * min + 1`.
    #[error("node at position {position} is out of balance ({left} left, {right} right)")]
    Unbalanced {
        /// In-order position of the offending node.
        position: usize,
        /// Size of the left subtree.
        left: usize,
        /// Size of the right subtree.
        right: usize,
    },
    /// The number of nodes reachable from the root differs from the map's length.
    #[error("map holds {recorded} entries but {reachable} are reachable from the root")]
    LengthMismatch {
        /// Entries the map believes it stores.
        recorded: usize,
        /// Entries reachable through owned links.
        reachable: usize,
    },
}
