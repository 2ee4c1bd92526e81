//! This crate exposes an ordered map built on a threaded, weight-balanced
//! Binary Search Tree (BST).
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert and find stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! ## Threading
//!
//! Visiting nodes in order usually takes either parent pointers or a stack of
//! the nodes still to come back to. A threaded tree needs neither: every `Node`
//! without a right child instead keeps a "thread" to the `Node` that comes right
//! after it. Stepping forward is then either following that thread or going to
//! the leftmost `Node` of the right subtree.
//!
//! ## Weight balance
//!
//! Searching takes `O(height)`, so the height has to stay `O(lg N)`. Rather than
//! tracking heights and rotating (like an AVL tree), every `Node` here counts the
//! `Node`s on each of its sides and the larger side may hold at most twice the
//! smaller side plus one. When an insertion breaks that for some `Node`, the
//! highest such `Node`'s subtree is laid out flat and rebuilt perfectly balanced.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod error;
pub mod map;

pub use error::InvariantError;
pub use map::{Cursor, Iter, Map};
