//! An in-memory ordered skiplist, storing elements so that they can be
//! accessed, inserted and removed in `O(log(n))` on average, without any
//! rebalancing.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` carries a tower of forward links, allowing a search
//! to skip ahead on the sparser upper levels before dropping down. The height
//! of each tower is drawn from a geometric distribution on insertion (see
//! [`level_generator`]), which is what keeps the expected search cost
//! logarithmic without any explicit balancing.
//!
//! The central type is [`SkipSet`], an ordered *multiset*: elements which
//! compare equal may be stored several times. It supports ordered insertion,
//! point lookup, deletion, `O(1)` minimum extraction, and forward iteration
//! optionally seeked to a start bound.
//!
//! ```
//! use skipset::SkipSet;
//!
//! let mut set = SkipSet::new();
//! set.insert(3);
//! set.insert(1);
//! set.insert(5);
//!
//! assert_eq!(set.front(), Some(&1));
//! assert_eq!(set.iter().collect::<Vec<_>>(), [&1, &3, &5]);
//! ```
//!
//! The set orders elements with an associated comparison function which
//! **must** be well-behaved. Specifically, given some ordering function
//! `f(a, b)`, it must satisfy the following properties:
//!
//! - Be well defined: `f(a, b)` should always return the same value
//! - Be anti-symmetric: `f(a, b) == Greater` iff `f(b, a) == Less` and
//!   `f(a, b) == Equal == f(b, a)`.
//! - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then
//!   `f(a, c) == Greater`.
//!
//! **Failure to satisfy these properties can result in unexpected behaviour
//! at best, and at worst will cause a segfault, null deref, or some other bad
//! behaviour.**
//!
//! The structure performs no internal locking: a `SkipSet` is a
//! single-threaded value, and callers wanting shared access must supply their
//! own synchronization around it.

pub mod level_generator;
mod skipnode;
mod skipset;

pub use crate::skipnode::Iter;
pub use crate::skipset::{IntoIter, SkipSet};
