//! An always-ordered skiplist with multiset semantics.

use std::cmp::Ordering;
use std::io;
use std::iter::FusedIterator;
use std::{fmt, iter, ptr};

use crate::level_generator::{Geometric, LevelGenerator};
use crate::skipnode::{Iter, SkipNode};

/// The number of levels used when a constructor does not take an explicit
/// level count.
const DEFAULT_MAX_LEVEL: usize = 16;

/// The probability that a node also occupies the next level up.
const DEFAULT_P: f64 = 0.5;

/// The minimum number of levels a set may be constructed with. A single
/// level degenerates into a plain sorted linked list.
const MIN_MAX_LEVEL: usize = 2;

/// The ordering function associated with a set.
type Compare<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

fn default_compare<T: PartialOrd>() -> Compare<T> {
    Box::new(|a: &T, b: &T| a.partial_cmp(b).expect("item cannot be ordered"))
}

// ////////////////////////////////////////////////////////////////////////////
// SkipSet
// ////////////////////////////////////////////////////////////////////////////

/// An ordered multiset backed by a skiplist, providing `O(log(n))` expected
/// insertion, lookup and removal, `O(1)` access to the minimum, and forward
/// iteration which may be seeked to a start bound.
///
/// Elements are kept sorted under the set's comparison function at all times.
/// Elements which compare equal may be stored more than once: insertion never
/// fails or overwrites, and a lookup for such a value returns *some* equal
/// element without specifying which.
///
/// By default the set uses the comparison function
/// `a.partial_cmp(b).expect("item cannot be ordered")`. This handles all
/// types which implement `Ord` and `PartialOrd`, though it will panic if a
/// value which cannot be ordered is inserted (such as `f64::NAN`). A custom
/// ordering can be supplied with [`with_comp`][SkipSet::with_comp].
///
/// The associated comparison function **must** be well-behaved. Specifically,
/// given some ordering function `f(a, b)`, it must satisfy the following
/// properties:
///
/// - Be well defined: `f(a, b)` should always return the same value
/// - Be anti-symmetric: `f(a, b) == Greater` iff `f(b, a) == Less` and
///   `f(a, b) == Equal == f(b, a)`.
/// - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then
///   `f(a, c) == Greater`.
///
/// **Failure to satisfy these properties can result in unexpected behavior at
/// best, and at worst will cause a segfault, null deref, or some other bad
/// behavior.**
pub struct SkipSet<T> {
    // The head sentinel, occupying every level. Owns the rest of the
    // structure transitively through the level-0 chain.
    head: Box<SkipNode<T>>,
    len: usize,
    // Highest level currently in use, in 1..=max_level. Shrinks back down
    // (floor 1) when the topmost chain empties.
    level: usize,
    level_generator: Geometric,
    compare: Compare<T>,
    // Scratch buffer recording, per level, the rightmost node before the
    // target of an insertion or removal. Reset at the start of each use;
    // its contents are only meaningful within a single call.
    update: Vec<*mut SkipNode<T>>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<T> SkipSet<T>
where
    T: PartialOrd,
{
    /// Create a new skipset with the default comparison function and the
    /// default number of 16 levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set: SkipSet<i64> = SkipSet::new();
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_level(DEFAULT_MAX_LEVEL)
    }

    /// Create a new skipset with the given maximum number of levels. A node
    /// inserted into the set will never occupy more than `max_level` levels,
    /// so the value bounds the search fan-out: around `log2(n)` levels suit a
    /// set of `n` elements.
    ///
    /// # Panics
    ///
    /// Constructing a set with fewer than 2 levels is a contract violation
    /// and panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let set: SkipSet<i64> = SkipSet::with_max_level(4);
    /// assert_eq!(set.max_level(), 4);
    /// ```
    #[must_use]
    pub fn with_max_level(max_level: usize) -> Self {
        assert!(
            max_level >= MIN_MAX_LEVEL,
            "a skipset requires at least {MIN_MAX_LEVEL} levels, got {max_level}"
        );
        let generator = Geometric::new(max_level, DEFAULT_P)
            .expect("failed to construct the level generator");
        Self::with_parts(default_compare(), generator)
    }

    /// Create a new skipset whose level generator is seeded with `seed`, so
    /// that the internal structure is reproducible from run to run. The
    /// stored elements and their order are the same regardless of the seed;
    /// only the node heights differ.
    ///
    /// # Panics
    ///
    /// As for [`with_max_level`][SkipSet::with_max_level].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::with_seed(16, 0x5eed);
    /// set.extend([3, 1, 2]);
    /// assert!(set.iter().copied().eq(1..=3));
    /// ```
    #[must_use]
    pub fn with_seed(max_level: usize, seed: u64) -> Self {
        assert!(
            max_level >= MIN_MAX_LEVEL,
            "a skipset requires at least {MIN_MAX_LEVEL} levels, got {max_level}"
        );
        let generator = Geometric::with_seed(max_level, DEFAULT_P, seed)
            .expect("level count and probability are validated");
        Self::with_parts(default_compare(), generator)
    }

    /// Create a new skipset using the provided level generator, giving full
    /// control over the level count, the level probability and the seed.
    ///
    /// # Panics
    ///
    /// Panics if the generator provides fewer than 2 levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    /// use skipset::level_generator::Geometric;
    ///
    /// let generator = Geometric::with_seed(8, 0.25, 42).unwrap();
    /// let mut set = SkipSet::with_level_generator(generator);
    /// set.insert("a");
    /// assert_eq!(set.max_level(), 8);
    /// ```
    #[must_use]
    pub fn with_level_generator(generator: Geometric) -> Self {
        Self::with_parts(default_compare(), generator)
    }
}

impl<T> SkipSet<T> {
    /// Create a new skipset using the provided function to determine the
    /// ordering of elements. It will be created with the default number of 16
    /// levels.
    ///
    /// # Safety
    ///
    /// The skipset relies on a well-behaved comparison function. Specifically,
    /// given some ordering function `f(a, b)`, it **must** satisfy the
    /// following properties:
    ///
    /// - Be well defined: `f(a, b)` should always return the same value
    /// - Be anti-symmetric: `f(a, b) == Greater` if and only if
    ///   `f(b, a) == Less`, and `f(a, b) == Equal == f(b, a)`.
    /// - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then
    ///   `f(a, c) == Greater`.
    ///
    /// **Failure to satisfy these properties can result in unexpected
    /// behavior at best, and at worst will cause a segfault, null deref, or
    /// some other bad behavior.**
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    /// use std::cmp::Ordering;
    ///
    /// // Store even numbers before odd ones, and sort as usual within the
    /// // same parity group.
    /// let mut set = unsafe {
    ///     SkipSet::with_comp(|a: &u64, b: &u64| {
    ///         if a % 2 == b % 2 {
    ///             a.cmp(b)
    ///         } else if a % 2 == 0 {
    ///             Ordering::Less
    ///         } else {
    ///             Ordering::Greater
    ///         }
    ///     })
    /// };
    /// set.insert(1);
    /// set.insert(2);
    /// assert_eq!(set.front(), Some(&2));
    /// ```
    #[must_use]
    pub unsafe fn with_comp<F>(f: F) -> Self
    where
        F: 'static + Send + Sync + Fn(&T, &T) -> Ordering,
    {
        let generator = Geometric::new(DEFAULT_MAX_LEVEL, DEFAULT_P)
            .expect("failed to construct the level generator");
        Self::with_parts(Box::new(f), generator)
    }

    fn with_parts(compare: Compare<T>, generator: Geometric) -> Self {
        let max_level = generator.total();
        assert!(
            max_level >= MIN_MAX_LEVEL,
            "a skipset requires at least {MIN_MAX_LEVEL} levels, got {max_level}"
        );
        SkipSet {
            head: Box::new(SkipNode::head(max_level)),
            len: 0,
            level: 1,
            level_generator: generator,
            compare,
            update: vec![ptr::null_mut(); max_level],
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// assert_eq!(set.len(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// assert!(set.is_empty());
    ///
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The highest level currently in use, between 1 and
    /// [`max_level`][SkipSet::max_level]. Grows as taller nodes are inserted
    /// and shrinks back when the topmost chain empties.
    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The maximum number of levels, fixed at construction.
    #[inline]
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.level_generator.total()
    }

    /// Insert `item` into the set, keeping it ordered. Insertion always
    /// succeeds: an element equal to one already present is stored alongside
    /// it rather than replacing it.
    ///
    /// `O(log(n))` expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.insert(5);
    /// set.insert(5);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn insert(&mut self, item: T) {
        self.descend_recording(&item);
        let height = self.level_generator.height();
        if height > self.level {
            // The scratch buffer already references the head at every level
            // above the active one.
            self.level = height;
        }
        let new_node = Box::into_raw(Box::new(SkipNode::new(item, height)));
        // SAFETY: at each of the new node's levels, the recorded node is live
        // and is the node after which the new node sorts.
        unsafe {
            for (level, &prev) in self.update.iter().enumerate().take(height) {
                (&mut (*new_node).forwards)[level] = (&(*prev).forwards)[level];
                (&mut (*prev).forwards)[level] = new_node;
            }
        }
        self.len += 1;
    }

    /// Returns a reference to an element equal to `item`, or `None` if there
    /// is none. If several stored elements compare equal to `item`, one of
    /// them is returned without specifying which.
    ///
    /// `O(log(n))` expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// assert_eq!(set.get(&4), Some(&4));
    /// assert_eq!(set.get(&15), None);
    /// ```
    #[must_use]
    pub fn get(&self, item: &T) -> Option<&T> {
        let found = self.descend(item).next()?.item();
        ((self.compare)(found, item) == Ordering::Equal).then_some(found)
    }

    /// Returns `true` if an element equal to `item` is contained in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// assert!(set.contains(&4));
    /// assert!(!set.contains(&15));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.get(item).is_some()
    }

    /// Remove an element equal to `item` from the set and return it, or
    /// `None` if there is none. If several stored elements compare equal,
    /// exactly one of them is removed.
    ///
    /// `O(log(n))` expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// assert_eq!(set.remove(&4), Some(4));
    /// assert_eq!(set.remove(&4), None);
    /// ```
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let prev = self.descend_recording(item);
        // SAFETY: the recorded nodes are live, and at every level at most one
        // of them links to the node being removed.
        unsafe {
            let target = (&(*prev).forwards)[0];
            if target.is_null() || (self.compare)((*target).item(), item) != Ordering::Equal {
                return None;
            }
            for level in 0..self.level {
                let recorded = self.update[level];
                if (&(*recorded).forwards)[level] == target {
                    (&mut (*recorded).forwards)[level] = (&(*target).forwards)[level];
                }
            }
            self.len -= 1;
            self.shrink_level();
            Box::from_raw(target).into_item()
        }
    }

    /// Provides a reference to the smallest element, or `None` if the set is
    /// empty.
    ///
    /// `O(1)`: level 0 links every element in order, so the minimum is the
    /// head's immediate successor.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// assert!(set.front().is_none());
    ///
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.front(), Some(&1));
    /// ```
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.head.next().map(SkipNode::item)
    }

    /// Remove the smallest element and return it, or `None` if the set is
    /// empty.
    ///
    /// `O(1)` amortized: the minimum's predecessor at every level it occupies
    /// is the head itself, so no descent is needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.insert(2);
    /// set.insert(1);
    ///
    /// assert_eq!(set.pop_front(), Some(1));
    /// assert_eq!(set.pop_front(), Some(2));
    /// assert!(set.pop_front().is_none());
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        let first = self.head.forwards[0];
        if first.is_null() {
            return None;
        }
        // SAFETY: `first` is owned by this set and is unlinked from every
        // level it occupies before being freed.
        unsafe {
            for level in 0..self.level {
                if self.head.forwards[level] == first {
                    self.head.forwards[level] = (&(*first).forwards)[level];
                }
            }
            self.len -= 1;
            self.shrink_level();
            Box::from_raw(first).into_item()
        }
    }

    /// Clears the set, removing all elements.
    ///
    /// `O(n)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// set.clear();
    /// assert!(set.is_empty());
    /// ```
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Creates an iterator over the elements of the set, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend([2, 0, 1]);
    /// assert!(set.iter().copied().eq(0..3));
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            node: self.head.next(),
        }
    }

    /// Creates an iterator seeked to `start`: the first element produced is
    /// the first one not less than `start`, and iteration continues in
    /// ascending order from there.
    ///
    /// Seeking costs `O(log(n))` expected; each subsequent step is `O(1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// let tail: Vec<_> = set.iter_from(&7).copied().collect();
    /// assert_eq!(tail, [7, 8, 9]);
    /// ```
    #[must_use]
    pub fn iter_from(&self, start: &T) -> Iter<'_, T> {
        Iter {
            node: self.descend(start).next(),
        }
    }

    /// Write out the internal structure of the set, one line per active
    /// level, for debugging purposes.
    ///
    /// The exact format is not part of the crate's stability guarantees.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the sink.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(1..=3);
    ///
    /// let mut out = Vec::new();
    /// set.debug_structure(&mut out).unwrap();
    /// let text = String::from_utf8(out).unwrap();
    /// assert!(text.starts_with("Level[0]: 1 -> 2 -> 3 -> nil"));
    /// ```
    pub fn debug_structure<W>(&self, w: &mut W) -> io::Result<()>
    where
        T: fmt::Debug,
        W: io::Write,
    {
        for level in 0..self.level {
            write!(w, "Level[{level}]: ")?;
            // SAFETY: forward links are either null or point to live nodes
            // owned by this set.
            let mut node = unsafe { self.head.forwards[level].as_ref() };
            while let Some(current) = node {
                write!(w, "{:?} -> ", current.item())?;
                // SAFETY: as above.
                node = unsafe { current.forwards[level].as_ref() };
            }
            writeln!(w, "nil")?;
        }
        Ok(())
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<T> SkipSet<T> {
    /// The shared descent: starting from the head at the highest active
    /// level, move forward while the next node's item is strictly less than
    /// `target`, dropping one level whenever no further forward progress is
    /// possible. Returns the level-0 node immediately preceding the first
    /// item not less than `target` (the head if there is none).
    fn descend(&self, target: &T) -> &SkipNode<T> {
        let mut node: &SkipNode<T> = &self.head;
        for level in (0..self.level).rev() {
            // SAFETY: forward links are either null or point to live nodes
            // owned by this set.
            unsafe {
                while let Some(next) = node.forwards[level].as_ref() {
                    if (self.compare)(next.item(), target) == Ordering::Less {
                        node = next;
                    } else {
                        break;
                    }
                }
            }
        }
        node
    }

    /// The same descent as [`descend`][SkipSet::descend], additionally
    /// recording in the scratch buffer, per level, the rightmost node at or
    /// before `target`: the node after which an insertion splices in, or
    /// before which a removal unlinks. The buffer is reset first, with every
    /// slot above the active level left pointing at the head.
    fn descend_recording(&mut self, target: &T) -> *mut SkipNode<T> {
        let head: *mut SkipNode<T> = &mut *self.head;
        for slot in &mut self.update {
            *slot = head;
        }
        let mut node = head;
        for level in (0..self.level).rev() {
            // SAFETY: forward links are either null or point to live nodes
            // owned by this set.
            unsafe {
                while let Some(next) = (&(*node).forwards)[level].as_ref() {
                    if (self.compare)(next.item(), target) == Ordering::Less {
                        node = (&(*node).forwards)[level];
                    } else {
                        break;
                    }
                }
            }
            self.update[level] = node;
        }
        node
    }

    /// Lower the active level while its topmost chain is empty, stopping at
    /// the floor of 1.
    fn shrink_level(&mut self) {
        while self.level > 1 && self.head.forwards[self.level - 1].is_null() {
            self.level -= 1;
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

// SAFETY: the raw links only ever point at nodes owned exclusively by this
// set, and the comparator is required to be Send + Sync.
unsafe impl<T: Send> Send for SkipSet<T> {}
// SAFETY: as above; shared access never mutates.
unsafe impl<T: Sync> Sync for SkipSet<T> {}

impl<T> Drop for SkipSet<T> {
    fn drop(&mut self) {
        // SAFETY: the level-0 chain reaches every node exactly once; links at
        // higher levels may dangle while the chain is torn down.
        unsafe {
            let mut node = self.head.forwards[0];
            while !node.is_null() {
                let boxed = Box::from_raw(node);
                node = boxed.forwards[0];
            }
        }
    }
}

impl<T: PartialOrd> Default for SkipSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// This implementation of `PartialEq` only checks that the *elements* are
/// equal, in order; it does not compare the ordering functions or the node
/// levels, and it uses `T`'s own `PartialEq` rather than the sets'
/// comparison functions.
impl<T: PartialEq> PartialEq for SkipSet<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for SkipSet<T> {}

impl<T> Extend<T> for SkipSet<T> {
    #[inline]
    fn extend<I: iter::IntoIterator<Item = T>>(&mut self, iterable: I) {
        for element in iterable {
            self.insert(element);
        }
    }
}

impl<T> iter::FromIterator<T> for SkipSet<T>
where
    T: PartialOrd,
{
    #[inline]
    fn from_iter<I>(iter: I) -> Self
    where
        I: iter::IntoIterator<Item = T>,
    {
        let mut set = SkipSet::new();
        set.extend(iter);
        set
    }
}

impl<T> fmt::Debug for SkipSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry:?}")?;
        }
        write!(f, "]")
    }
}

impl<T> fmt::Display for SkipSet<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry}")?;
        }
        write!(f, "]")
    }
}

impl<T> iter::IntoIterator for SkipSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { set: self }
    }
}

impl<'a, T> iter::IntoIterator for &'a SkipSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// /////////////////////////////////
// Owning iterator
// /////////////////////////////////

/// An owning iterator over the elements of a [`SkipSet`], draining it in
/// ascending order.
#[derive(Debug)]
pub struct IntoIter<T> {
    set: SkipSet<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.set.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.set.len(), Some(self.set.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
