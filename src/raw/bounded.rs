use core::ops::{Deref, DerefMut};

use smallvec::SmallVec;

/// A sequence holding at most `N - SPARE` elements in inline storage of `N`.
///
/// Inserting into a full container does not grow it: the element pushed past the bound is handed
/// back to the caller instead, which is how node splits receive their pending overflow entry.
/// Every other way of exceeding the bound panics.
#[derive(Clone)]
pub(crate) struct Bounded<T, const N: usize, const SPARE: usize> {
    items: SmallVec<[T; N]>,
}

impl<T, const N: usize, const SPARE: usize> Bounded<T, N, SPARE> {
    /// Maximum number of elements.
    pub(crate) const LIMIT: usize = N - SPARE;

    pub(crate) fn new() -> Self {
        Self { items: SmallVec::new() }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() == Self::LIMIT
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// When the container is already full, the rightmost element of the would-be sequence is
    /// returned: the previous last element, or `value` itself when `index == LIMIT`.
    pub(crate) fn insert(&mut self, index: usize, value: T) -> Option<T> {
        assert!(index <= self.items.len(), "`Bounded::insert()` - `index` out of bounds!");
        if !self.is_full() {
            self.items.insert(index, value);
            return None;
        }
        if index == Self::LIMIT {
            return Some(value);
        }
        let displaced = self.items.pop();
        self.items.insert(index, value);
        displaced
    }

    pub(crate) fn remove(&mut self, index: usize) -> T {
        assert!(index < self.items.len(), "`Bounded::remove()` - `index` out of bounds!");
        self.items.remove(index)
    }

    pub(crate) fn push(&mut self, value: T) {
        assert!(!self.is_full(), "`Bounded::push()` - container is full!");
        self.items.push(value);
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Replaces the element at `index`, returning the old one.
    pub(crate) fn replace(&mut self, index: usize, value: T) -> T {
        core::mem::replace(&mut self.items[index], value)
    }

    /// Moves the elements at `at..` out, in order.
    pub(crate) fn split_off(&mut self, at: usize) -> SmallVec<[T; N]> {
        assert!(at <= self.items.len(), "`Bounded::split_off()` - `at` out of bounds!");
        self.items.drain(at..).collect()
    }

    /// Appends every element of `other`, panicking if the bound would be exceeded.
    pub(crate) fn extend<I: IntoIterator<Item = T>>(&mut self, other: I) {
        for value in other {
            self.push(value);
        }
    }
}

impl<T, const N: usize, const SPARE: usize> Deref for Bounded<T, N, SPARE> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

// Element-wise mutation only; the length can change solely through the bounded methods.
impl<T, const N: usize, const SPARE: usize> DerefMut for Bounded<T, N, SPARE> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T, const N: usize, const SPARE: usize> IntoIterator for Bounded<T, N, SPARE> {
    type Item = T;
    type IntoIter = smallvec::IntoIter<[T; N]>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
