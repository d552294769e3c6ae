//! Insertion-ordered widget list.
//!
//! Nodes live in a [`SlotPool`] and are linked by handle, so unlinking is
//! O(1) and handles stay valid while the rest of the list changes.

use gambit_core::{SlotHandle, SlotPool};

struct Node<T> {
    value: T,
    prev: Option<SlotHandle>,
    next: Option<SlotHandle>,
}

/// Doubly linked list over a slot pool.
pub struct WidgetList<T> {
    nodes: SlotPool<Node<T>>,
    head: Option<SlotHandle>,
    tail: Option<SlotHandle>,
}

impl<T> WidgetList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotPool::new(),
            head: None,
            tail: None,
        }
    }

    /// Number of linked values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a value at the end (drawn last, picked first).
    ///
    /// Returns `None` if node storage could not grow.
    pub fn push_back(&mut self, value: T) -> Option<SlotHandle> {
        let handle = self.nodes.allocate(Node {
            value,
            prev: self.tail,
            next: None,
        })?;
        match self.tail.and_then(|tail| self.nodes.get_mut(tail)) {
            Some(tail) => tail.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        Some(handle)
    }

    /// Unlinks and returns a value. Stale handles return `None`.
    pub fn remove(&mut self, handle: SlotHandle) -> Option<T> {
        let node = self.nodes.free(handle)?;

        match node.prev.and_then(|prev| self.nodes.get_mut(prev)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.nodes.get_mut(next)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.value)
    }

    /// Returns true if the handle is linked.
    #[must_use]
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.nodes.contains(handle)
    }

    /// Value by handle.
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.nodes.get(handle).map(|node| &node.value)
    }

    /// Mutable value by handle.
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.nodes.get_mut(handle).map(|node| &mut node.value)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Iterates newest first.
    pub fn iter_rev(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.tail,
            forward: false,
        }
    }

    /// Unlinks everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<T> Default for WidgetList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`WidgetList`].
pub struct Iter<'a, T> {
    list: &'a WidgetList<T>,
    cursor: Option<SlotHandle>,
    forward: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let node = self.list.nodes.get(handle)?;
        self.cursor = if self.forward { node.next } else { node.prev };
        Some((handle, &node.value))
    }
}
