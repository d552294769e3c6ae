//! # Slot Pool
//!
//! Generational slot allocator for objects that are frequently created and
//! destroyed but must keep a stable identity while alive.

/// A growable pool of slots addressed by generational handles.
///
/// Storage grows with amortized doubling. Growth goes through
/// `try_reserve`, so an allocation failure surfaces as `None` from
/// [`SlotPool::allocate`] rather than aborting the process.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Own it from one thread or wrap it in a mutex.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: SlotPool<&str> = SlotPool::with_capacity(16);
///
/// let handle = pool.allocate("knight")?;
/// pool.free(handle);
///
/// // The slot is reused, the old handle is not.
/// let again = pool.allocate("bishop")?;
/// assert!(pool.get(handle).is_none());
/// ```
pub struct SlotPool<T> {
    /// Slot storage.
    slots: Vec<Slot<T>>,
    /// Free list - indices of vacant slots.
    free_list: Vec<u32>,
    /// Number of occupied slots.
    allocated_count: usize,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Handle to an occupied slot in a [`SlotPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle {
    index: u32,
    generation: u32,
}

impl SlotHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> SlotPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            allocated_count: 0,
        }
    }

    /// Creates an empty pool with room for `capacity` objects.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            allocated_count: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.allocated_count
    }

    /// Returns true if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.allocated_count == 0
    }

    /// Stores `value` and returns its handle.
    ///
    /// Reuses a vacant slot when one exists, otherwise grows the storage.
    ///
    /// # Returns
    ///
    /// `None` if the storage could not grow.
    pub fn allocate(&mut self, value: T) -> Option<SlotHandle> {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.allocated_count += 1;
            return Some(SlotHandle {
                index,
                generation: slot.generation,
            });
        }

        let index = u32::try_from(self.slots.len()).ok()?;
        self.slots.try_reserve(1).ok()?;
        // Keep the free list able to hold every slot so `free` never allocates.
        let wanted = self.slots.len() + 1;
        self.free_list.try_reserve(wanted - self.free_list.len()).ok()?;

        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.allocated_count += 1;
        Some(SlotHandle {
            index,
            generation: 0,
        })
    }

    /// Frees an occupied slot.
    ///
    /// # Returns
    ///
    /// The stored object, or `None` if the handle was stale.
    pub fn free(&mut self, handle: SlotHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.allocated_count -= 1;
        Some(value)
    }

    /// Returns true if `handle` still refers to a live object.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Gets a reference to a live object.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets a mutable reference to a live object.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Frees every object. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            // Slot count is bounded by u32 in `allocate`.
            #[allow(clippy::cast_possible_truncation)]
            self.free_list.push(index as u32);
        }
        self.allocated_count = 0;
    }

    /// Iterates over all live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|v| (Self::handle_at(index, slot.generation), v))
        })
    }

    /// Iterates mutably over all live objects in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|v| (Self::handle_at(index, generation), v))
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn handle_at(index: usize, generation: u32) -> SlotHandle {
        SlotHandle {
            index: index as u32,
            generation,
        }
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
