//! Generational handle table.
//!
//! A `Handle` packs a 16-bit slot index with a 16-bit generation tag
//! (`(unique << 16) | index`, `unique != 0`). Resolving a handle succeeds
//! only while the slot's tag matches, so a handle that outlives its payload
//! degrades into a silent miss instead of touching reused storage. Dispatch
//! code leans on that: calling through a freed handler is a no-op.
//!
//! Invariants:
//! * `unique` is never 0 for a live slot; freeing a slot zeroes its tag.
//! * Two handles live at the same time never compare equal.
//! * Storage grows by fixed chunks; freed slots are recycled via a free list.

/// Opaque generational identifier. `Handle::NULL` never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    fn index(&self) -> usize {
        (self.0 & 0xffff) as usize
    }

    fn unique(&self) -> u16 {
        (self.0 >> 16) as u16
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

const CHUNK: usize = 32;
const UNIQUE_INVALID: u16 = 0;

#[derive(Debug)]
struct Entry<T> {
    payload: Option<T>,
    unique: u16,
    next_free: Option<usize>,
}

/// Arena of `T` addressed by generational handles.
#[derive(Debug)]
pub struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    first_free: Option<usize>,
    unique: u16,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            first_free: None,
            unique: UNIQUE_INVALID,
        }
    }

    /// Store `payload` and return a fresh handle to it.
    pub fn alloc(&mut self, payload: T) -> Handle {
        if self.first_free.is_none() {
            self.grow();
        }
        let index = self.first_free.expect("grow populated the free list");
        assert!(index <= u16::MAX as usize, "handle table exhausted");

        let entry = &mut self.entries[index];
        self.first_free = entry.next_free;
        entry.next_free = None;
        entry.payload = Some(payload);

        self.unique = self.unique.wrapping_add(1);
        if self.unique == UNIQUE_INVALID {
            self.unique = 1;
        }
        entry.unique = self.unique;

        Handle(((self.unique as u32) << 16) | index as u32)
    }

    /// Invalidate `h` and drop its payload. Stale or null handles are
    /// ignored.
    pub fn free(&mut self, h: Handle) -> Option<T> {
        if self.get(h).is_none() {
            return None;
        }
        let index = h.index();
        let entry = &mut self.entries[index];
        let payload = entry.payload.take();
        entry.unique = UNIQUE_INVALID;
        entry.next_free = self.first_free;
        self.first_free = Some(index);
        payload
    }

    /// Resolve `h` to its payload, or `None` when stale, freed, or null.
    pub fn get(&self, h: Handle) -> Option<&T> {
        let index = h.index();
        let entry = self.entries.get(index)?;
        if entry.unique != UNIQUE_INVALID && entry.unique == h.unique() {
            entry.payload.as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        let index = h.index();
        let entry = self.entries.get_mut(index)?;
        if entry.unique != UNIQUE_INVALID && entry.unique == h.unique() {
            entry.payload.as_mut()
        } else {
            None
        }
    }

    fn grow(&mut self) {
        let start = self.entries.len();
        self.entries.reserve(CHUNK);
        for _ in 0..CHUNK {
            self.entries.push(Entry {
                payload: None,
                unique: UNIQUE_INVALID,
                next_free: None,
            });
        }
        // Link the new slots onto the free list back to front so the lowest
        // index is handed out first.
        for index in (start..start + CHUNK).rev() {
            self.entries[index].next_free = self.first_free;
            self.first_free = Some(index);
        }
    }
}
