use crate::morph::MorphNode;

/// Stable index of a morph inside its [`MorphArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MorphHandle(pub(crate) u32);

/// Owning storage for every live morph of one render.
///
/// Parents refer to their children by handle. Released slots are reused
/// through the free list before the storage vector grows.
#[derive(Debug, Default)]
pub struct MorphArena {
    entries: Vec<Option<MorphNode>>,
    free_list: Vec<u32>,
    total_allocations: usize,
}

impl MorphArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: MorphNode) -> MorphHandle {
        self.total_allocations += 1;
        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(node);
            MorphHandle(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(node));
            MorphHandle(idx)
        }
    }

    pub fn get(&self, handle: MorphHandle) -> Option<&MorphNode> {
        self.entries.get(handle.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: MorphHandle) -> Option<&mut MorphNode> {
        self.entries.get_mut(handle.0 as usize)?.as_mut()
    }

    /// Moves a node out so it can be updated while the arena is borrowed
    /// for its children. The slot stays reserved until [`Self::restore`].
    pub(crate) fn take(&mut self, handle: MorphHandle) -> Option<MorphNode> {
        self.entries.get_mut(handle.0 as usize)?.take()
    }

    pub(crate) fn restore(&mut self, handle: MorphHandle, node: MorphNode) {
        if let Some(entry) = self.entries.get_mut(handle.0 as usize) {
            *entry = Some(node);
        }
    }

    /// Frees `handle` and every morph it owns.
    pub fn release(&mut self, handle: MorphHandle) {
        let Some(node) = self.take(handle) else {
            return;
        };
        for child in node.children() {
            self.release(child);
        }
        self.free_list.push(handle.0);
    }

    /// Number of live morphs.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }
}
