//! Static storage for array literals.

/// Array literals of a module, laid out from address 0.
///
/// Each literal gets its own region, sized like an argument array
/// (`stride * (length + 1)` bytes) and aligned to 8 bytes. Evaluating a
/// literal rewrites its region, so the contents seen by the body are always
/// the literal's own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiteralArena {
    size: u32,
    count: u32,
}

impl LiteralArena {
    const ALIGN: u32 = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes reserved so far; argument arrays are laid out after this.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of literals placed.
    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reserve a region for `length` elements of `stride` bytes and return
    /// its base address.
    pub(crate) fn allocate(&mut self, stride: u32, length: u32) -> u32 {
        let base = self.size.next_multiple_of(Self::ALIGN);
        let bytes = stride.saturating_mul(length.saturating_add(1));
        self.size = base.saturating_add(bytes);
        self.count += 1;
        base
    }
}
