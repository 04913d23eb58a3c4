//! Array memory layout.
//!
//! An array argument occupies `stride * (length + 1)` bytes: a 4-byte
//! little-endian length word at its base, then the elements, 4 bytes each
//! for `Int32Array` and 8 for `Float64Array`. Element `i` therefore lives at
//! `base + stride * (i + 1)`, and index `-1` reads the length word.
//!
//! Arrays are placed back to back in argument order after a reserved prefix
//! (the module's static literal area), and the whole segment is rounded up
//! to whole pages.

use ember_ir::{Value, ValueType};
use smallvec::SmallVec;

use crate::HostError;

/// Size of a linear memory page.
pub const PAGE_SIZE: u32 = 65_536;

/// Largest linear memory a 32-bit module can address.
const MAX_BYTES: u64 = 1 << 32;

/// Every array's length word starts on this boundary.
const ARRAY_ALIGN: u64 = 8;

/// Where one array argument lives in a segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArrayPlacement {
    /// Argument position.
    pub position: usize,
    /// Byte address of the length word.
    pub base: u32,
    pub element: ValueType,
    pub length: u32,
}

impl ArrayPlacement {
    fn stride(&self) -> usize {
        match self.element {
            ValueType::Float64 => 8,
            _ => 4,
        }
    }

    /// Bytes occupied, length word included.
    pub fn size(&self) -> usize {
        self.stride() * (self.length as usize + 1)
    }

    fn element_offset(&self, index: usize) -> usize {
        self.base as usize + self.stride() * (index + 1)
    }

    /// Read the elements back from `memory`. `None` if the placement does
    /// not fit in it.
    pub fn read(&self, memory: &[u8]) -> Option<Vec<f64>> {
        (0..self.length as usize)
            .map(|index| {
                let offset = self.element_offset(index);
                match self.element {
                    ValueType::Float64 => memory
                        .get(offset..offset + 8)
                        .and_then(|bytes| bytes.try_into().ok())
                        .map(f64::from_le_bytes),
                    _ => memory
                        .get(offset..offset + 4)
                        .and_then(|bytes| bytes.try_into().ok())
                        .map(|word| f64::from(i32::from_le_bytes(word))),
                }
            })
            .collect()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "Int32Array elements are checked to be integral and in range before layout"
    )]
    fn write(&self, items: &[f64], memory: &mut [u8]) {
        let base = self.base as usize;
        memory[base..base + 4].copy_from_slice(&self.length.to_le_bytes());
        for (index, item) in items.iter().enumerate() {
            let offset = self.element_offset(index);
            match self.element {
                ValueType::Float64 => {
                    memory[offset..offset + 8].copy_from_slice(&item.to_le_bytes());
                }
                _ => memory[offset..offset + 4].copy_from_slice(&(*item as i32).to_le_bytes()),
            }
        }
    }
}

/// The linear memory for one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct MemorySegment {
    bytes: Vec<u8>,
    placements: SmallVec<[ArrayPlacement; 4]>,
}

impl MemorySegment {
    /// Lay out the array arguments among `args` after `reserved` bytes,
    /// each on an 8-byte boundary.
    ///
    /// `args` must already have been checked against `params`.
    pub fn layout(reserved: u32, args: &[Value], params: &[ValueType]) -> Result<Self, HostError> {
        let too_large = || HostError::Memory("array arguments exceed 4 GiB".to_owned());

        let mut placements: SmallVec<[ArrayPlacement; 4]> = SmallVec::new();
        let mut next = u64::from(reserved);
        for (position, (arg, ty)) in args.iter().zip(params).enumerate() {
            let (Value::Array(items), Some(element), Some(stride)) =
                (arg, ty.element_type(), ty.element_stride())
            else {
                continue;
            };
            let length = u32::try_from(items.len()).map_err(|_| too_large())?;
            let aligned = next.next_multiple_of(ARRAY_ALIGN);
            let base = u32::try_from(aligned).map_err(|_| too_large())?;
            next = aligned + u64::from(stride) * (u64::from(length) + 1);
            placements.push(ArrayPlacement {
                position,
                base,
                element,
                length,
            });
        }

        let size = next.next_multiple_of(u64::from(PAGE_SIZE));
        if size > MAX_BYTES {
            return Err(too_large());
        }
        let mut bytes = vec![0; usize::try_from(size).map_err(|_| too_large())?];
        for placement in &placements {
            let items = args[placement.position].as_array().unwrap_or_default();
            placement.write(items, &mut bytes);
        }
        tracing::debug!(
            reserved,
            arrays = placements.len(),
            bytes = bytes.len(),
            "memory segment laid out"
        );
        Ok(MemorySegment { bytes, placements })
    }

    /// Size in pages.
    pub fn pages(&self) -> u32 {
        u32::try_from(self.bytes.len() / PAGE_SIZE as usize).unwrap_or(u32::MAX)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Initial contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn placements(&self) -> &[ArrayPlacement] {
        &self.placements
    }

    /// Placement of the array argument at `position`.
    pub fn placement(&self, position: usize) -> Option<&ArrayPlacement> {
        self.placements.iter().find(|p| p.position == position)
    }
}
