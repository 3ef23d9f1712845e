//! Decode tables mapping a left-justified window of stream bits to a leaf.
//!
//! - **Flat**: `2^max_len` entries, one per window value. Only viable for
//!   short codes.
//! - **Multi-level**: 256-entry pages keyed by `(bit offset, prefix so far)`.
//!   The window is `max_len` rounded up to whole bytes and decoding consumes
//!   it one byte per page until a leaf is found.

use std::collections::HashMap;

use crate::config::{TableStrategy, DEFAULT_FLAT_LIMIT, FLAT_MAX_BITS, MAX_CODE_LEN, PAGE_BITS, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::hufftree::Vlc;

/// One slot of a multi-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    /// Not written by any code yet.
    #[default]
    Empty,
    /// Codes through this slot continue on the next page.
    Continuation,
    /// Code terminates here; holds the leaf index.
    Leaf(usize),
}

pub type Page = [Slot; PAGE_SIZE];

fn window_mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

#[derive(Debug, Clone)]
pub struct FlatTable {
    entries: Vec<usize>,
    bits: u32,
}

impl FlatTable {
    /// `codes` is indexed by leaf, `order` lists leaves in canonical order.
    pub fn build(codes: &[Vlc], order: &[usize], max_len: u32) -> Result<Self> {
        if max_len == 0 || max_len > FLAT_MAX_BITS {
            return Err(Error::configuration(format!(
                "flat decode table supports codes of 1..={} bits, got {}",
                FLAT_MAX_BITS, max_len
            )));
        }

        let size = 1usize << max_len;
        let mut entries = Vec::with_capacity(size);

        // canonical ranges tile the table in order
        for &leaf in order {
            let vlc = codes[leaf];
            if vlc.len == 0 || vlc.len > max_len {
                return Err(Error::invariant(format!(
                    "leaf {} has length {} outside table width {}",
                    leaf, vlc.len, max_len
                )));
            }
            let shift = max_len - vlc.len;
            let start = (vlc.code << shift) as usize;
            let end = ((vlc.code + 1) << shift) as usize;
            if start != entries.len() || end > size {
                return Err(Error::invariant(format!(
                    "leaf {} range {}..{} does not continue table at {}",
                    leaf,
                    start,
                    end,
                    entries.len()
                )));
            }
            entries.resize(end, leaf);
        }

        if entries.len() != size {
            match order {
                // lone symbol: every window decodes to it
                [only] => entries.resize(size, *only),
                _ => {
                    return Err(Error::invariant(format!(
                        "flat table covers {} of {} entries",
                        entries.len(),
                        size
                    )))
                }
            }
        }

        Ok(FlatTable {
            entries,
            bits: max_len,
        })
    }

    pub fn lookup(&self, window: u64) -> Result<usize> {
        let index = (window & window_mask(self.bits)) as usize;
        self.entries
            .get(index)
            .copied()
            .ok_or_else(|| Error::invariant(format!("flat table has no entry {}", index)))
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Packs the bit offset into the top byte and the prefix into the low 56 bits.
fn page_key(bit_offset: u32, prefix: u64) -> u64 {
    (u64::from(bit_offset) << MAX_CODE_LEN) | prefix
}

#[derive(Debug, Clone)]
pub struct MultiLevelTable {
    pages: HashMap<u64, Box<Page>>,
    bits: u32,
}

impl MultiLevelTable {
    /// `codes` is indexed by leaf; `max_len` is rounded up to a multiple of 8.
    pub fn build(codes: &[Vlc], max_len: u32) -> Result<Self> {
        let bits = round_to_page(max_len);
        if max_len == 0 || bits > MAX_CODE_LEN {
            return Err(Error::configuration(format!(
                "multi-level decode table supports codes of 1..={} bits, got {}",
                MAX_CODE_LEN, max_len
            )));
        }

        let mut table = MultiLevelTable {
            pages: HashMap::new(),
            bits,
        };

        for (leaf, vlc) in codes.iter().enumerate() {
            if vlc.len == 0 || vlc.len > max_len {
                return Err(Error::invariant(format!(
                    "leaf {} has length {} outside table width {}",
                    leaf, vlc.len, max_len
                )));
            }
            let window = vlc.code << (bits - vlc.len);

            let mut offset = 0;
            while vlc.len > offset + PAGE_BITS {
                let index = table.slot_index(window, offset);
                let page = table.page_mut(window, offset);
                if let Slot::Leaf(other) = page[index] {
                    return Err(Error::invariant(format!(
                        "leaf {} continues through slot {} held by leaf {}",
                        leaf, index, other
                    )));
                }
                page[index] = Slot::Continuation;
                offset += PAGE_BITS;
            }

            let index = table.slot_index(window, offset);
            let page = table.page_mut(window, offset);
            if page[index] != Slot::Empty {
                return Err(Error::invariant(format!(
                    "leaf {} collides with {:?} at bit offset {} slot {}",
                    leaf, page[index], offset, index
                )));
            }
            page[index] = Slot::Leaf(leaf);
        }

        for page in table.pages.values_mut() {
            forward_fill(page)?;
        }

        Ok(table)
    }

    fn slot_index(&self, window: u64, offset: u32) -> usize {
        ((window >> (self.bits - offset - PAGE_BITS)) & 0xFF) as usize
    }

    fn prefix(&self, window: u64, offset: u32) -> u64 {
        window >> (self.bits - offset)
    }

    fn page_mut(&mut self, window: u64, offset: u32) -> &mut Page {
        let key = page_key(offset, self.prefix(window, offset));
        self.pages
            .entry(key)
            .or_insert_with(|| Box::new([Slot::Empty; PAGE_SIZE]))
    }

    /// Page reached after consuming `bit_offset` bits equal to `prefix`.
    pub fn page(&self, bit_offset: u32, prefix: u64) -> Option<&Page> {
        self.pages.get(&page_key(bit_offset, prefix)).map(|p| &**p)
    }

    pub fn lookup(&self, window: u64) -> Result<usize> {
        let window = window & window_mask(self.bits);
        let mut offset = 0;
        while offset < self.bits {
            let page = self.page(offset, self.prefix(window, offset)).ok_or_else(|| {
                Error::invariant(format!("no decode page at bit offset {}", offset))
            })?;
            match page[self.slot_index(window, offset)] {
                Slot::Leaf(leaf) => return Ok(leaf),
                Slot::Continuation => offset += PAGE_BITS,
                Slot::Empty => {
                    return Err(Error::invariant(format!(
                        "unfilled decode slot at bit offset {}",
                        offset
                    )))
                }
            }
        }
        Err(Error::invariant("code runs past the decode window"))
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn round_to_page(max_len: u32) -> u32 {
    (max_len + PAGE_BITS - 1) & !(PAGE_BITS - 1)
}

/// A code ending inside a page owns every slot up to the next written one.
fn forward_fill(page: &mut Page) -> Result<()> {
    let mut current = None;
    for (index, slot) in page.iter_mut().enumerate() {
        match *slot {
            Slot::Leaf(leaf) => current = Some(leaf),
            Slot::Continuation => current = None,
            Slot::Empty => match current {
                Some(leaf) => *slot = Slot::Leaf(leaf),
                None => {
                    return Err(Error::invariant(format!(
                        "decode slot {} is not covered by any code",
                        index
                    )))
                }
            },
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub enum DecodeTable {
    Flat(FlatTable),
    MultiLevel(MultiLevelTable),
}

impl DecodeTable {
    /// Build the table for `strategy`. `Auto` uses the default flat limit.
    pub fn build(strategy: TableStrategy, codes: &[Vlc], order: &[usize], max_len: u32) -> Result<Self> {
        match strategy {
            TableStrategy::Flat => FlatTable::build(codes, order, max_len).map(DecodeTable::Flat),
            TableStrategy::MultiLevel => MultiLevelTable::build(codes, max_len).map(DecodeTable::MultiLevel),
            TableStrategy::Auto if max_len <= DEFAULT_FLAT_LIMIT => {
                FlatTable::build(codes, order, max_len).map(DecodeTable::Flat)
            }
            TableStrategy::Auto => MultiLevelTable::build(codes, max_len).map(DecodeTable::MultiLevel),
        }
    }

    /// Resolve a `bits()`-wide left-justified window to a leaf index.
    pub fn lookup(&self, window: u64) -> Result<usize> {
        match self {
            DecodeTable::Flat(table) => table.lookup(window),
            DecodeTable::MultiLevel(table) => table.lookup(window),
        }
    }

    /// Width of the window peeked per decode.
    pub fn bits(&self) -> u32 {
        match self {
            DecodeTable::Flat(table) => table.bits(),
            DecodeTable::MultiLevel(table) => table.bits(),
        }
    }

    pub fn strategy(&self) -> TableStrategy {
        match self {
            DecodeTable::Flat(_) => TableStrategy::Flat,
            DecodeTable::MultiLevel(_) => TableStrategy::MultiLevel,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::canonical::canonicalize;

    fn textbook() -> (Vec<Vlc>, Vec<usize>) {
        let canonical = canonicalize(&[4, 4, 3, 3, 3, 1]).unwrap();
        (canonical.codes, canonical.order)
    }

    #[test]
    fn test_flat_ranges() {
        let (codes, order) = textbook();
        let table = FlatTable::build(&codes, &order, 4).unwrap();
        assert_eq!(table.len(), 16);
        for window in 0..8 {
            assert_eq!(table.lookup(window).unwrap(), 5);
        }
        assert_eq!(table.lookup(0b1000).unwrap(), 2);
        assert_eq!(table.lookup(0b1001).unwrap(), 2);
        assert_eq!(table.lookup(0b1011).unwrap(), 3);
        assert_eq!(table.lookup(0b1101).unwrap(), 4);
        assert_eq!(table.lookup(0b1110).unwrap(), 0);
        assert_eq!(table.lookup(0b1111).unwrap(), 1);
    }

    #[test]
    fn test_flat_rejects_wide_tables() {
        let (codes, order) = textbook();
        assert!(matches!(
            FlatTable::build(&codes, &order, FLAT_MAX_BITS + 1),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_flat_rejects_out_of_order() {
        let (codes, mut order) = textbook();
        order.swap(0, 1);
        assert!(matches!(
            FlatTable::build(&codes, &order, 4),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_multi_level_single_page() {
        let (codes, _) = textbook();
        let table = MultiLevelTable::build(&codes, 4).unwrap();
        assert_eq!(table.bits(), 8);
        assert_eq!(table.page_count(), 1);

        let page = table.page(0, 0).unwrap();
        assert!(page[..0x80].iter().all(|s| *s == Slot::Leaf(5)));
        assert!(page[0x80..0xA0].iter().all(|s| *s == Slot::Leaf(2)));
        assert!(page[0xE0..0xF0].iter().all(|s| *s == Slot::Leaf(0)));
        assert!(page[0xF0..].iter().all(|s| *s == Slot::Leaf(1)));
    }

    #[test]
    fn test_multi_level_chains_pages() {
        // lengths 1, 2, ..., 9, 10, 10
        let mut lengths: Vec<u32> = (1..=10).collect();
        lengths.push(10);
        let canonical = canonicalize(&lengths).unwrap();
        let table = MultiLevelTable::build(&canonical.codes, canonical.max_len).unwrap();
        assert_eq!(table.bits(), 16);
        // codes of length 9 and 10 share the all-ones first byte
        assert_eq!(table.page_count(), 2);
        assert_eq!(table.page(0, 0).unwrap()[0xFF], Slot::Continuation);
        assert!(table.page(8, 0xFF).is_some());

        for (leaf, vlc) in canonical.codes.iter().enumerate() {
            let window = vlc.code << (16 - vlc.len);
            assert_eq!(table.lookup(window).unwrap(), leaf);
            // any trailing bits resolve to the same leaf
            let noisy = window | window_mask(16 - vlc.len);
            assert_eq!(table.lookup(noisy).unwrap(), leaf);
        }
    }

    #[test]
    fn test_multi_level_rejects_57_bits() {
        let codes = vec![Vlc::new(0, 1)];
        assert!(matches!(
            MultiLevelTable::build(&codes, 57),
            Err(Error::Configuration { .. })
        ));
        // 49..=56 rounds to 56 and is accepted
        assert_eq!(round_to_page(49), 56);
        assert_eq!(round_to_page(56), 56);
        assert_eq!(round_to_page(1), 8);
    }

    #[test]
    fn test_multi_level_collision() {
        let codes = vec![Vlc::new(0, 1), Vlc::new(0, 1)];
        assert!(matches!(
            MultiLevelTable::build(&codes, 1),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_forward_fill_requires_slot_zero() {
        let mut page = [Slot::Empty; PAGE_SIZE];
        page[1] = Slot::Leaf(0);
        assert!(forward_fill(&mut page).is_err());
    }

    #[test]
    fn test_lone_symbol_tables() {
        let codes = vec![Vlc::new(0, 1)];
        let flat = DecodeTable::build(TableStrategy::Flat, &codes, &[0], 1).unwrap();
        let multi = DecodeTable::build(TableStrategy::MultiLevel, &codes, &[0], 1).unwrap();
        assert_eq!(flat.bits(), 1);
        assert_eq!(multi.bits(), 8);
        assert_eq!(flat.lookup(1).unwrap(), 0);
        assert_eq!(multi.lookup(0xFF).unwrap(), 0);
    }

    #[test]
    fn test_strategies_agree() {
        let lengths = [3, 5, 5, 4, 2, 2, 4, 5, 5, 3];
        let canonical = canonicalize(&lengths).unwrap();
        let max_len = canonical.max_len;
        let flat = DecodeTable::build(TableStrategy::Flat, &canonical.codes, &canonical.order, max_len).unwrap();
        let multi =
            DecodeTable::build(TableStrategy::MultiLevel, &canonical.codes, &canonical.order, max_len).unwrap();
        assert_eq!(flat.strategy(), TableStrategy::Flat);
        assert_eq!(multi.strategy(), TableStrategy::MultiLevel);

        let pad = multi.bits() - flat.bits();
        for window in 0..(1u64 << max_len) {
            assert_eq!(flat.lookup(window).unwrap(), multi.lookup(window << pad).unwrap());
        }
    }
}
