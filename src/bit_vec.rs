//! Bit-granular stream collaborators. Bits are packed most-significant first.

use crate::error::{Error, Result};

/// Sink for variable-length codes.
pub trait BitWrite {
    /// Write the low `bits` bits of `value`, most significant first.
    fn write_bits(&mut self, value: u64, bits: u32) -> Result<()>;

    /// Zero-pad up to the next byte boundary.
    fn align(&mut self) -> Result<()>;

    /// Bits written so far.
    fn bit_len(&self) -> usize;
}

/// Source of variable-length codes.
pub trait BitRead {
    /// Return the next `bits` bits right-aligned without moving the cursor.
    fn peek_bits(&self, bits: u32) -> Result<u64>;

    /// Advance the cursor by `bits`.
    fn skip_bits(&mut self, bits: u32) -> Result<()>;

    /// Bits between the cursor and the end of the stream.
    fn remaining_bits(&self) -> usize;

    /// Cursor position in bits.
    fn position(&self) -> usize;
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bits: Vec<u8>,
    bit_count: usize,
}

impl BitVec {
    pub fn new() -> Self {
        BitVec {
            bits: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8; // which byte is target?
        let bit_offset = self.bit_count % 8; // which bit position is target?

        // make a new byte if needed
        if byte_index >= self.bits.len() {
            self.bits.push(0);
        }

        if bit {
            self.bits[byte_index] |= 1 << (7 - bit_offset);
        }

        self.bit_count += 1;
    }

    pub fn push_bits(&mut self, code: u64, bit_length: u32) {
        for bit_pos in (0..bit_length).rev() {
            let bit = (code >> bit_pos) & 1;
            self.push_bit(bit != 0);
        }
    }

    /// Reader over the bits written so far.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::with_bit_len(&self.bits, self.bit_count)
    }
}

impl BitWrite for BitVec {
    fn write_bits(&mut self, value: u64, bits: u32) -> Result<()> {
        if bits > u64::BITS {
            return Err(Error::configuration(format!(
                "cannot write {} bits from a 64-bit value",
                bits
            )));
        }
        self.push_bits(value, bits);
        Ok(())
    }

    fn align(&mut self) -> Result<()> {
        let pad = (8 - self.bit_count % 8) % 8;
        self.push_bits(0, pad as u32);
        Ok(())
    }

    fn bit_len(&self) -> usize {
        self.bit_count
    }
}

impl From<(usize, Vec<u8>)> for BitVec {
    fn from((bit_count, bits): (usize, Vec<u8>)) -> Self {
        BitVec { bits, bit_count }
    }
}

/// Cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Read every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_len(data, data.len() * 8)
    }

    /// Read only the first `bit_len` bits of `data`.
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Self {
        BitReader {
            data,
            bit_len: bit_len.min(data.len() * 8),
            pos: 0,
        }
    }
}

impl BitRead for BitReader<'_> {
    fn peek_bits(&self, bits: u32) -> Result<u64> {
        if bits > u64::BITS {
            return Err(Error::configuration(format!(
                "cannot peek {} bits into a 64-bit value",
                bits
            )));
        }
        let available = self.remaining_bits();
        if bits as usize > available {
            return Err(Error::underrun(bits as usize, available));
        }

        let mut value = 0u64;
        let mut pos = self.pos;
        let mut need = bits;
        while need > 0 {
            let byte = self.data[pos / 8] as u64;
            let avail = 8 - (pos % 8) as u32;
            let take = avail.min(need);
            let chunk = (byte >> (avail - take)) & ((1u64 << take) - 1);
            value = (value << take) | chunk;
            pos += take as usize;
            need -= take;
        }
        Ok(value)
    }

    fn skip_bits(&mut self, bits: u32) -> Result<()> {
        let available = self.remaining_bits();
        if bits as usize > available {
            return Err(Error::underrun(bits as usize, available));
        }
        self.pos += bits as usize;
        Ok(())
    }

    fn remaining_bits(&self) -> usize {
        self.bit_len - self.pos
    }

    fn position(&self) -> usize {
        self.pos
    }
}
