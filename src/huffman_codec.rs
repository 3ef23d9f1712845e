use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::bit_vec::{BitRead, BitWrite};
use crate::canonical::canonicalize;
use crate::config::{CoderConfig, TableStrategy};
use crate::decode_table::DecodeTable;
use crate::error::{Error, Result};
use crate::hufftree::{HuffmanTree, Vlc};

/// A symbol with its frequency and canonical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    pub symbol: u64,
    pub frequency: u64,
    pub vlc: Vlc,
}

/// Finalized, immutable code set and decode table.
#[derive(Debug, Clone)]
pub struct Codebook {
    leaves: Vec<SymbolCode>, // insertion order
    symtab: HashMap<u64, usize>,
    order: Vec<usize>,
    max_len: u32,
    table: DecodeTable,
}

impl Codebook {
    /// Build codes for `symbols` (`(symbol, frequency)` pairs). The number of
    /// pairs must equal `config.capacity`.
    pub fn build(symbols: &[(u64, u64)], config: &CoderConfig) -> Result<Self> {
        config.validate()?;
        if symbols.len() != config.capacity {
            return Err(Error::configuration(format!(
                "expected {} symbols, got {}",
                config.capacity,
                symbols.len()
            )));
        }

        let mut symtab = HashMap::with_capacity(symbols.len());
        for (leaf, &(symbol, _)) in symbols.iter().enumerate() {
            if symtab.insert(symbol, leaf).is_some() {
                return Err(Error::configuration(format!("duplicate symbol {}", symbol)));
            }
        }

        let frequencies: Vec<u64> = symbols.iter().map(|&(_, frequency)| frequency).collect();
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let (raw, _) = tree.assign_codes()?;

        let lengths: Vec<u32> = raw.iter().map(|vlc| vlc.len).collect();
        let canonical = canonicalize(&lengths)?;
        if canonical.max_len > config.max_code_len {
            return Err(Error::configuration(format!(
                "longest code is {} bits, limit is {}",
                canonical.max_len, config.max_code_len
            )));
        }

        let strategy = config.resolve_strategy(canonical.max_len);
        let table = DecodeTable::build(strategy, &canonical.codes, &canonical.order, canonical.max_len)?;

        match &table {
            DecodeTable::Flat(flat) => debug!(
                symbols = symbols.len(),
                max_len = canonical.max_len,
                window = flat.bits(),
                entries = flat.len(),
                "built flat huffman decode table"
            ),
            DecodeTable::MultiLevel(multi) => debug!(
                symbols = symbols.len(),
                max_len = canonical.max_len,
                window = multi.bits(),
                pages = multi.page_count(),
                "built multi-level huffman decode table"
            ),
        }

        let leaves = symbols
            .iter()
            .zip(&canonical.codes)
            .map(|(&(symbol, frequency), &vlc)| SymbolCode {
                symbol,
                frequency,
                vlc,
            })
            .collect();

        Ok(Codebook {
            leaves,
            symtab,
            order: canonical.order,
            max_len: canonical.max_len,
            table,
        })
    }

    fn leaf(&self, symbol: u64) -> Result<&SymbolCode> {
        self.symtab
            .get(&symbol)
            .map(|&leaf| &self.leaves[leaf])
            .ok_or(Error::UnknownSymbol { symbol })
    }

    /// Code and length for `symbol`.
    pub fn get_vlc(&self, symbol: u64) -> Result<Vlc> {
        self.leaf(symbol).map(|leaf| leaf.vlc)
    }

    pub fn encode<W: BitWrite + ?Sized>(&self, symbol: u64, stream: &mut W) -> Result<()> {
        let vlc = self.get_vlc(symbol)?;
        stream.write_bits(vlc.code, vlc.len)
    }

    pub fn encode_all<W, I>(&self, symbols: I, stream: &mut W) -> Result<()>
    where
        W: BitWrite + ?Sized,
        I: IntoIterator<Item = u64>,
    {
        for symbol in symbols {
            self.encode(symbol, stream)?;
        }
        Ok(())
    }

    /// Write a window of zero bits and byte-align, so a reader that always
    /// peeks a full window never runs off the end.
    pub fn finish<W: BitWrite + ?Sized>(&self, stream: &mut W) -> Result<()> {
        stream.write_bits(0, self.table_bits())?;
        stream.align()
    }

    /// Decode one symbol, consuming exactly its code length.
    ///
    /// Near the end of the stream the window is zero-extended; decoding only
    /// fails if the resolved code is longer than the bits that remain.
    pub fn decode<R: BitRead + ?Sized>(&self, stream: &mut R) -> Result<u64> {
        let window_bits = self.table_bits();
        let available = stream.remaining_bits();
        if available == 0 {
            return Err(Error::underrun(window_bits as usize, 0));
        }

        let take = window_bits.min(available.min(u32::MAX as usize) as u32);
        let window = stream.peek_bits(take)? << (window_bits - take);
        let leaf = &self.leaves[self.table.lookup(window)?];

        if leaf.vlc.len > take {
            return Err(Error::underrun(leaf.vlc.len as usize, available));
        }
        stream.skip_bits(leaf.vlc.len)?;
        Ok(leaf.symbol)
    }

    /// Decode `count` symbols.
    pub fn decode_n<R: BitRead + ?Sized>(&self, count: usize, stream: &mut R) -> Result<Vec<u64>> {
        (0..count).map(|_| self.decode(stream)).collect()
    }

    /// Look up a left-justified `table_bits()`-wide window without a stream.
    pub fn resolve(&self, window: u64) -> Result<SymbolCode> {
        let leaf = self.table.lookup(window)?;
        Ok(self.leaves[leaf])
    }

    /// Symbols in canonical order.
    pub fn codes(&self) -> impl Iterator<Item = &SymbolCode> + '_ {
        self.order.iter().map(move |&leaf| &self.leaves[leaf])
    }

    /// Length of the longest code.
    pub fn max_code_len(&self) -> u32 {
        self.max_len
    }

    /// Bits peeked per decode: the longest code, rounded up to whole bytes
    /// for multi-level tables.
    pub fn table_bits(&self) -> u32 {
        self.table.bits()
    }

    pub fn strategy(&self) -> TableStrategy {
        self.table.strategy()
    }

    pub fn table(&self) -> &DecodeTable {
        &self.table
    }

    pub fn symbol_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn contains(&self, symbol: u64) -> bool {
        self.symtab.contains_key(&symbol)
    }
}

/// Incrementally filled coder. Codes and tables are built when the
/// `capacity`-th symbol is inserted; afterwards the coder is read-only.
#[derive(Debug, Clone)]
pub struct HuffCoder {
    config: CoderConfig,
    pending: Vec<(u64, u64)>,
    seen: HashSet<u64>,
    codebook: Option<Codebook>,
}

impl HuffCoder {
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(CoderConfig::new(capacity))
    }

    pub fn with_config(config: CoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(HuffCoder {
            pending: Vec::with_capacity(config.capacity),
            seen: HashSet::with_capacity(config.capacity),
            config,
            codebook: None,
        })
    }

    /// Insert every pair and return the finalized coder.
    pub fn from_frequencies<I>(config: CoderConfig, symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut coder = Self::with_config(config)?;
        for (symbol, frequency) in symbols {
            coder.insert(symbol, frequency)?;
        }
        coder.codebook()?;
        Ok(coder)
    }

    /// Add a symbol. The insertion that fills the alphabet builds the tree,
    /// the canonical codes and the decode table.
    pub fn insert(&mut self, symbol: u64, frequency: u64) -> Result<&mut Self> {
        if self.codebook.is_some() {
            return Err(Error::configuration("coder is already finalized"));
        }
        if self.pending.len() >= self.config.capacity {
            return Err(Error::configuration(format!(
                "all {} symbols already inserted",
                self.config.capacity
            )));
        }
        if !self.seen.insert(symbol) {
            return Err(Error::configuration(format!("duplicate symbol {}", symbol)));
        }

        self.pending.push((symbol, frequency));
        if self.pending.len() == self.config.capacity {
            self.codebook = Some(Codebook::build(&self.pending, &self.config)?);
            self.pending = Vec::new();
            self.seen = HashSet::new();
        }
        Ok(self)
    }

    pub fn is_finalized(&self) -> bool {
        self.codebook.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    pub fn codebook(&self) -> Result<&Codebook> {
        self.codebook.as_ref().ok_or(Error::NotFinalized {
            inserted: self.pending.len(),
            capacity: self.config.capacity,
        })
    }

    pub fn into_codebook(self) -> Result<Codebook> {
        let inserted = self.pending.len();
        self.codebook.ok_or(Error::NotFinalized {
            inserted,
            capacity: self.config.capacity,
        })
    }

    pub fn encode<W: BitWrite + ?Sized>(&self, symbol: u64, stream: &mut W) -> Result<()> {
        self.codebook()?.encode(symbol, stream)
    }

    pub fn get_vlc(&self, symbol: u64) -> Result<Vlc> {
        self.codebook()?.get_vlc(symbol)
    }

    pub fn decode<R: BitRead + ?Sized>(&self, stream: &mut R) -> Result<u64> {
        self.codebook()?.decode(stream)
    }

    pub fn encode_all<W, I>(&self, symbols: I, stream: &mut W) -> Result<()>
    where
        W: BitWrite + ?Sized,
        I: IntoIterator<Item = u64>,
    {
        self.codebook()?.encode_all(symbols, stream)
    }

    pub fn decode_n<R: BitRead + ?Sized>(&self, count: usize, stream: &mut R) -> Result<Vec<u64>> {
        self.codebook()?.decode_n(count, stream)
    }

    pub fn get_symbol(&self, window: u64) -> Result<SymbolCode> {
        self.codebook()?.resolve(window)
    }

    pub fn finish<W: BitWrite + ?Sized>(&self, stream: &mut W) -> Result<()> {
        self.codebook()?.finish(stream)
    }

    pub fn max_code_len(&self) -> Result<u32> {
        Ok(self.codebook()?.max_code_len())
    }

    pub fn table_bits(&self) -> Result<u32> {
        Ok(self.codebook()?.table_bits())
    }
}
