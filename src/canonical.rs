//! Canonical code reassignment.
//!
//! Leaves are enumerated by `(length, insertion index)`. The first gets code
//! 0; each following code is the previous one plus one, shifted left by the
//! growth in length. Equal-length codes are therefore consecutive integers.

use crate::config::MAX_CODE_LEN;
use crate::error::{Error, Result};
use crate::hufftree::Vlc;
use crate::min_heap::MinHeap;

/// Canonical codes for an alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCode {
    /// Codes indexed by leaf.
    pub codes: Vec<Vlc>,
    /// Leaf indices in canonical order.
    pub order: Vec<usize>,
    /// Length of the longest code.
    pub max_len: u32,
}

/// Reassign canonical codes from per-leaf code lengths.
pub fn canonicalize(lengths: &[u32]) -> Result<CanonicalCode> {
    if lengths.is_empty() {
        return Err(Error::configuration("no code lengths to canonicalize"));
    }

    let mut heap = MinHeap::build(
        lengths
            .iter()
            .enumerate()
            .map(|(leaf, &len)| (len, leaf))
            .collect(),
    );

    let mut codes = vec![Vlc::default(); lengths.len()];
    let mut order = Vec::with_capacity(lengths.len());
    let mut prev: Option<Vlc> = None;

    while let Some(&(len, leaf)) = heap.peek_min() {
        heap.pop(None)?;
        if len == 0 || len > MAX_CODE_LEN {
            return Err(Error::invariant(format!(
                "leaf {} has unusable code length {}",
                leaf, len
            )));
        }

        let code = match prev {
            None => 0,
            Some(p) => (p.code + 1) << (len - p.len),
        };
        let vlc = Vlc::new(code, len);
        codes[leaf] = vlc;
        order.push(leaf);
        prev = Some(vlc);
    }

    let last = prev.ok_or_else(|| Error::invariant("canonical pass produced no codes"))?;
    // a lone symbol keeps its one-bit code and leaves half the space unused
    if lengths.len() > 1 && last.code != (1u64 << last.len) - 1 {
        return Err(Error::invariant(format!(
            "code lengths do not form a complete prefix code (last code {:#x} of length {})",
            last.code, last.len
        )));
    }

    Ok(CanonicalCode {
        codes,
        order,
        max_len: last.len,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_textbook_codes() {
        let canonical = canonicalize(&[4, 4, 3, 3, 3, 1]).unwrap();
        assert_eq!(canonical.order, vec![5, 2, 3, 4, 0, 1]);
        assert_eq!(
            canonical.codes,
            vec![
                Vlc::new(0b1110, 4),
                Vlc::new(0b1111, 4),
                Vlc::new(0b100, 3),
                Vlc::new(0b101, 3),
                Vlc::new(0b110, 3),
                Vlc::new(0b0, 1),
            ]
        );
        assert_eq!(canonical.max_len, 4);
    }

    #[test]
    fn test_shift_and_increment() {
        let canonical = canonicalize(&[2, 3, 1, 3]).unwrap();
        let ordered: Vec<Vlc> = canonical.order.iter().map(|&i| canonical.codes[i]).collect();
        for pair in ordered.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(b.code, (a.code + 1) << (b.len - a.len));
        }
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let canonical = canonicalize(&[2, 2, 2, 2]).unwrap();
        assert_eq!(canonical.order, vec![0, 1, 2, 3]);
        let codes: Vec<u64> = canonical.codes.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_single_symbol() {
        let canonical = canonicalize(&[1]).unwrap();
        assert_eq!(canonical.codes, vec![Vlc::new(0, 1)]);
    }

    #[test]
    fn test_oversubscribed() {
        assert!(matches!(
            canonicalize(&[1, 1, 1]),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_incomplete() {
        assert!(matches!(
            canonicalize(&[1, 2]),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_zero_length() {
        assert!(canonicalize(&[0, 1]).is_err());
    }
}
