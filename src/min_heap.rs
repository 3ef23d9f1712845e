use crate::error::Error;

/// Binary min-heap over `Ord` keys. Callers make keys unique (e.g. by
/// pairing a weight with an id) so pop order never depends on heap layout.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { elements: vec![] }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapErr {
    KeyError(usize, usize),
    HeapUnderflow,
}

impl From<HeapErr> for Error {
    fn from(e: HeapErr) -> Self {
        match e {
            HeapErr::KeyError(i, size) => {
                Error::invariant(format!("heap index {} out of range {}", i, size))
            }
            HeapErr::HeapUnderflow => Error::invariant("priority queue ran out of nodes"),
        }
    }
}

impl<T: Ord> MinHeap<T> {
    /// Bulk insert followed by a single heapify.
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        heap.make_heap();
        heap
    }

    /// Append without restoring heap order; call [`make_heap`](Self::make_heap) afterwards.
    pub fn push_unordered(&mut self, value: T) {
        self.elements.push(value);
    }

    pub fn make_heap(&mut self) {
        let n = self.heap_size();
        for i in (0..n / 2).rev() {
            self.min_heapify(i);
        }
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size()).all(|i| self.elements[Self::parent(i)] <= self.elements[i])
    }

    fn min_heapify(&mut self, mut i: usize) {
        let n = self.heap_size();
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;

            if l < n && self.elements[l] < self.elements[smallest] {
                smallest = l;
            }
            if r < n && self.elements[r] < self.elements[smallest] {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = Self::parent(i);
            if self.elements[p] <= self.elements[i] {
                return;
            }
            self.elements.swap(i, p);
            i = p;
        }
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        let last = self.heap_size() - 1;
        self.sift_up(last);
    }

    pub fn peek_min(&self) -> Option<&T> {
        self.elements.first()
    }

    pub fn extract_min(&mut self) -> Result<T, HeapErr> {
        if self.is_empty() {
            return Err(HeapErr::HeapUnderflow);
        }
        let result = self.elements.swap_remove(0);
        if !self.is_empty() {
            self.min_heapify(0);
        }
        Ok(result)
    }

    /// Swap the minimum for `value` with a single sift-down.
    pub fn replace_min(&mut self, value: T) -> Result<T, HeapErr> {
        match self.elements.first_mut() {
            None => Err(HeapErr::HeapUnderflow),
            Some(top) => {
                let result = std::mem::replace(top, value);
                self.min_heapify(0);
                Ok(result)
            }
        }
    }

    /// Drop the minimum, optionally putting `replacement` in its place, and
    /// report how many elements remain.
    pub fn pop(&mut self, replacement: Option<T>) -> Result<usize, HeapErr> {
        match replacement {
            Some(value) => self.replace_min(value)?,
            None => self.extract_min()?,
        };
        Ok(self.heap_size())
    }

    pub fn get(&self, i: usize) -> Result<&T, HeapErr> {
        self.elements
            .get(i)
            .ok_or(HeapErr::KeyError(i, self.heap_size()))
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
