//! Run-length encoded value arrays.
//!
//! A [`RunArray`] maps every position of a sequence to a value by storing
//! maximal runs of equal values. Values live once in a small arena; runs
//! refer to them by index. Every mutation re-merges neighbouring runs, so
//! two adjacent runs never hold equal values and the run lengths always sum
//! to [`RunArray::len`].

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    len: usize,
    value: u32,
}

/// Run-length encoded mapping from position to value.
#[derive(Clone, Debug)]
pub struct RunArray<T> {
    values: Vec<T>,
    runs: Vec<Run>,
    /// Start offset of each run, kept in step with `runs` for binary search.
    starts: Vec<usize>,
    len: usize,
}

impl<T> Default for RunArray<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            runs: Vec::new(),
            starts: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Clone + PartialEq> RunArray<T> {
    /// Create an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array of `len` positions holding one value.
    #[must_use]
    pub fn with_value(len: usize, value: T) -> Self {
        let mut array = Self::new();
        if len > 0 {
            array.values.push(value);
            array.runs.push(Run { len, value: 0 });
            array.starts.push(0);
            array.len = len;
        }
        array
    }

    /// Number of positions covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of maximal runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_index(&self, pos: usize) -> usize {
        debug_assert!(pos < self.len);
        self.starts.partition_point(|&start| start <= pos) - 1
    }

    fn value(&self, run: Run) -> &T {
        &self.values[run.value as usize]
    }

    /// Value at `pos`, or `None` past the end.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&T> {
        if pos >= self.len {
            return None;
        }
        Some(self.value(self.runs[self.run_index(pos)]))
    }

    /// Bounds of the run containing `pos`.
    #[must_use]
    pub fn run_range(&self, pos: usize) -> Option<Range<usize>> {
        if pos >= self.len {
            return None;
        }
        let idx = self.run_index(pos);
        let start = self.starts[idx];
        Some(start..start + self.runs[idx].len)
    }

    /// Iterate over all runs.
    pub fn iter(&self) -> impl Iterator<Item = (Range<usize>, &T)> + '_ {
        self.iter_range(0..self.len)
    }

    /// Iterate over the runs overlapping `range`, clipped to it.
    pub fn iter_range(&self, range: Range<usize>) -> impl Iterator<Item = (Range<usize>, &T)> + '_ {
        let first = if range.start < self.len {
            self.run_index(range.start)
        } else {
            self.runs.len()
        };
        let (lo, hi) = (range.start, range.end);
        self.runs[first..]
            .iter()
            .zip(&self.starts[first..])
            .map(move |(run, &start)| {
                let clipped = start.max(lo)..(start + run.len).min(hi);
                (clipped, self.value(*run))
            })
            .take_while(|(r, _)| r.start < r.end)
    }

    /// Copy out the runs of `range` as a new array.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..=len`.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        assert!(range.start <= range.end && range.end <= self.len);
        let mut out = Self::new();
        let mut runs = Vec::new();
        for (r, value) in self.iter_range(range) {
            let value = out.intern(value.clone());
            runs.push(Run {
                len: r.len(),
                value,
            });
        }
        out.rebuild(runs);
        out
    }

    /// Replace `range` with the runs of `other`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..=len`.
    pub fn replace(&mut self, range: Range<usize>, other: &Self) {
        assert!(range.start <= range.end && range.end <= self.len);
        let inserted: Vec<Run> = other
            .runs
            .iter()
            .map(|run| Run {
                len: run.len,
                value: self.intern(other.value(*run).clone()),
            })
            .collect();
        self.splice(range, inserted);
    }

    /// Replace `range` with `len` positions holding `value`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..=len`.
    pub fn replace_with(&mut self, range: Range<usize>, len: usize, value: T) {
        assert!(range.start <= range.end && range.end <= self.len);
        let value = self.intern(value);
        self.splice(range, [Run { len, value }]);
    }

    /// Set every position of `range` to `value`.
    pub fn set(&mut self, range: Range<usize>, value: T) {
        let len = range.len();
        self.replace_with(range, len, value);
    }

    /// Transform every run overlapping `range`; only runs whose value
    /// actually changes are rewritten. Returns whether anything changed.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..=len`.
    pub fn map_range(&mut self, range: Range<usize>, mut f: impl FnMut(&T) -> T) -> bool {
        assert!(range.start <= range.end && range.end <= self.len);
        let mut changed = false;
        let pieces: Vec<(usize, T)> = self
            .iter_range(range.clone())
            .map(|(r, value)| {
                let mapped = f(value);
                changed |= mapped != *value;
                (r.len(), mapped)
            })
            .collect();
        if !changed {
            return false;
        }
        let inserted: Vec<Run> = pieces
            .into_iter()
            .map(|(len, value)| Run {
                len,
                value: self.intern(value),
            })
            .collect();
        self.splice(range, inserted);
        true
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(idx) = self.values.iter().position(|v| *v == value) {
            return idx as u32;
        }
        self.values.push(value);
        (self.values.len() - 1) as u32
    }

    fn splice(&mut self, range: Range<usize>, inserted: impl IntoIterator<Item = Run>) {
        let mut out = Vec::with_capacity(self.runs.len() + 2);
        let mut tail = Vec::new();
        for (run, &start) in self.runs.iter().zip(&self.starts) {
            let end = start + run.len;
            if start < range.start {
                out.push(Run {
                    len: end.min(range.start) - start,
                    value: run.value,
                });
            }
            if end > range.end {
                tail.push(Run {
                    len: end - start.max(range.end),
                    value: run.value,
                });
            }
        }
        out.extend(inserted);
        out.extend(tail);
        self.rebuild(out);
    }

    fn rebuild(&mut self, runs: Vec<Run>) {
        self.runs.clear();
        for run in runs.into_iter().filter(|r| r.len > 0) {
            match self.runs.last_mut() {
                Some(last) if last.value == run.value => last.len += run.len,
                _ => self.runs.push(run),
            }
        }
        self.starts.clear();
        let mut offset = 0;
        for run in &self.runs {
            self.starts.push(offset);
            offset += run.len;
        }
        self.len = offset;

        if self.values.len() > self.runs.len() * 2 + 8 {
            self.compact();
        }
    }

    /// Drop arena values no run refers to.
    fn compact(&mut self) {
        let mut remap = vec![u32::MAX; self.values.len()];
        let mut values = Vec::with_capacity(self.runs.len());
        for run in &mut self.runs {
            let old = run.value as usize;
            if remap[old] == u32::MAX {
                remap[old] = values.len() as u32;
                values.push(self.values[old].clone());
            }
            run.value = remap[old];
        }
        self.values = values;
    }
}

impl<T: Clone + PartialEq> PartialEq for RunArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}
