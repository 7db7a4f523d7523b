/// Vertical offsets of feed rows, kept in a Fenwick (binary indexed) tree.
///
/// | Operation | Time |
/// |-----------|------|
/// | `push` | O(log n) |
/// | `set_height` | O(log n) |
/// | `offset_of` / `total_height` | O(log n) |
/// | `row_at_offset` | O(log n) |
/// | `rebuild` | O(n) |
///
/// A height change only touches the tree nodes covering rows at or after the
/// changed one, so rows above it keep their offsets and nothing is remeasured.

#[derive(Debug, Clone, Default)]
pub struct RowLayout {
    /// 1-based Fenwick nodes; `tree[0]` is unused.
    tree: Vec<u64>,
    heights: Vec<u32>,
}

#[inline]
fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

impl RowLayout {
    pub fn new() -> Self {
        Self {
            tree: vec![0],
            heights: Vec::new(),
        }
    }

    /// Layout for `len` rows of the same height.
    pub fn uniform(len: usize, height: u32) -> Self {
        let mut layout = Self::new();
        layout.rebuild(std::iter::repeat_n(height, len));
        layout
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn height(&self, row: usize) -> Option<u32> {
        self.heights.get(row).copied()
    }

    /// Append a row at the bottom.
    pub fn push(&mut self, height: u32) {
        if self.tree.is_empty() {
            self.tree.push(0);
        }
        self.heights.push(height);
        let j = self.heights.len();
        // Node j covers rows (j - lowbit(j), j].
        let covered = self.prefix(j - 1) - self.prefix(j - lowbit(j));
        self.tree.push(u64::from(height) + covered);
    }

    /// Change the height of an existing row. Out-of-range rows are ignored.
    pub fn set_height(&mut self, row: usize, height: u32) {
        let Some(old) = self.heights.get_mut(row) else {
            return;
        };
        if *old == height {
            return;
        }
        let delta = i64::from(height) - i64::from(*old);
        *old = height;
        let n = self.heights.len();
        let mut j = row + 1;
        while j <= n {
            self.tree[j] = self.tree[j].wrapping_add_signed(delta);
            j += lowbit(j);
        }
    }

    /// Sum of the heights of the first `count` rows.
    fn prefix(&self, count: usize) -> u64 {
        let mut j = count.min(self.heights.len());
        let mut sum = 0;
        while j > 0 {
            sum += self.tree[j];
            j -= lowbit(j);
        }
        sum
    }

    /// Top offset of `row`. Rows past the end sit at the total height.
    pub fn offset_of(&self, row: usize) -> u64 {
        self.prefix(row)
    }

    pub fn total_height(&self) -> u64 {
        self.prefix(self.heights.len())
    }

    /// Row whose span `[offset_of(r), offset_of(r + 1))` contains `offset`.
    /// Returns `len()` when the offset is at or past the bottom.
    pub fn row_at_offset(&self, offset: u64) -> usize {
        let n = self.heights.len();
        if n == 0 {
            return 0;
        }
        let mut pos = 0;
        let mut remaining = offset;
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        pos
    }

    /// Replace every row height in O(n).
    pub fn rebuild(&mut self, heights: impl IntoIterator<Item = u32>) {
        self.heights = heights.into_iter().collect();
        let n = self.heights.len();
        self.tree = Vec::with_capacity(n + 1);
        self.tree.push(0);
        self.tree.extend(self.heights.iter().map(|&h| u64::from(h)));
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                self.tree[parent] += self.tree[i];
            }
        }
    }

    pub fn clear(&mut self) {
        self.rebuild(std::iter::empty());
    }
}
