use core::ops::Range;




/**
 * The two logical axes of a mesh: `I` runs along x, `J` along y.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
}




/**
 * A rectangular block of cell indexes. Interior cells of a mesh are numbered
 * from zero, so ghost cells have negative indexes on the low side and
 * indexes at or past the interior size on the high side.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpace {
    ranges: [Range<i64>; 2],
}




// ============================================================================
impl IndexSpace {

    pub fn new(i: Range<i64>, j: Range<i64>) -> Self {
        assert!(
            i.start <= i.end && j.start <= j.end,
            "index block {:?} x {:?} is inverted", i, j);
        Self { ranges: [i, j] }
    }

    /**
     * The index block of `size` interior cells, starting at the origin.
     */
    pub fn interior(size: (usize, usize)) -> Self {
        Self::new(0..size.0 as i64, 0..size.1 as i64)
    }

    pub fn range(&self, axis: Axis) -> Range<i64> {
        self.ranges[axis as usize].clone()
    }

    /**
     * The number of cells along each axis.
     */
    pub fn dim(&self) -> (usize, usize) {
        let count = |r: &Range<i64>| (r.end - r.start) as usize;
        (count(&self.ranges[0]), count(&self.ranges[1]))
    }

    pub fn len(&self) -> usize {
        let (m, n) = self.dim();
        m * n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
     * The lowest index on each axis.
     */
    pub fn start(&self) -> (i64, i64) {
        (self.ranges[0].start, self.ranges[1].start)
    }

    pub fn includes(&self, other: &Self) -> bool {
        self.ranges.iter().zip(other.ranges.iter()).all(|(outer, inner)| {
            inner.start >= outer.start && inner.end <= outer.end
        })
    }

    /**
     * Grow the block by `n_ghost_layers` cells on every side.
     */
    pub fn with_ghosts(&self, n_ghost_layers: usize) -> Self {
        let g = n_ghost_layers as i64;
        let [i, j] = &self.ranges;
        Self::new(i.start - g .. i.end + g, j.start - g .. j.end + g)
    }

    /**
     * Replace the range along one axis, keeping the other.
     */
    pub fn with_range(&self, axis: Axis, range: Range<i64>) -> Self {
        let mut ranges = self.ranges.clone();
        ranges[axis as usize] = range;
        let [i, j] = ranges;
        Self::new(i, j)
    }

    /**
     * The cells of this block lying before `inner` along `axis`, across the
     * full range of the other axis. For a padded cell block and its interior
     * this is the low-side ghost region.
     */
    pub fn lower_slab(&self, inner: &Self, axis: Axis) -> Self {
        self.with_range(axis, self.range(axis).start .. inner.range(axis).start)
    }

    /**
     * The cells of this block lying after `inner` along `axis`.
     */
    pub fn upper_slab(&self, inner: &Self, axis: Axis) -> Self {
        self.with_range(axis, inner.range(axis).end .. self.range(axis).end)
    }

    /**
     * Convert this block to zero-based array ranges within a buffer that
     * holds `parent`.
     */
    pub fn memory_region_in(&self, parent: &Self) -> (Range<usize>, Range<usize>) {
        assert!(parent.includes(self), "{:?} lies outside {:?}", self, parent);

        let (pi, pj) = parent.start();
        let local = |r: &Range<i64>, p: i64| (r.start - p) as usize .. (r.end - p) as usize;
        (local(&self.ranges[0], pi), local(&self.ranges[1], pj))
    }
}
