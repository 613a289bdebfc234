//! Static flat KD-tree over projected positions.
//!
//! The index is built once from a list of positions and never mutated. The
//! backing arrays are reordered in place so that every `node_size` bucket is
//! a leaf and every bucket boundary is a median split, alternating between the
//! x and y axes. Queries walk the implicit tree with an explicit stack owned by
//! the returned iterator:
//!
//! - [`KdIndex::range`]: positions inside a closed rectangle
//! - [`KdIndex::within`]: positions within a Euclidean radius
//!
//! Both yield slot numbers, i.e. positions in the original input order. Each
//! call starts a fresh traversal, so any number of iterators can run over the
//! same index at once.
//!
//! Equal coordinates are ordered by slot, which keeps the layout and query
//! output deterministic for a given input.

/// Slot numbers are stored as `u32` to halve the id array.
type Slot = u32;

/// Static 2D index over a fixed set of positions.
#[derive(Debug, Clone)]
pub struct KdIndex {
    node_size: usize,
    ids: Vec<Slot>,
    coords: Vec<f64>,
}

/// Sort key: coordinate on the active axis, then slot.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Key(f64, Slot);

impl KdIndex {
    /// Build an index over `points`; slot `i` is the `i`-th point.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster::compute::kdtree::KdIndex;
    ///
    /// let index = KdIndex::new([(0.1, 0.1), (0.5, 0.5), (0.9, 0.9)], 64);
    /// let hits: Vec<usize> = index.range(0.0, 0.0, 0.6, 0.6).collect();
    /// assert_eq!(hits, vec![0, 1]);
    /// ```
    pub fn new<I>(points: I, node_size: usize) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points = points.into_iter();
        let (lower, _) = points.size_hint();
        let mut ids = Vec::with_capacity(lower);
        let mut coords = Vec::with_capacity(lower * 2);

        for (slot, (x, y)) in points.enumerate() {
            ids.push(slot as Slot);
            coords.push(x);
            coords.push(y);
        }

        let mut index = Self {
            node_size: node_size.max(1),
            ids,
            coords,
        };

        if index.ids.len() > 1 {
            let last = index.ids.len() - 1;
            index.sort(0, last, 0);
        }

        index
    }

    /// Number of indexed positions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All slots whose position lies in `[min_x, max_x] × [min_y, max_y]`.
    pub fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> RangeHits<'_> {
        Hits::new(
            self,
            Window {
                min_x,
                min_y,
                max_x,
                max_y,
            },
        )
    }

    /// All slots whose position lies within distance `radius` of `(x, y)`.
    pub fn within(&self, x: f64, y: f64, radius: f64) -> WithinHits<'_> {
        Hits::new(
            self,
            Disc {
                x,
                y,
                radius,
                radius_sq: radius * radius,
            },
        )
    }

    #[inline]
    fn point(&self, i: usize) -> (f64, f64) {
        (self.coords[2 * i], self.coords[2 * i + 1])
    }

    #[inline]
    fn key(&self, i: isize, axis: usize) -> Key {
        let i = i as usize;
        Key(self.coords[2 * i + axis], self.ids[i])
    }

    fn sort(&mut self, left: usize, right: usize, axis: usize) {
        if right - left <= self.node_size {
            return;
        }

        let m = (left + right) >> 1;

        self.select(m as isize, left as isize, right as isize, axis);

        self.sort(left, m - 1, 1 - axis);
        self.sort(m + 1, right, 1 - axis);
    }

    /// Floyd-Rivest selection: rearrange `[left, right]` so that the item at
    /// `k` has every smaller key before it and every larger key after it.
    fn select(&mut self, k: isize, mut left: isize, mut right: isize, axis: usize) {
        while right > left {
            if right - left > 600 {
                let n = (right - left + 1) as f64;
                let m = (k - left + 1) as f64;
                let z = n.ln();
                let s = 0.5 * (2.0 * z / 3.0).exp();
                let sign = if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
                let sd = 0.5 * (z * s * (n - s) / n).sqrt() * sign;
                let new_left = left.max((k as f64 - m * s / n + sd).floor() as isize);
                let new_right = right.min((k as f64 + (n - m) * s / n + sd).floor() as isize);

                self.select(k, new_left, new_right, axis);
            }

            let t = self.key(k, axis);
            let mut i = left;
            let mut j = right;

            self.swap_item(left, k);

            if self.key(right, axis) > t {
                self.swap_item(left, right);
            }

            while i < j {
                self.swap_item(i, j);
                i += 1;
                j -= 1;

                while self.key(i, axis) < t {
                    i += 1;
                }

                while self.key(j, axis) > t {
                    j -= 1;
                }
            }

            if self.key(left, axis) == t {
                self.swap_item(left, j);
            } else {
                j += 1;
                self.swap_item(j, right);
            }

            if j <= k {
                left = j + 1;
            }
            if k <= j {
                right = j - 1;
            }
        }
    }

    #[inline]
    fn swap_item(&mut self, i: isize, j: isize) {
        let (i, j) = (i as usize, j as usize);
        self.ids.swap(i, j);
        self.coords.swap(2 * i, 2 * j);
        self.coords.swap(2 * i + 1, 2 * j + 1);
    }
}

/// Query shape driving a traversal.
pub trait Region {
    /// Whether the position matches the query.
    fn contains(&self, x: f64, y: f64) -> bool;

    /// Whether the query extends to coordinates `<= split` on `axis`.
    fn reaches_low(&self, axis: usize, split: f64) -> bool;

    /// Whether the query extends to coordinates `>= split` on `axis`.
    fn reaches_high(&self, axis: usize, split: f64) -> bool;
}

/// Closed axis-aligned rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Region for Window {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    #[inline]
    fn reaches_low(&self, axis: usize, split: f64) -> bool {
        if axis == 0 {
            self.min_x <= split
        } else {
            self.min_y <= split
        }
    }

    #[inline]
    fn reaches_high(&self, axis: usize, split: f64) -> bool {
        if axis == 0 {
            self.max_x >= split
        } else {
            self.max_y >= split
        }
    }
}

/// Closed disc.
#[derive(Debug, Clone, Copy)]
pub struct Disc {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    radius_sq: f64,
}

impl Region for Disc {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        sq_dist(x, y, self.x, self.y) <= self.radius_sq
    }

    #[inline]
    fn reaches_low(&self, axis: usize, split: f64) -> bool {
        if axis == 0 {
            self.x - self.radius <= split
        } else {
            self.y - self.radius <= split
        }
    }

    #[inline]
    fn reaches_high(&self, axis: usize, split: f64) -> bool {
        if axis == 0 {
            self.x + self.radius >= split
        } else {
            self.y + self.radius >= split
        }
    }
}

/// Lazy traversal yielding the slots matched by a [`Region`].
#[derive(Debug, Clone)]
pub struct Hits<'a, R> {
    index: &'a KdIndex,
    region: R,
    /// Pending subtrees as `(left, right, axis)`.
    stack: Vec<(usize, usize, usize)>,
    /// Leaf bucket being scanned as `(next, last)`.
    scan: Option<(usize, usize)>,
}

pub type RangeHits<'a> = Hits<'a, Window>;
pub type WithinHits<'a> = Hits<'a, Disc>;

impl<'a, R: Region> Hits<'a, R> {
    fn new(index: &'a KdIndex, region: R) -> Self {
        let stack = if index.is_empty() {
            Vec::new()
        } else {
            vec![(0, index.len() - 1, 0)]
        };

        Self {
            index,
            region,
            stack,
            scan: None,
        }
    }
}

impl<R: Region> Iterator for Hits<'_, R> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some((i, last)) = self.scan {
                self.scan = if i < last { Some((i + 1, last)) } else { None };
                let (x, y) = self.index.point(i);
                if self.region.contains(x, y) {
                    return Some(self.index.ids[i] as usize);
                }
                continue;
            }

            let (left, right, axis) = self.stack.pop()?;

            if right - left <= self.index.node_size {
                self.scan = Some((left, right));
                continue;
            }

            let m = (left + right) >> 1;
            let (x, y) = self.index.point(m);
            let split = if axis == 0 { x } else { y };

            // Low half is pushed last so it is visited first.
            if self.region.reaches_high(axis, split) {
                self.stack.push((m + 1, right, 1 - axis));
            }
            if self.region.reaches_low(axis, split) {
                self.stack.push((left, m - 1, 1 - axis));
            }

            if self.region.contains(x, y) {
                return Some(self.index.ids[m] as usize);
            }
        }
    }
}

#[inline]
fn sq_dist(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}
