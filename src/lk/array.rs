//! Array representation of a tour with O(1) orientation flips.

/// A tour stored as a position-indexed array plus a reversal flag.
///
/// `next`/`prev` follow the logical orientation. Reversing a path swaps
/// whichever of the path and its complement is shorter; reversing the
/// complement yields the same cycle read backwards, which is absorbed by
/// toggling the flag.
#[derive(Debug, Clone)]
pub(crate) struct ArrayTour {
    order: Vec<usize>,
    pos: Vec<usize>,
    reversed: bool,
}

impl ArrayTour {
    pub(crate) fn new(order: Vec<usize>) -> Self {
        let mut pos = vec![0; order.len()];
        for (i, &v) in order.iter().enumerate() {
            pos[v] = i;
        }
        Self {
            order,
            pos,
            reversed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub(crate) fn next(&self, v: usize) -> usize {
        let n = self.order.len();
        let p = self.pos[v];
        if self.reversed {
            self.order[(p + n - 1) % n]
        } else {
            self.order[(p + 1) % n]
        }
    }

    #[inline]
    pub(crate) fn prev(&self, v: usize) -> usize {
        let n = self.order.len();
        let p = self.pos[v];
        if self.reversed {
            self.order[(p + 1) % n]
        } else {
            self.order[(p + n - 1) % n]
        }
    }

    /// Reads the tour backwards from now on.
    #[inline]
    pub(crate) fn flip_orientation(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Reverses the logical path that starts at `from` and walks forward to `to`.
    pub(crate) fn reverse_path(&mut self, from: usize, to: usize) {
        let n = self.order.len();
        // Physical segment [start, start + len) holding the path.
        let (start, end) = if self.reversed {
            (self.pos[to], self.pos[from])
        } else {
            (self.pos[from], self.pos[to])
        };
        let len = (end + n - start) % n + 1;
        if 2 * len <= n {
            self.reverse_physical(start, len);
        } else {
            let inner = n - len;
            if inner > 1 {
                self.reverse_physical((end + 1) % n, inner);
            }
            self.reversed = !self.reversed;
        }
    }

    fn reverse_physical(&mut self, start: usize, len: usize) {
        let n = self.order.len();
        for k in 0..len / 2 {
            let a = (start + k) % n;
            let b = (start + len - 1 - k) % n;
            self.order.swap(a, b);
            self.pos[self.order[a]] = a;
            self.pos[self.order[b]] = b;
        }
    }

    /// The tour in logical order, starting from the first stored node.
    pub(crate) fn to_order(&self) -> Vec<usize> {
        let n = self.order.len();
        let mut out = Vec::with_capacity(n);
        if n == 0 {
            return out;
        }
        let mut v = self.order[0];
        for _ in 0..n {
            out.push(v);
            v = self.next(v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(t: &ArrayTour) -> Vec<usize> {
        // Rotate so that node 0 is first, keep logical orientation.
        let order = t.to_order();
        let p = order.iter().position(|&v| v == 0).unwrap();
        (0..order.len()).map(|i| order[(p + i) % order.len()]).collect()
    }

    #[test]
    fn test_next_prev() {
        let t = ArrayTour::new(vec![0, 1, 2, 3, 4]);
        assert_eq!(t.next(4), 0);
        assert_eq!(t.prev(0), 4);
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_reverse_short_path() {
        let mut t = ArrayTour::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        t.reverse_path(2, 4);
        assert_eq!(cycle(&t), vec![0, 1, 4, 3, 2, 5, 6, 7]);
    }

    #[test]
    fn test_reverse_long_path_uses_complement() {
        let mut t = ArrayTour::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        t.reverse_path(1, 6);
        assert_eq!(cycle(&t), vec![0, 6, 5, 4, 3, 2, 1, 7]);
        assert_eq!(t.next(0), 6);
        assert_eq!(t.prev(0), 7);
    }

    #[test]
    fn test_reverse_wrapping_path_and_undo() {
        let mut t = ArrayTour::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        t.reverse_path(6, 1);
        assert_eq!(t.next(5), 1);
        assert_eq!(t.next(6), 2);
        t.reverse_path(1, 6);
        assert_eq!(cycle(&t), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_flip_orientation() {
        let mut t = ArrayTour::new(vec![0, 1, 2, 3]);
        t.flip_orientation();
        assert_eq!(t.next(0), 3);
        t.reverse_path(3, 2);
        assert_eq!(t.next(0), 2);
        assert_eq!(t.next(2), 3);
        assert_eq!(t.next(3), 1);
    }
}
