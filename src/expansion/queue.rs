//! Bucketed priority queue of label indices.
//!
//! Costs inside the active window map to fixed-width buckets; anything beyond
//! the window waits in an overflow list until the buckets drain, then the
//! window slides forward to the cheapest overflow entry. Ordering inside a
//! bucket is not strict, which is fine for a search that only counts edges.

/// Cost width of one bucket.
pub const DEFAULT_BUCKET_SIZE: f32 = 1.0;

#[derive(Debug)]
pub struct BucketQueue {
    bucket_size: f32,
    /// Cost at the start of bucket 0.
    base_cost: f32,
    buckets: Vec<Vec<u32>>,
    /// First bucket that may be non-empty.
    current: usize,
    overflow: Vec<(f32, u32)>,
    len: usize,
}

impl BucketQueue {
    pub fn new(bucket_count: u32, bucket_size: f32) -> Self {
        let count = bucket_count.max(1) as usize;
        Self {
            bucket_size: if bucket_size > 0.0 {
                bucket_size
            } else {
                DEFAULT_BUCKET_SIZE
            },
            base_cost: 0.0,
            buckets: vec![Vec::new(); count],
            current: 0,
            overflow: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drop every entry and restart the window at `base_cost`.
    pub fn reset(&mut self, base_cost: f32) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.overflow.clear();
        self.base_cost = base_cost;
        self.current = 0;
        self.len = 0;
    }

    pub fn push(&mut self, label: u32, cost: f32) {
        let offset = ((cost - self.base_cost) / self.bucket_size).floor();
        // Entries cheaper than the current bucket go into it.
        let slot = if offset.is_finite() && offset > 0.0 {
            offset as usize
        } else {
            0
        }
        .max(self.current);
        if slot < self.buckets.len() {
            self.buckets[slot].push(label);
        } else {
            self.overflow.push((cost, label));
        }
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<u32> {
        if self.len == 0 {
            return None;
        }
        loop {
            while self.current < self.buckets.len() {
                if let Some(label) = self.buckets[self.current].pop() {
                    self.len -= 1;
                    return Some(label);
                }
                self.current += 1;
            }
            self.refill();
        }
    }

    /// Slide the window to the cheapest overflow entry and pull in
    /// everything that now fits.
    fn refill(&mut self) {
        let min = self
            .overflow
            .iter()
            .map(|&(cost, _)| cost)
            .fold(f32::INFINITY, f32::min);
        self.base_cost = if min.is_finite() { min } else { self.base_cost };
        self.current = 0;
        let pending = std::mem::take(&mut self.overflow);
        self.len -= pending.len();
        for (cost, label) in pending {
            self.push(label, cost);
        }
    }
}
