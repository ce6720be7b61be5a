/// Recently completed lines, newest first.
///
/// All storage is reserved up front: `depth` slots of `line_capacity` bytes.
/// When full, the oldest line is overwritten.
#[derive(Debug, Clone)]
pub struct History {
    slots: Box<[Vec<u8>]>,
    line_capacity: usize,
    /// Slot the next line goes into.
    head: usize,
    count: usize,
    /// Age of the entry currently recalled into the line, 0 being newest.
    recall: Option<usize>,
}

/// Outcome of stepping through the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    /// This entry should replace the line.
    Entry(&'a [u8]),
    /// Stepped past the newest entry, back to an empty line.
    Fresh,
    /// Nothing to step to.
    Unchanged,
}

impl History {
    pub fn new(depth: usize, line_capacity: usize) -> Self {
        let slots = (0..depth)
            .map(|_| Vec::with_capacity(line_capacity))
            .collect();
        Self {
            slots,
            line_capacity,
            head: 0,
            count: 0,
            recall: None,
        }
    }

    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Records a completed line. Empty lines and repeats of the newest
    /// entry are skipped. Returns true if the line was stored.
    pub fn push(&mut self, line: &[u8]) -> bool {
        self.recall = None;
        if self.depth() == 0 || line.is_empty() || self.get(0) == Some(line) {
            return false;
        }
        let n = line.len().min(self.line_capacity);
        let slot = &mut self.slots[self.head];
        slot.clear();
        slot.extend_from_slice(&line[..n]);
        self.head = (self.head + 1) % self.depth();
        self.count = (self.count + 1).min(self.depth());
        true
    }

    /// Returns the entry `age` steps back, 0 being the newest.
    pub fn get(&self, age: usize) -> Option<&[u8]> {
        if age >= self.count {
            return None;
        }
        let depth = self.depth();
        let index = (self.head + depth - 1 - age) % depth;
        Some(self.slots[index].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).filter_map(move |age| self.get(age))
    }

    /// Steps one entry further into the past.
    pub fn older(&mut self) -> Recall<'_> {
        let next = self.recall.map_or(0, |age| age + 1);
        if next >= self.count {
            return Recall::Unchanged;
        }
        self.recall = Some(next);
        self.get(next).map_or(Recall::Unchanged, Recall::Entry)
    }

    /// Steps one entry back towards the present.
    pub fn newer(&mut self) -> Recall<'_> {
        match self.recall {
            None => Recall::Unchanged,
            Some(0) => {
                self.recall = None;
                Recall::Fresh
            }
            Some(age) => {
                self.recall = Some(age - 1);
                self.get(age - 1).map_or(Recall::Unchanged, Recall::Entry)
            }
        }
    }

    /// Forgets the recall position, so the next [`History::older`] starts
    /// from the newest entry again.
    #[inline(always)]
    pub fn reset_recall(&mut self) {
        self.recall = None;
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
        self.head = 0;
        self.count = 0;
        self.recall = None;
    }
}
