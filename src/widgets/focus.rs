/// Cyclic focus order over a form's widgets.
///
/// Slots are registered in layout order; slots marked unfocusable are skipped
/// when moving forward or backward.
#[derive(Debug, Clone, Default)]
pub struct FocusRing {
    slots: Vec<bool>,
    current: Option<usize>,
}

impl FocusRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next slot. Returns its index.
    pub fn push(&mut self, focusable: bool) -> usize {
        self.slots.push(focusable);
        self.slots.len() - 1
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Focus `index` if it exists and is focusable.
    pub fn focus(&mut self, index: usize) -> bool {
        if self.slots.get(index).copied().unwrap_or(false) {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Focus the first focusable slot.
    pub fn first(&mut self) -> Option<usize> {
        self.current = self.slots.iter().position(|focusable| *focusable);
        self.current
    }

    pub fn next(&mut self) -> Option<usize> {
        self.step(true)
    }

    pub fn previous(&mut self) -> Option<usize> {
        self.step(false)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn step(&mut self, forward: bool) -> Option<usize> {
        let Some(start) = self.current else {
            return self.first();
        };
        let len = self.slots.len();
        for offset in 1..=len {
            let index = if forward {
                (start + offset) % len
            } else {
                (start + len - offset % len) % len
            };
            if self.slots[index] {
                self.current = Some(index);
                break;
            }
        }
        self.current
    }
}
