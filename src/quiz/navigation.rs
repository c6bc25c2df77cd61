// src/quiz/navigation.rs

/// Current question index, kept within `[0, len - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len
    }

    pub fn next(&mut self) {
        if !self.is_last() {
            self.current += 1;
        }
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Moves to `index` if it names a question; returns whether it moved.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.current = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stops_at_the_last_question() {
        let mut nav = Navigator::new(3);
        nav.next();
        nav.next();
        nav.next();
        nav.next();
        assert_eq!(nav.current(), 2);
        assert!(nav.is_last());
    }

    #[test]
    fn previous_is_floored_at_zero() {
        let mut nav = Navigator::new(3);
        nav.previous();
        assert_eq!(nav.current(), 0);
        nav.jump_to(2);
        nav.previous();
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn jump_rejects_out_of_range_indices() {
        let mut nav = Navigator::new(4);
        assert!(nav.jump_to(3));
        assert!(!nav.jump_to(4));
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn any_move_sequence_stays_in_bounds() {
        for len in 1..6usize {
            let mut nav = Navigator::new(len);
            for step in 0..50usize {
                match step % 5 {
                    0 | 1 => nav.next(),
                    2 => nav.previous(),
                    _ => {
                        nav.jump_to(step % (len + 2));
                    }
                }
                assert!(nav.current() < len);
            }
        }
    }

    #[test]
    fn empty_exam_never_moves() {
        let mut nav = Navigator::new(0);
        nav.next();
        nav.previous();
        assert!(!nav.jump_to(0));
        assert_eq!(nav.current(), 0);
        assert!(nav.is_empty());
    }
}
