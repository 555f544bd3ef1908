use crate::{Error, stage::Stage};

/// Yields every element `count` times in a row.
///
/// Holds one element and clones it for all but the last repetition. A count of
/// zero swallows the whole sequence.
pub struct RepeatEach<T> {
    count: usize,
    current: Option<T>,
    left: usize,
}

impl<T> RepeatEach<T> {
    pub fn new(count: usize) -> Self {
        RepeatEach {
            count,
            current: None,
            left: 0,
        }
    }
}

impl<T> Stage<T> for RepeatEach<T>
where
    T: Clone,
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        if self.count > 0 {
            self.current = Some(input);
            self.left = self.count;
        }
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.left == 0
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.left > 0)
    }

    fn take_output(&mut self) -> Option<T> {
        match self.left {
            0 => None,
            1 => {
                self.left = 0;
                self.current.take()
            }
            _ => {
                self.left -= 1;
                self.current.clone()
            }
        }
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use crate::{build::from_iter, source::SourceExt};

    #[test]
    fn test_repeat_each_keeps_order() {
        let out = from_iter(['a', 'b'])
            .repeat_each(3)
            .enumerator()
            .to_vec()
            .unwrap();
        assert_eq!(out, vec!['a', 'a', 'a', 'b', 'b', 'b']);
    }

    #[test]
    fn test_repeat_each_zero_drains_upstream() {
        let pulls = Rc::new(Cell::new(0));
        let c = pulls.clone();
        let mut cursor = from_iter(0..4)
            .inspect(move |_| c.set(c.get() + 1))
            .repeat_each(0)
            .enumerator();
        assert!(!cursor.has_next().unwrap());
        assert_eq!(pulls.get(), 4);
    }

    #[test]
    fn test_repeat_each_pulls_lazily() {
        let pulls = Rc::new(Cell::new(0));
        let c = pulls.clone();
        let mut cursor = from_iter(0..100)
            .inspect(move |_| c.set(c.get() + 1))
            .repeat_each(2)
            .enumerator();
        assert_eq!(cursor.next().unwrap(), 0);
        assert_eq!(cursor.next().unwrap(), 0);
        assert_eq!(pulls.get(), 1);
        assert_eq!(cursor.next().unwrap(), 1);
        assert_eq!(pulls.get(), 2);
    }
}
