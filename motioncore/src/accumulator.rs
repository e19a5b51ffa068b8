use core::fmt;
use core::ops::{Add, Div};

use heapless::HistoryBuffer;

/// Fixed size history of the latest `N` samples.
///
/// Index 0 is the newest sample. The buffer is always full, it is filled
/// with a value on construction and on [`clear`](Accumulator::clear).
pub struct Accumulator<T, const N: usize> {
    buffer: HistoryBuffer<T, N>,
}

impl<T, const N: usize> Accumulator<T, N>
where
    T: Copy + Default + Add<Output = T> + Div<f32, Output = T>,
{
    pub fn new(value: T) -> Self {
        Self {
            buffer: HistoryBuffer::new_with(value),
        }
    }

    pub fn clear(&mut self, value: T) {
        self.buffer.clear_with(value);
    }

    pub fn push(&mut self, value: T) {
        self.buffer.write(value);
    }

    /// `index` samples before the newest one, `None` past the history.
    pub fn get(&self, index: usize) -> Option<T> {
        let len = self.buffer.len();
        if index >= len {
            return None;
        }
        self.buffer.oldest_ordered().nth(len - 1 - index).copied()
    }

    pub fn newest(&self) -> T {
        self.buffer.recent().copied().unwrap_or_default()
    }

    /// Mean of the `n` newest samples. `n` is clamped to the history size.
    pub fn average(&self, n: usize) -> T {
        let n = n.min(self.size());
        if n == 0 {
            return T::default();
        }
        let sum = self
            .buffer
            .oldest_ordered()
            .skip(self.size() - n)
            .fold(T::default(), |sum, &value| sum + value);
        sum / n as f32
    }

    pub fn size(&self) -> usize {
        self.buffer.capacity()
    }
}

impl<T, const N: usize> fmt::Debug for Accumulator<T, N>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("buffer", &self.buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use uom::si::{angular_velocity::radian_per_second, f32::AngularVelocity};

    use super::*;

    #[test]
    fn test_newest_first() {
        let mut acc = Accumulator::<f32, 4>::new(0.0);
        for i in 1..=6 {
            acc.push(i as f32);
        }
        assert_eq!(acc.get(0), Some(6.0));
        assert_eq!(acc.get(1), Some(5.0));
        assert_eq!(acc.get(3), Some(3.0));
        assert_eq!(acc.get(4), None);
        assert_eq!(acc.newest(), 6.0);
        assert_eq!(acc.size(), 4);
    }

    #[test]
    fn test_average() {
        let mut acc = Accumulator::<f32, 8>::new(1.0);
        assert_relative_eq!(acc.average(8), 1.0);
        acc.push(3.0);
        acc.push(5.0);
        assert_relative_eq!(acc.average(2), 4.0);
        assert_relative_eq!(acc.average(4), 2.5);
        assert_relative_eq!(acc.average(100), 14.0 / 8.0);
        assert_relative_eq!(acc.average(0), 0.0);
    }

    #[test]
    fn test_clear() {
        let mut acc = Accumulator::<f32, 3>::new(0.0);
        acc.push(2.0);
        acc.clear(-1.0);
        assert_eq!(acc.get(0), Some(-1.0));
        assert_eq!(acc.get(2), Some(-1.0));
        assert_relative_eq!(acc.average(3), -1.0);
    }

    #[test]
    fn test_quantity_samples() {
        let mut acc = Accumulator::<AngularVelocity, 2>::new(Default::default());
        acc.push(AngularVelocity::new::<radian_per_second>(2.0));
        acc.push(AngularVelocity::new::<radian_per_second>(4.0));
        assert_relative_eq!(acc.average(2).get::<radian_per_second>(), 3.0);
    }
}
