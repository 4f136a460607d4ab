// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use heapless::HistoryBuffer;
use micromath::statistics::Mean;

/// Moving average over the last `N` weights.
///
/// Every slot starts at zero and takes part in the average, so until `N` samples have been
/// pushed the result is pulled towards zero.
pub struct AverageWindow<const N: usize> {
    samples: HistoryBuffer<f32, N>,
}

impl<const N: usize> AverageWindow<N> {
    const NOT_EMPTY: () = assert!(N >= 1, "average window needs at least one slot");

    pub fn new() -> Self {
        let () = Self::NOT_EMPTY;
        Self {
            samples: HistoryBuffer::new_with(0.0),
        }
    }

    pub fn push(&mut self, sample: f32) {
        self.samples.write(sample);
    }

    pub fn average(&self) -> f32 {
        self.samples.as_slice().iter().copied().mean()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }
}

impl<const N: usize> Default for AverageWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn partially_filled_window_is_biased_to_zero() {
        let mut window = AverageWindow::<4>::new();
        window.push(10.0);
        window.push(20.0);
        assert!((window.average() - 7.5).abs() < EPSILON);
    }

    #[test]
    fn full_window_is_the_plain_mean() {
        let mut window = AverageWindow::<4>::new();
        for sample in [1.0, 2.0, 3.0, 6.0] {
            window.push(sample);
        }
        assert!((window.average() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn oldest_sample_is_overwritten() {
        let mut window = AverageWindow::<4>::new();
        for sample in [100.0, 2.0, 3.0, 6.0, 1.0] {
            window.push(sample);
        }
        assert!((window.average() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn single_slot_tracks_the_last_sample() {
        let mut window = AverageWindow::<1>::new();
        window.push(4.0);
        window.push(-2.5);
        assert_eq!(window.capacity(), 1);
        assert!((window.average() + 2.5).abs() < EPSILON);
    }

    #[test]
    fn new_window_averages_to_zero() {
        let window = AverageWindow::<8>::default();
        assert_eq!(window.average(), 0.0);
    }
}
