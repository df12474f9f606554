/*
This file is part of the Water Bathymetry Tagger
Copyright (C) 2022 Novel-T

The Water Bathymetry Tagger is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use num::PrimInt;

// See the tests for examples

pub trait ChunkIndex: PrimInt {}

impl<T: PrimInt> ChunkIndex for T {}

/// Splits the inclusive range [start, end] into consecutive (first, last) pairs,
/// both inclusive, each holding at most step_size values.  The last pair may be shorter.
pub struct ChunkPairIterator<I>
where I: ChunkIndex
{
    step_size: I,
    num_steps: usize,
    cur_step: usize,
    start: I,
    end: I,
}

impl <I> ChunkPairIterator<I>
where I: ChunkIndex
{
    ///
    /// Start and end are inclusive
    pub fn new(start: I, end: I, step_size: I) -> Self {

        assert!(end >= start);
        assert!(step_size >= I::one());

        let range_len = end - start + I::one();
        let mut num_steps = range_len / step_size;
        if range_len % step_size > I::zero() {
            num_steps = num_steps + I::one();
        }

        ChunkPairIterator {
            step_size,
            num_steps: num_steps.to_usize().unwrap_or(usize::MAX),
            cur_step: 0,
            start,
            end,
        }
    }

    pub fn reset(&mut self) {
        self.cur_step = 0;
    }
}

impl <I> Iterator for ChunkPairIterator<I>
where I: ChunkIndex
{
    type Item = (I, I);

    fn next(&mut self) -> Option<Self::Item> {

        if self.cur_step >= self.num_steps {
            return None;
        }

        let step = <I as num::NumCast>::from(self.cur_step)?;
        let first = self.start + self.step_size * step;

        //the last chunk is cut at the end
        let last = if self.cur_step == self.num_steps - 1 {
            self.end
        } else {
            first + self.step_size - I::one()
        };

        self.cur_step += 1;

        Some((first, last))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let l = self.num_steps - self.cur_step;
        (l, Some(l))
    }
}

impl <I> ExactSizeIterator for ChunkPairIterator<I>
where I: ChunkIndex
{

}

/// Splits [0, total) into `parts` contiguous (start, len) pieces whose lengths differ by at most 1.
/// Empty pieces are not returned.
pub fn even_split(total: usize, parts: usize) -> Vec<(usize, usize)> {
    assert!(parts >= 1);

    let base = total / parts;
    let remainder = total % parts;

    let mut ret = Vec::with_capacity(parts);
    let mut start = 0;

    for part in 0..parts {
        let len = base + if part < remainder { 1 } else { 0 };
        if len == 0 {
            break;
        }
        ret.push((start, len));
        start += len;
    }

    debug_assert_eq!(start, total);

    ret
}

#[cfg(test)]
mod chunk_iterator_tests {

    use super::*;

    #[test]
    fn test_pair_chunk_iter() {
        let v : Vec<_> = ChunkPairIterator::new(0, 10, 3).collect();
        assert_eq!(v, vec![(0, 2), (3, 5), (6, 8), (9, 10)]);

        let v : Vec<_> = ChunkPairIterator::new(0, 9999usize, 2500).collect();
        assert_eq!(v, vec![(0, 2499), (2500, 4999), (5000, 7499), (7500, 9999)]);

        let v : Vec<_> = ChunkPairIterator::new(0, 9999usize, 10000).collect();
        assert_eq!(v, vec![(0, 9999)]);

        let v : Vec<_> = ChunkPairIterator::new(4, 4, 30).collect();
        assert_eq!(v, vec![(4, 4)]);

        let v : Vec<_> = ChunkPairIterator::new(3, 5, 1).collect();
        assert_eq!(v, vec![(3, 3), (4, 4), (5, 5)]);
    }

    #[test]
    fn test_pair_chunk_iter_size() {
        for (start, stop, step_size) in vec![
            (0, 10, 3),
            (2, 11, 3),
            (4, 5, 30),
            (4, 4, 1),
            (0, 54, 10),
        ].into_iter() {
            let mut it = ChunkPairIterator::new(start, stop, step_size);
            let len = it.len();

            for i in 0..len {
                assert_eq!(Some(len - i), it.size_hint().1);
                it.next();
            }

            assert_eq!(None, it.next());

            it.reset();
            assert_eq!(it.len(), len);
        }
    }

    #[test]
    fn test_pair_chunk_iter_no_gap_no_overlap() {
        for step_size in 1..20 {
            let pairs: Vec<(u32, u32)> = ChunkPairIterator::new(7, 61, step_size).collect();

            assert_eq!(pairs[0].0, 7);
            assert_eq!(pairs[pairs.len() - 1].1, 61);

            for w in pairs.windows(2) {
                assert_eq!(w[0].1 + 1, w[1].0);
            }
            for (first, last) in pairs.iter() {
                assert!(last - first < step_size);
            }
        }
    }

    #[test]
    fn test_even_split() {
        assert_eq!(even_split(10, 4), vec![(0, 3), (3, 3), (6, 2), (8, 2)]);
        assert_eq!(even_split(8, 4), vec![(0, 2), (2, 2), (4, 2), (6, 2)]);
        assert_eq!(even_split(2, 4), vec![(0, 1), (1, 1)]);
        assert!(even_split(0, 3).is_empty());
        assert_eq!(even_split(5, 1), vec![(0, 5)]);
    }
}
