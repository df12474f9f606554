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
use std::time::{Duration, Instant};

pub fn format_duration(d: Duration) -> String {
    let mut secs = d.as_secs();
    let hours = secs / 3600;
    secs %= 3600;
    let minutes = secs / 60;
    secs %= 60;

    let ms = d.as_millis() % 1000;

    format!("{}h {}m {}s {}ms", hours, minutes, secs, ms)
}

/// Progress line with an estimate of the remaining time, meant for info! output
pub fn remaining_time_msg(start: &Instant, num_processed: u32, num_total: u32) -> String {
    let elapsed = start.elapsed();

    let time_per_result = if num_processed == 0 {
        elapsed
    } else {
        elapsed / num_processed
    };

    let est_remaining_time = time_per_result * num_total.saturating_sub(num_processed);

    format!("Through {} of {}, elapsed: {}, est. remaining: {}",
            num_processed, num_total,
            format_duration(elapsed),
            format_duration(est_remaining_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(3_723_042)), "1h 2m 3s 42ms");
        assert_eq!(format_duration(Duration::from_secs(0)), "0h 0m 0s 0ms");
    }

    #[test]
    fn test_remaining_time_msg() {
        let msg = remaining_time_msg(&Instant::now(), 3, 2);
        assert!(msg.starts_with("Through 3 of 2"));
    }
}
