/// Absorbs float error when a window edge lands exactly on a sample boundary.
const INDEX_EPSILON: f64 = 1e-6;

/// Time span, in seconds, cut out of the source before resampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleWindow {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl SampleWindow {
    /// Center a `target_seconds` window in a source of `duration_seconds`.
    ///
    /// Sources shorter than the target yield the whole source, so the window
    /// (and the normalized output) is shorter than requested.
    pub fn centered(duration_seconds: f64, target_seconds: f64) -> Self {
        let duration = finite_non_negative(duration_seconds);
        let target = finite_non_negative(target_seconds);
        let start_seconds = ((duration - target) / 2.0).max(0.0);
        let end_seconds = (start_seconds + target).min(duration);
        Self {
            start_seconds,
            end_seconds,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.end_seconds - self.start_seconds).max(0.0)
    }

    /// Index of the first output sample at `sample_rate`.
    pub fn start_index(&self, sample_rate: u32) -> usize {
        seconds_to_index(self.start_seconds, sample_rate)
    }

    /// Number of samples the window spans at `sample_rate`.
    pub fn sample_count(&self, sample_rate: u32) -> usize {
        seconds_to_index(self.duration_seconds(), sample_rate)
    }
}

fn seconds_to_index(seconds: f64, sample_rate: u32) -> usize {
    (seconds * sample_rate as f64 + INDEX_EPSILON).floor().max(0.0) as usize
}

fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_sources_get_a_centered_window() {
        for duration in [10.0, 12.5, 30.0, 187.3] {
            let window = SampleWindow::centered(duration, 10.0);
            assert!((window.start_seconds + window.end_seconds - duration).abs() < 1e-9);
            assert!((window.duration_seconds() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn short_sources_use_the_whole_file() {
        let window = SampleWindow::centered(4.0, 10.0);
        assert_eq!(window.start_seconds, 0.0);
        assert_eq!(window.end_seconds, 4.0);
        assert_eq!(window.sample_count(22_050), 88_200);
    }

    #[test]
    fn indices_floor_the_window_bounds() {
        let window = SampleWindow::centered(30.0, 10.0);
        assert_eq!(window.start_index(22_050), 220_500);
        assert_eq!(window.sample_count(22_050), 220_500);

        let window = SampleWindow::centered(10.5, 10.0);
        assert_eq!(window.start_index(22_050), 5_512);
        assert_eq!(window.sample_count(22_050), 220_500);
    }

    #[test]
    fn degenerate_durations_collapse_to_empty() {
        for duration in [0.0, -3.0, f64::NAN] {
            let window = SampleWindow::centered(duration, 10.0);
            assert_eq!(window.sample_count(22_050), 0);
        }
    }
}
