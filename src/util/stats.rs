use std::fmt::Display;

/// Running min / max / average of a sequence of counts.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
    /// Number of samples equal to zero.
    pub zeros: usize,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f32 - self.avg) / (self.count as f32);
        if value == 0 {
            self.zeros += 1;
        }
    }

    pub fn add_samples(&mut self, values: impl IntoIterator<Item = usize>) {
        for v in values {
            self.add_sample(v);
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
            zeros: 0,
        }
    }
}

impl FromIterator<usize> for Stats {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut stats = Stats::default();
        stats.add_samples(iter);
        stats
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{} - {}; avg {:.2}; {} of {} empty",
            self.min, self.max, self.avg, self.zeros, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn add_sample() {
        let mut s = Stats::default();
        s.add_sample(20);
        assert!(s.count == 1);
        assert!(s.min == 20);
        assert!(s.max == 20);
        assert!(s.avg == 20.0);
        assert!(s.zeros == 0);
    }

    #[test]
    fn collect() {
        let s: Stats = [0, 10, 0, 30].into_iter().collect();
        assert!(s.count == 4);
        assert!(s.min == 0);
        assert!(s.max == 30);
        assert!(s.avg == 10.0);
        assert!(s.zeros == 2);
    }

    #[test]
    fn display_format() {
        let s: Stats = [42, 0].into_iter().collect();
        let output = format!("{}", s);
        assert!(output.contains("0 - 42"));
        assert!(output.contains("avg 21.00"));
        assert!(output.contains("1 of 2 empty"));
    }

    #[test]
    fn display_empty() {
        assert!(format!("{}", Stats::default()) == "no samples");
    }
}
