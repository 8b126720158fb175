//! 256-bin intensity histogram over `[0, 1]` and the statistics derived from
//! it.

/// Number of quantisation levels.
pub const BINS: usize = 256;

/// Map an intensity in `[0, 1]` to its bin (nearest 8-bit level).
#[inline]
pub fn quantize(v: f32) -> usize {
    (v.clamp(0.0, 1.0) * (BINS - 1) as f32).round() as usize
}

/// Representative intensity of a bin.
#[inline]
pub fn level(bin: usize) -> f32 {
    bin.min(BINS - 1) as f32 / (BINS - 1) as f32
}

#[derive(Clone, Debug)]
pub struct Histogram {
    counts: Vec<u64>,
    total: u64,
}

impl Histogram {
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Self {
        let mut counts = vec![0u64; BINS];
        let mut total = 0u64;
        for v in values {
            counts[quantize(v)] += 1;
            total += 1;
        }
        Self { counts, total }
    }

    /// Otsu's threshold: the bin `t` maximising the between-class variance of
    /// `{bins <= t}` versus `{bins > t}`. Ties keep the lowest `t`.
    ///
    /// A histogram with a single occupied bin has no split; the occupied bin
    /// is returned so that nothing lies above the threshold.
    pub fn otsu_bin(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let total = self.total as f64;
        let sum_all: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(bin, &c)| bin as f64 * c as f64)
            .sum();

        let mut best: Option<(usize, f64)> = None;
        let mut weight_lo = 0.0f64;
        let mut sum_lo = 0.0f64;
        for (bin, &count) in self.counts.iter().enumerate() {
            weight_lo += count as f64;
            sum_lo += bin as f64 * count as f64;
            if weight_lo == 0.0 {
                continue;
            }
            let weight_hi = total - weight_lo;
            if weight_hi == 0.0 {
                break;
            }
            let mean_lo = sum_lo / weight_lo;
            let mean_hi = (sum_all - sum_lo) / weight_hi;
            let diff = mean_lo - mean_hi;
            let between = weight_lo * weight_hi * diff * diff;
            if best.map_or(true, |(_, v)| between > v) {
                best = Some((bin, between));
            }
        }

        best.map(|(bin, _)| bin).or_else(|| {
            self.counts
                .iter()
                .rposition(|&c| c > 0)
        })
    }
}
