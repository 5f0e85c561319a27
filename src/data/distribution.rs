use std::collections::BTreeMap;

use super::model::Passenger;

// ---------------------------------------------------------------------------
// Age histogram, split by outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub survived: usize,
    pub died: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Equal-width age histogram over the observed range. The last bin is closed
/// so the maximum age lands in it. A single distinct age gives one bin of
/// width 1.
pub fn age_histogram(rows: &[Passenger], bins: usize) -> Vec<HistogramBin> {
    let ages: Vec<(f64, bool)> = rows
        .iter()
        .filter_map(|p| p.age.map(|a| (a, p.survived)))
        .collect();
    if ages.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = ages.iter().map(|(a, _)| *a).fold(f64::INFINITY, f64::min);
    let max = ages.iter().map(|(a, _)| *a).fold(f64::NEG_INFINITY, f64::max);
    let (bins, width) = if max > min {
        (bins, (max - min) / bins as f64)
    } else {
        (1, 1.0)
    };

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lo: min + i as f64 * width,
            hi: min + (i + 1) as f64 * width,
            survived: 0,
            died: 0,
        })
        .collect();

    for (age, survived) in ages {
        let idx = (((age - min) / width).floor() as usize).min(bins - 1);
        if survived {
            out[idx].survived += 1;
        } else {
            out[idx].died += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fare spread per (class, outcome)
// ---------------------------------------------------------------------------

/// Box-plot statistics for the fares of one (class, outcome) group.
#[derive(Debug, Clone, PartialEq)]
pub struct FareSpread {
    pub class: u8,
    pub survived: bool,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles (linear interpolation) with whiskers reaching the furthest
/// fares within 1.5 × IQR of the box. Groups without fares are omitted.
pub fn fare_spread(rows: &[Passenger]) -> Vec<FareSpread> {
    let mut groups: BTreeMap<(u8, bool), Vec<f64>> = BTreeMap::new();
    for p in rows {
        if let Some(fare) = p.fare {
            groups.entry((p.class, p.survived)).or_default().push(fare);
        }
    }

    groups
        .into_iter()
        .map(|((class, survived), mut fares)| {
            fares.sort_by(f64::total_cmp);
            let q1 = quantile(&fares, 0.25);
            let median = quantile(&fares, 0.5);
            let q3 = quantile(&fares, 0.75);
            let reach = 1.5 * (q3 - q1);
            let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

            let within = |f: &f64| (lo_fence..=hi_fence).contains(f);
            let lower_whisker = fares.iter().copied().find(|f| within(f)).unwrap_or(q1);
            let upper_whisker = fares.iter().copied().rev().find(|f| within(f)).unwrap_or(q3);
            let outliers = fares.iter().copied().filter(|f| !within(f)).collect();

            FareSpread {
                class,
                survived,
                lower_whisker,
                q1,
                median,
                q3,
                upper_whisker,
                outliers,
            }
        })
        .collect()
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged(age: Option<f64>, survived: bool) -> Passenger {
        Passenger::new("X", 3, "male", age, 0, 0, None, None, survived)
    }

    fn fared(class: u8, fare: f64, survived: bool) -> Passenger {
        Passenger::new("X", class, "male", None, 0, 0, Some(fare), None, survived)
    }

    #[test]
    fn histogram_splits_by_outcome() {
        let rows = vec![
            aged(Some(0.0), true),
            aged(Some(5.0), false),
            aged(Some(10.0), true),
            aged(None, true),
        ];
        let hist = age_histogram(&rows, 2);
        assert_eq!(hist.len(), 2);
        assert_eq!((hist[0].lo, hist[0].hi), (0.0, 5.0));
        assert_eq!((hist[0].survived, hist[0].died), (1, 0));
        // 5.0 opens the second bin, 10.0 closes it.
        assert_eq!((hist[1].survived, hist[1].died), (1, 1));
    }

    #[test]
    fn histogram_of_single_age_has_one_bin() {
        let hist = age_histogram(&[aged(Some(30.0), true), aged(Some(30.0), false)], 30);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].width(), 1.0);
        assert_eq!(hist[0].center(), 30.5);
        assert_eq!((hist[0].survived, hist[0].died), (1, 1));
    }

    #[test]
    fn histogram_of_no_ages_is_empty() {
        assert!(age_histogram(&[aged(None, true)], 30).is_empty());
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn spread_flags_outliers() {
        let mut rows: Vec<_> = [10.0, 11.0, 12.0, 13.0, 14.0]
            .into_iter()
            .map(|f| fared(1, f, true))
            .collect();
        rows.push(fared(1, 500.0, true));
        rows.push(fared(3, 7.25, false));

        let spreads = fare_spread(&rows);
        assert_eq!(spreads.len(), 2);

        let first = &spreads[0];
        assert_eq!((first.class, first.survived), (1, true));
        assert_eq!(first.median, 12.5);
        assert_eq!(first.outliers, vec![500.0]);
        assert_eq!(first.upper_whisker, 14.0);
        assert_eq!(first.lower_whisker, 10.0);

        let third = &spreads[1];
        assert_eq!((third.q1, third.median, third.q3), (7.25, 7.25, 7.25));
        assert!(third.outliers.is_empty());
    }
}
