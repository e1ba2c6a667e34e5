use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over a non-empty sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    /// `None` when the mean cannot be formed within the `Decimal` range
    pub mean: Option<Decimal>,
    pub median: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub count: usize,
}

impl SampleStatistics {
    /// Returns `None` for an empty sample. Input order does not matter.
    pub fn from_values(values: &[Decimal]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort();

        let count = sorted.len();
        Some(SampleStatistics {
            mean: mean_of(&sorted),
            median: median_of_sorted(&sorted),
            low: sorted[0],
            high: sorted[count - 1],
            count,
        })
    }
}

/// Statistical median; the mean of the two middle values for even counts.
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    Some(median_of_sorted(&sorted))
}

/// Arithmetic mean. `None` for an empty sample or when it is out of range.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    mean_of(values)
}

fn mean_of(values: &[Decimal]) -> Option<Decimal> {
    let count = Decimal::from(values.len() as i64);
    match values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    {
        Some(sum) => sum.checked_div(count),
        // The running sum left the range; scale each term first.
        None => values.iter().try_fold(Decimal::ZERO, |acc, v| {
            acc.checked_add(v.checked_div(count)?)
        }),
    }
}

fn median_of_sorted(sorted: &[Decimal]) -> Decimal {
    let count = sorted.len();
    if count % 2 == 1 {
        return sorted[count / 2];
    }
    let (a, b) = (sorted[count / 2 - 1], sorted[count / 2]);
    match a.checked_add(b) {
        Some(sum) => sum / dec!(2),
        // Overflow means a and b share a sign, so b - a stays in range and
        // the midpoint lies between them.
        None => a + (b - a) / dec!(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[dec!(2.5), dec!(3.0), dec!(2.8)]), Some(dec!(2.8)));
    }

    #[test]
    fn test_median_even_averages_middle_pair() {
        assert_eq!(
            median(&[dec!(12), dec!(15), dec!(13.5), dec!(10)]),
            Some(dec!(12.75))
        );
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[]), None);
        assert!(SampleStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn test_statistics_single_value() {
        let s = SampleStatistics::from_values(&[dec!(7)]).unwrap();
        assert_eq!(s.mean, Some(dec!(7)));
        assert_eq!(s.median, dec!(7));
        assert_eq!(s.low, dec!(7));
        assert_eq!(s.high, dec!(7));
        assert_eq!(s.count, 1);
    }

    #[test]
    fn test_statistics_order_independent() {
        let a = SampleStatistics::from_values(&[dec!(18), dec!(22), dec!(20), dec!(25)]).unwrap();
        let b = SampleStatistics::from_values(&[dec!(25), dec!(20), dec!(18), dec!(22)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.median, dec!(21));
        assert_eq!(a.mean, Some(dec!(21.25)));
        assert_eq!(a.low, dec!(18));
        assert_eq!(a.high, dec!(25));
    }

    #[test]
    fn test_median_near_range_limit() {
        assert_eq!(median(&[Decimal::MAX, Decimal::MAX]), Some(Decimal::MAX));
        assert_eq!(median(&[Decimal::MIN, Decimal::MIN]), Some(Decimal::MIN));
        let m = median(&[Decimal::MAX - dec!(2), Decimal::MAX]).unwrap();
        assert_eq!(m, Decimal::MAX - dec!(1));
    }

    #[test]
    fn test_mean_falls_back_when_sum_overflows() {
        let third = dec!(26409387504754779197847983445);
        let m = mean(&[Decimal::MAX, Decimal::MAX, dec!(-1)]).unwrap();
        assert!(m > third + third - dec!(1));
        assert!(m <= Decimal::MAX);
    }
}
