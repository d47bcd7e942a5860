use serde::Serialize;

/// Derived price statistics for one salon's extracted coupon prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceStats {
    /// Lowest accepted price
    pub min: Option<u32>,

    /// Highest accepted price
    pub max: Option<u32>,

    /// Arithmetic mean rounded to the nearest integer
    pub average: Option<u32>,
}

impl PriceStats {
    /// Computes min/max/average over a price list.
    ///
    /// An empty list yields all-`None`; no fractional price is surfaced.
    pub fn from_prices(prices: &[u32]) -> Self {
        if prices.is_empty() {
            return Self {
                min: None,
                max: None,
                average: None,
            };
        }

        let sum: u64 = prices.iter().map(|&p| u64::from(p)).sum();
        let average = (sum as f64 / prices.len() as f64).round() as u32;

        Self {
            min: prices.iter().copied().min(),
            max: prices.iter().copied().max(),
            average: Some(average),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prices() {
        let stats = PriceStats::from_prices(&[]);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.average, None);
    }

    #[test]
    fn test_single_price() {
        let stats = PriceStats::from_prices(&[5500]);
        assert_eq!(stats.min, Some(5500));
        assert_eq!(stats.max, Some(5500));
        assert_eq!(stats.average, Some(5500));
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        // 1000 + 1001 = 2001, mean 1000.5 rounds up
        let stats = PriceStats::from_prices(&[1000, 1001]);
        assert_eq!(stats.average, Some(1001));

        // 1000 + 1000 + 1001 = 3001, mean 1000.33 rounds down
        let stats = PriceStats::from_prices(&[1000, 1000, 1001]);
        assert_eq!(stats.average, Some(1000));
    }

    #[test]
    fn test_average_bounded_by_min_and_max() {
        let cases: &[&[u32]] = &[
            &[500, 100000],
            &[3300, 5500, 7700],
            &[999, 1000, 1002],
        ];

        for prices in cases {
            let stats = PriceStats::from_prices(prices);
            let (min, max, avg) = (
                stats.min.unwrap(),
                stats.max.unwrap(),
                stats.average.unwrap(),
            );
            assert!(min <= avg, "min {} > avg {} for {:?}", min, avg, prices);
            assert!(avg <= max, "avg {} > max {} for {:?}", avg, max, prices);

            // Rounding leaves the average within half a unit of the true mean
            let sum: u64 = prices.iter().map(|&p| u64::from(p)).sum();
            let exact = sum as f64 / prices.len() as f64;
            assert!((f64::from(avg) - exact).abs() <= 0.5);
        }
    }
}
