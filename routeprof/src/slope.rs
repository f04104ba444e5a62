//! Along-route slope between consecutive samples.

/// Slope into each station from the one before it.
///
/// Index 0 has no predecessor and is always `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlongSlope {
    pub deg: Vec<Option<f64>>,
    pub pct: Vec<Option<f64>>,
}

/// Returns along-route slopes for index-aligned `stations` and
/// `values`.
///
/// A step touching a missing value has no slope. A step with no
/// horizontal extent has zero slope. `invert` flips the vertical sign,
/// e.g. for depths stored as positive numbers.
pub fn along_slopes(stations: &[f64], values: &[Option<f64>], invert: bool) -> AlongSlope {
    let len = stations.len().min(values.len());
    let mut slope = AlongSlope {
        deg: Vec::with_capacity(len),
        pct: Vec::with_capacity(len),
    };
    if len == 0 {
        return slope;
    }
    slope.deg.push(None);
    slope.pct.push(None);

    for i in 1..len {
        let step = match (values[i - 1], values[i]) {
            (Some(prev), Some(cur)) => {
                let horiz_m = stations[i] - stations[i - 1];
                let vertical = if invert { prev - cur } else { cur - prev };
                if horiz_m > 0.0 {
                    Some((vertical.atan2(horiz_m).to_degrees(), 100.0 * vertical / horiz_m))
                } else {
                    Some((0.0, 0.0))
                }
            }
            _ => None,
        };
        slope.deg.push(step.map(|(deg, _)| deg));
        slope.pct.push(step.map(|(_, pct)| pct));
    }
    slope
}

/// Length over the surface: the sum of `hypot(station step, value
/// step)` between each valid sample and the next valid one. Null
/// samples are skipped, so gaps are bridged by a straight line.
pub fn seabed_length(stations: &[f64], values: &[Option<f64>]) -> f64 {
    let mut valid = stations
        .iter()
        .zip(values)
        .filter_map(|(&station, value)| value.map(|v| (station, v)));
    let Some(mut prev) = valid.next() else {
        return 0.0;
    };
    valid
        .map(|cur| {
            let step = (cur.0 - prev.0).hypot(cur.1 - prev.1);
            prev = cur;
            step
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{along_slopes, seabed_length};
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_grade() {
        let stations: Vec<f64> = (0..=10).map(|i| f64::from(i) * 100.0).collect();
        let values: Vec<Option<f64>> = stations.iter().map(|s| Some(0.01 * s)).collect();
        let slope = along_slopes(&stations, &values, false);
        assert_eq!(slope.deg.len(), 11);
        assert_eq!(slope.deg[0], None);
        for i in 1..11 {
            assert_relative_eq!(slope.deg[i].unwrap(), 0.572_938_697_683, epsilon = 1e-9);
            assert_relative_eq!(slope.pct[i].unwrap(), 1.0, epsilon = 1e-9);
        }

        let inverted = along_slopes(&stations, &values, true);
        assert_relative_eq!(inverted.pct[4].unwrap(), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gaps_are_null_not_zero() {
        let stations = [0.0, 10.0, 20.0, 30.0, 30.0];
        let values = [Some(1.0), None, Some(3.0), Some(4.0), Some(9.0)];
        let slope = along_slopes(&stations, &values, false);
        assert_eq!(slope.deg[1], None);
        assert_eq!(slope.pct[1], None);
        assert_eq!(slope.deg[2], None);
        assert_relative_eq!(slope.pct[3].unwrap(), 10.0);
        // Repeated station.
        assert_eq!(slope.deg[4], Some(0.0));
        assert_eq!(slope.pct[4], Some(0.0));
    }

    #[test]
    fn test_seabed_length() {
        let stations = [0.0, 3.0, 6.0, 10.0];
        let values = [Some(0.0), Some(4.0), None, Some(1.0)];
        // The gap is bridged from station 3 to station 10.
        assert_relative_eq!(seabed_length(&stations, &values), 5.0 + 7.0_f64.hypot(3.0));
        assert_relative_eq!(seabed_length(&[], &[]), 0.0);
        assert_relative_eq!(seabed_length(&[5.0], &[Some(1.0)]), 0.0);
        assert_relative_eq!(seabed_length(&stations, &[None; 4]), 0.0);
    }

    #[test]
    fn test_seabed_length_flat_with_gap() {
        let stations = [0.0, 100.0, 200.0, 300.0];
        let values = [Some(0.0), None, Some(0.0), Some(0.0)];
        assert_relative_eq!(seabed_length(&stations, &values), 300.0);
        // Leading and trailing gaps add nothing.
        let values = [None, Some(2.0), Some(2.0), None];
        assert_relative_eq!(seabed_length(&stations, &values), 100.0);
    }
}
