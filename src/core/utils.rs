use chrono::{Local, NaiveDate};

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sums floats exactly and rounds once at the end (Shewchuk's partials).
///
/// The result does not depend on the order of the addends, so monthly totals
/// stay stable no matter how transactions were inserted.
pub fn precise_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut partials: Vec<f64> = Vec::new();
    for mut x in values {
        let mut kept = 0;
        for i in 0..partials.len() {
            let mut y = partials[i];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        partials.truncate(kept);
        partials.push(x);
    }
    round_partials(&partials)
}

fn round_partials(partials: &[f64]) -> f64 {
    let mut n = partials.len();
    if n == 0 {
        return 0.0;
    }
    n -= 1;
    let mut hi = partials[n];
    let mut lo = 0.0;
    while n > 0 {
        let x = hi;
        n -= 1;
        let y = partials[n];
        hi = x + y;
        let yr = hi - x;
        lo = y - yr;
        if lo != 0.0 {
            break;
        }
    }
    // Correct the final rounding when the next partial sits exactly halfway.
    if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
        let y = lo * 2.0;
        let x = hi + y;
        let yr = x - hi;
        if y == yr {
            hi = x;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_tenths_exactly() {
        let values = vec![0.1; 10];
        assert_eq!(precise_sum(values.clone()), 1.0);
        assert_ne!(values.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn order_does_not_matter() {
        let forward = vec![1e16, 1.0, -1e16, 0.01, 2.5, 3.333];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(precise_sum(forward), precise_sum(backward));
    }

    #[test]
    fn empty_sum_is_zero() {
        assert_eq!(precise_sum(Vec::<f64>::new()), 0.0);
    }
}
