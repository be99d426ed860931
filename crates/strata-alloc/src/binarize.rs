use crate::matrix::{BinaryMatrix, CovariateMatrix};

/// Discretizes every covariate column to `{0, 1}`.
///
/// Columns with at most two distinct values are already binary and keep
/// their partition: `{0, 1}` columns pass through verbatim, any other
/// two-valued column maps its lower value to 0. Wider columns are split at
/// the median; values strictly above it become 1, ties stay 0.
pub fn binarize(matrix: &CovariateMatrix) -> BinaryMatrix {
    let columns: Vec<Vec<u8>> = (0..matrix.cols())
        .map(|col| binarize_column(&matrix.column(col)))
        .collect();
    BinaryMatrix::from_columns(matrix.rows(), &columns)
}

fn binarize_column(values: &[f64]) -> Vec<u8> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut distinct = sorted.clone();
    distinct.dedup();

    let threshold = match distinct.as_slice() {
        [] => return Vec::new(),
        [only] if *only == 0.0 || *only == 1.0 => {
            return values.iter().map(|value| *value as u8).collect()
        }
        [low, high] if *low == 0.0 && *high == 1.0 => {
            return values.iter().map(|value| *value as u8).collect()
        }
        [low] | [low, _] => *low,
        _ => median(&sorted),
    };
    values.iter().map(|value| u8::from(*value > threshold)).collect()
}

/// Median of an ascending slice, interpolating between the two middle ranks.
pub(crate) fn median(sorted: &[f64]) -> f64 {
    let h = (sorted.len() - 1) as f64 * 0.5;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    sorted[lower] + (h - lower as f64) * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_column(values: Vec<f64>) -> CovariateMatrix {
        CovariateMatrix::from_columns(values.len(), &[values])
    }

    #[test]
    fn binary_columns_pass_through() {
        let binary = binarize(&single_column(vec![1.0, 0.0, 1.0]));
        assert_eq!(binary.column(0), vec![1, 0, 1]);
        let constant = binarize(&single_column(vec![1.0, 1.0]));
        assert_eq!(constant.column(0), vec![1, 1]);
    }

    #[test]
    fn two_valued_columns_keep_their_partition() {
        let binary = binarize(&single_column(vec![7.0, 3.0, 7.0]));
        assert_eq!(binary.column(0), vec![1, 0, 1]);
    }

    #[test]
    fn ties_at_the_median_map_to_zero() {
        let binary = binarize(&single_column(vec![1.0, 2.0, 2.0, 3.0, 5.0]));
        assert_eq!(binary.column(0), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn even_length_median_interpolates() {
        assert_eq!(median(&[1.0, 2.0, 4.0, 10.0]), 3.0);
        let binary = binarize(&single_column(vec![10.0, 1.0, 4.0, 2.0]));
        assert_eq!(binary.column(0), vec![1, 0, 1, 0]);
    }

    #[test]
    fn shape_is_preserved() {
        let matrix = CovariateMatrix::from_columns(
            3,
            &[vec![0.0, 1.0, 0.0], vec![18.0, 40.0, 65.0], vec![2.0, 0.0, 1.0]],
        );
        let binary = binarize(&matrix);
        assert_eq!(binary.rows(), 3);
        assert_eq!(binary.cols(), 3);
        assert_eq!(binary.row(1), &[1, 0, 0]);
    }
}
