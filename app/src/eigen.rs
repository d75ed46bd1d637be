use std::error::Error;
use std::fmt::{Display, Formatter};

use nalgebra::DMatrix;
use ndarray::Array2;

/// Eigenvalues this far below the dominant one are treated as numerically
/// zero variance; their axes are dropped instead of divided by ~0.
const RELATIVE_VARIANCE_CUTOFF: f64 = 1e-9;

/// Errors that can occur while computing an eigenimage basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EigenError {
    /// Cannot compute a basis over zero images.
    EmptyBatch,
    /// All images in the batch must share one shape.
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// The component count must be in `[1, batch size]`.
    InvalidComponentCount { requested: usize, batch: usize },
}

impl Display for EigenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EigenError::EmptyBatch => write!(f, "Cannot compute eigenimages of an empty batch"),
            EigenError::ShapeMismatch { expected, actual } => write!(
                f,
                "All images must share one shape; expected {expected:?}, got {actual:?}"
            ),
            EigenError::InvalidComponentCount { requested, batch } => write!(
                f,
                "Component count {requested} must be between 1 and the batch size {batch}"
            ),
        }
    }
}

impl Error for EigenError {}

/// Computes up to `n` eigenimages of a batch of grayscale rasters.
///
/// The batch is flattened into an images x pixels matrix and centered; the
/// principal axes come from the symmetric eigendecomposition of its Gram
/// matrix, ordered by descending variance. Each axis is mapped back to
/// pixel space, min-max normalized to 0..255 and reshaped to the input
/// image shape. Axes whose variance is numerically zero are dropped, so
/// the result may hold fewer than `n` images for a low-rank batch.
///
/// # Errors
///
/// [`EigenError::EmptyBatch`] for an empty batch,
/// [`EigenError::ShapeMismatch`] when image shapes differ, and
/// [`EigenError::InvalidComponentCount`] unless `1 <= n <= batch size`.
pub fn generate_eigenimages(
    images: &[Array2<u8>],
    n: usize,
) -> Result<Vec<Array2<u8>>, EigenError> {
    let first = images.first().ok_or(EigenError::EmptyBatch)?;
    let shape = first.dim();
    for img in images {
        if img.dim() != shape {
            return Err(EigenError::ShapeMismatch {
                expected: shape,
                actual: img.dim(),
            });
        }
    }
    if n == 0 || n > images.len() {
        return Err(EigenError::InvalidComponentCount {
            requested: n,
            batch: images.len(),
        });
    }

    let (rows, cols) = shape;
    let pixels = rows * cols;
    let batch = images.len();

    let mut flat = Vec::with_capacity(batch * pixels);
    for img in images {
        flat.extend(img.iter().map(|&px| px as f64));
    }
    let mut centered = DMatrix::from_row_slice(batch, pixels, &flat);

    let mean = centered.row_sum() / batch as f64;
    for i in 0..batch {
        let mut row = centered.row_mut(i);
        row -= &mean;
    }

    // Gram trick: with far fewer images than pixels, eigendecompose the
    // batch x batch Gram matrix and map each eigenvector back to pixel
    // space as X^T u / sqrt(lambda).
    let centered_t = centered.transpose();
    let gram = &centered * &centered_t;
    let eig = gram.symmetric_eigen();

    let mut order: Vec<usize> = (0..batch).collect();
    order.sort_by(|&a, &b| {
        eig.eigenvalues[b]
            .partial_cmp(&eig.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cutoff = eig.eigenvalues[order[0]].max(0.0) * RELATIVE_VARIANCE_CUTOFF;

    let mut basis = Vec::new();
    for &idx in order.iter().take(n) {
        let lambda = eig.eigenvalues[idx];
        if lambda <= cutoff || lambda <= 0.0 {
            continue;
        }
        let axis = &centered_t * eig.eigenvectors.column(idx) / lambda.sqrt();
        basis.push(to_gray_image(axis.as_slice(), shape));
    }

    Ok(basis)
}

/// Min-max normalizes one pixel-space axis into 0..255 and reshapes it to
/// the image dimensions.
fn to_gray_image(axis: &[f64], shape: (usize, usize)) -> Array2<u8> {
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for &v in axis {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let range = hi - lo;

    let quantized: Vec<u8> = axis
        .iter()
        .map(|&v| {
            if range == 0.0 {
                0
            } else {
                ((v - lo) / range * 255.0) as u8
            }
        })
        .collect();

    Array2::from_shape_vec(shape, quantized).expect("axis length matches the image shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(bright_left: bool, level: u8) -> Array2<u8> {
        Array2::from_shape_fn((4, 4), |(_, col)| {
            let in_bright_half = if bright_left { col < 2 } else { col >= 2 };
            if in_bright_half { level } else { 0 }
        })
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        assert_eq!(generate_eigenimages(&[], 1), Err(EigenError::EmptyBatch));
    }

    #[test]
    fn test_component_count_bounds() {
        let batch = vec![patterned(true, 200), patterned(false, 200)];
        assert_eq!(
            generate_eigenimages(&batch, 0),
            Err(EigenError::InvalidComponentCount {
                requested: 0,
                batch: 2
            })
        );
        assert_eq!(
            generate_eigenimages(&batch, 3),
            Err(EigenError::InvalidComponentCount {
                requested: 3,
                batch: 2
            })
        );
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let batch = vec![patterned(true, 200), Array2::zeros((2, 8))];
        assert_eq!(
            generate_eigenimages(&batch, 1),
            Err(EigenError::ShapeMismatch {
                expected: (4, 4),
                actual: (2, 8)
            })
        );
    }

    #[test]
    fn test_dominant_component_separates_patterns() {
        let batch = vec![
            patterned(true, 200),
            patterned(true, 180),
            patterned(false, 200),
            patterned(false, 180),
        ];
        let basis = generate_eigenimages(&batch, 1).unwrap();

        assert_eq!(basis.len(), 1);
        assert_eq!(basis[0].dim(), (4, 4));
        // The dominant axis contrasts the left-bright and right-bright
        // groups, so its normalized image spans both extremes.
        assert!(basis[0].iter().any(|&px| px < 64));
        assert!(basis[0].iter().any(|&px| px > 192));
    }

    #[test]
    fn test_low_rank_batch_drops_flat_axes() {
        // Two identical images: the centered batch has rank 0, so no axis
        // carries variance and the basis comes back empty.
        let batch = vec![patterned(true, 200), patterned(true, 200)];
        let basis = generate_eigenimages(&batch, 2).unwrap();
        assert!(basis.is_empty());
    }

    #[test]
    fn test_basis_is_deterministic() {
        let batch = vec![
            patterned(true, 200),
            patterned(false, 190),
            patterned(true, 120),
        ];
        assert_eq!(
            generate_eigenimages(&batch, 2).unwrap(),
            generate_eigenimages(&batch, 2).unwrap()
        );
    }
}
