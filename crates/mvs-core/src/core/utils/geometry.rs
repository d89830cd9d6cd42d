use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use thiserror::Error;

const ROTATION_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("`{param}` must have {expected} values, found {actual}")]
    InvalidLength {
        param: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{param}` contains a non-finite value")]
    NonFinite { param: &'static str },

    #[error("`rotation` is not a proper rotation: {reason}")]
    InvalidRotation { reason: String },

    #[error("Transform matrix bottom row must be [0, 0, 0, 1]")]
    NotAffine,
}

/// Builds a 4x4 affine transform from an optional rotation and translation.
///
/// # Arguments
///
/// * `rotation` - Nine values of a 3x3 rotation in row-major order. Identity if absent.
/// * `translation` - Three values. Zero if absent.
///
/// # Return
///
/// The matrix that rotates first and then translates.
///
/// # Errors
///
/// Fails when a parameter has the wrong number of values, contains a
/// non-finite value, or when the rotation is not orthonormal with determinant +1.
pub fn transform_matrix(
    rotation: Option<&[f64]>,
    translation: Option<&[f64]>,
) -> Result<Matrix4<f64>, TransformError> {
    let rotation = match rotation {
        Some(values) => parse_rotation(values)?,
        None => Matrix3::identity(),
    };
    let translation = match translation {
        Some(values) => parse_translation(values)?,
        None => Vector3::zeros(),
    };

    let mut matrix = Matrix4::identity();
    matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
    validate_affine(&matrix)?;
    Ok(matrix)
}

/// Combines transforms given in application order into one matrix.
pub fn compose_transforms(transforms: &[Matrix4<f64>]) -> Matrix4<f64> {
    transforms
        .iter()
        .fold(Matrix4::identity(), |acc, next| next * acc)
}

pub fn validate_affine(matrix: &Matrix4<f64>) -> Result<(), TransformError> {
    if matrix.iter().any(|value| !value.is_finite()) {
        return Err(TransformError::NonFinite { param: "matrix" });
    }
    if matrix.row(3).transpose() != Vector4::new(0.0, 0.0, 0.0, 1.0) {
        return Err(TransformError::NotAffine);
    }
    Ok(())
}

fn parse_rotation(values: &[f64]) -> Result<Matrix3<f64>, TransformError> {
    check_values("rotation", values, 9)?;
    let rotation = Matrix3::from_row_slice(values);

    let deviation = (rotation * rotation.transpose() - Matrix3::identity()).abs().max();
    if deviation > ROTATION_TOLERANCE {
        return Err(TransformError::InvalidRotation {
            reason: format!("not orthonormal (max deviation {deviation:.4})"),
        });
    }
    let determinant = rotation.determinant();
    if (determinant - 1.0).abs() > ROTATION_TOLERANCE {
        return Err(TransformError::InvalidRotation {
            reason: format!("determinant is {determinant:.4}, expected 1"),
        });
    }
    Ok(rotation)
}

fn parse_translation(values: &[f64]) -> Result<Vector3<f64>, TransformError> {
    check_values("translation", values, 3)?;
    Ok(Vector3::new(values[0], values[1], values[2]))
}

fn check_values(param: &'static str, values: &[f64], expected: usize) -> Result<(), TransformError> {
    if values.len() != expected {
        return Err(TransformError::InvalidLength {
            param,
            expected,
            actual: values.len(),
        });
    }
    if values.iter().any(|value| !value.is_finite()) {
        return Err(TransformError::NonFinite { param });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    const IDENTITY: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

    #[test]
    fn identity_rotation_with_translation_builds_affine_matrix() {
        let matrix = transform_matrix(Some(&IDENTITY), Some(&[1.0, 2.0, 3.0])).unwrap();
        let moved = matrix.transform_point(&Point3::origin());
        assert_eq!(moved, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(matrix.row(3).transpose(), Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn absent_params_give_identity() {
        assert_eq!(transform_matrix(None, None).unwrap(), Matrix4::identity());
    }

    #[test]
    fn rotation_is_read_row_major() {
        // 90 degrees about z: x -> y.
        let rotation = [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let matrix = transform_matrix(Some(&rotation), None).unwrap();
        let moved = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((moved - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn short_rotation_is_a_length_error() {
        let err = transform_matrix(Some(&IDENTITY[..8]), None).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidLength {
                param: "rotation",
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn wrong_translation_length_names_translation() {
        let err = transform_matrix(None, Some(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, TransformError::InvalidLength { param: "translation", .. }));
    }

    #[test]
    fn all_ones_rotation_is_rejected() {
        let err = transform_matrix(Some(&[1.0; 9]), None).unwrap_err();
        assert!(matches!(err, TransformError::InvalidRotation { .. }));
    }

    #[test]
    fn reflection_is_rejected() {
        let mirror = [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let err = transform_matrix(Some(&mirror), None).unwrap_err();
        assert!(matches!(err, TransformError::InvalidRotation { ref reason } if reason.contains("determinant")));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = transform_matrix(None, Some(&[f64::NAN, 0.0, 0.0])).unwrap_err();
        assert_eq!(err, TransformError::NonFinite { param: "translation" });
    }

    #[test]
    fn compose_applies_in_order() {
        let rotate = transform_matrix(
            Some(&[0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
            None,
        )
        .unwrap();
        let shift = transform_matrix(None, Some(&[10.0, 0.0, 0.0])).unwrap();
        let combined = compose_transforms(&[rotate, shift]);
        let moved = combined.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((moved - Point3::new(10.0, 1.0, 0.0)).norm() < 1e-12);
    }
}
