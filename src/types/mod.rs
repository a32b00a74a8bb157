//! Small geometric types used everywhere else in the crate: 3D vectors and
//! 3x3 matrices, generic over the floating point scalar.

/// Implement `scalar op Vector3D` and `scalar op Matrix3` for a concrete
/// scalar type. The symmetric `Vector3D op scalar` impls are generic, but
/// putting the scalar on the left-hand side requires one impl per concrete
/// type.
macro_rules! scalar_lhs_arithmetic {
    ($Scalar: ty) => {
        impl std::ops::Mul<crate::types::Vector3D<$Scalar>> for $Scalar {
            type Output = crate::types::Vector3D<$Scalar>;
            #[inline]
            fn mul(self, rhs: crate::types::Vector3D<$Scalar>) -> Self::Output {
                rhs * self
            }
        }

        impl std::ops::Mul<crate::types::Matrix3<$Scalar>> for $Scalar {
            type Output = crate::types::Matrix3<$Scalar>;
            #[inline]
            fn mul(self, rhs: crate::types::Matrix3<$Scalar>) -> Self::Output {
                rhs * self
            }
        }
    };
}

mod scalars;
pub use self::scalars::{PairIndex, Scalar};

mod vectors;
pub use self::vectors::Vector3D;

mod matrix;
pub use self::matrix::Matrix3;

mod stack_vec;
pub use self::stack_vec::StackVec;

scalar_lhs_arithmetic!(f32);
scalar_lhs_arithmetic!(f64);
