//! Operator boilerplate for transparent numeric newtypes.

/// Implements a standard operator trait for a single-field tuple struct by delegating to
/// the inner value. The trait must be in scope at the call site.
#[macro_export]
macro_rules! op {
    (binary $t:ty, $op:ident, $method:ident) => {
        impl $op for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self($op::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $t:ty, $op:ident, $method:ident) => {
        impl $op for $t {
            fn $method(&mut self, rhs: Self) {
                $op::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $t:ty, $op:ident, $method:ident) => {
        impl $op for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self($op::$method(self.0))
            }
        }
    };
}
