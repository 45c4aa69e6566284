use std::fmt::Debug;

/// A voxel payload: a fixed-width unsigned scalar.
///
/// A grid is monomorphic over one value width for its whole lifetime. The
/// accumulate operation relies on the type's native modular arithmetic, so
/// overflow wraps rather than erroring.
pub trait Value: Copy + Default + PartialEq + Debug + 'static {
    /// Modular addition with the type's fixed-width wraparound.
    fn wrapping_add(self, rhs: Self) -> Self;
}

macro_rules! impl_value {
    ($($t:ty),*) => {
        $(
            impl Value for $t {
                #[inline]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$t>::wrapping_add(self, rhs)
                }
            }
        )*
    };
}

impl_value!(u8, u16);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wraparound() {
        assert_eq!(Value::wrapping_add(255u8, 2), 1);
        assert_eq!(Value::wrapping_add(u16::MAX, 1), 0);
        assert_eq!(Value::wrapping_add(7u16, 8), 15);
    }
}
