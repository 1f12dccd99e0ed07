//! Leveled invariant checks.
//!
//! A failing check is a defect in the solver, never a search outcome, so every check panics. The
//! cheap checks are always compiled in; the expensive ones only with the `debug-checks` feature.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const TERN_ASSERT_LEVEL_DEFINITION: u8 = TERN_ASSERT_SIMPLE;

#[cfg(all(test, not(feature = "debug-checks")))]
pub const TERN_ASSERT_LEVEL_DEFINITION: u8 = TERN_ASSERT_MODERATE;

#[cfg(feature = "debug-checks")]
pub const TERN_ASSERT_LEVEL_DEFINITION: u8 = TERN_ASSERT_ADVANCED;

pub const TERN_ASSERT_SIMPLE: u8 = 1;
pub const TERN_ASSERT_MODERATE: u8 = 2;
pub const TERN_ASSERT_ADVANCED: u8 = 3;

#[macro_export]
#[doc(hidden)]
macro_rules! tern_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::TERN_ASSERT_LEVEL_DEFINITION >= $crate::asserts::TERN_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tern_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::TERN_ASSERT_LEVEL_DEFINITION >= $crate::asserts::TERN_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tern_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::TERN_ASSERT_LEVEL_DEFINITION >= $crate::asserts::TERN_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tern_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::TERN_ASSERT_LEVEL_DEFINITION >= $crate::asserts::TERN_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}
