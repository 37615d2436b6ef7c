// SPDX-License-Identifier: MIT
use core::marker::PhantomData;
use core::{fmt, ops};
use core::fmt::Formatter;

/// A wrapper for usize with an integrated range bound check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundedUsize<const MAX_INCLUSIVE: usize>(usize);

pub struct MMIODerefWrapper<T> {
    start_addr: usize,
    phantom: PhantomData<fn() -> T>,
}

impl<T> MMIODerefWrapper<T> {
    /// Create an instance.
    ///
    /// # Safety
    ///
    /// - `start_addr` must point at a mapped register block laid out as `T`, valid for the
    ///   lifetime of the wrapper.
    pub const unsafe fn new(start_addr: usize) -> Self {
        Self {
            start_addr,
            phantom: PhantomData,
        }
    }
}

impl<T> ops::Deref for MMIODerefWrapper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.start_addr as *const _) }
    }
}

impl<const MAX_INCLUSIVE: usize> BoundedUsize<{ MAX_INCLUSIVE }> {
    pub const MAX_INCLUSIVE: usize = MAX_INCLUSIVE;

    /// Create an instance.
    pub const fn new(value: usize) -> Self {
        assert!(value <= MAX_INCLUSIVE);
        Self(value)
    }

    /// Create an instance, or `None` if `value` is out of range.
    pub const fn try_new(value: usize) -> Option<Self> {
        if value <= MAX_INCLUSIVE {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the value.
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl<const MAX_INCLUSIVE: usize> fmt::Display for BoundedUsize<{ MAX_INCLUSIVE }> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
