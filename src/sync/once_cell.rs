// SPDX-License-Identifier: MIT
use core::ops::Deref;

//--------------------------------------------------------------------------------------------------
// Public definitions
//--------------------------------------------------------------------------------------------------
/// A cell written exactly once during driver bring-up and read-only afterwards.
pub struct OnceCell<T> {
    data: spin::Once<T>,
}

//--------------------------------------------------------------------------------------------------
// Public code
//--------------------------------------------------------------------------------------------------
impl<T> OnceCell<T> {
    pub const fn new() -> Self {
        Self {
            data: spin::Once::new(),
        }
    }

    pub fn set(&self, value: T) {
        let mut fresh = false;
        self.data.call_once(|| {
            fresh = true;
            value
        });
        assert!(fresh, "OnceCell already initialized");
    }

    pub fn get(&self) -> Option<&T> {
        self.data.get()
    }
}

impl<T> Default for OnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for OnceCell<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get().unwrap_or_else(|| panic!("OnceCell not initialized"))
    }
}
