// SPDX-License-Identifier: MIT
use crate::exception;
use crate::sync::interface::Mutex;

//--------------------------------------------------------------------------------------------------
// Public definitions
//--------------------------------------------------------------------------------------------------
/// A spin lock that masks local interrupts for as long as it is held.
///
/// Masking interrupts first keeps an interrupt handler on the same core from spinning forever
/// on a lock its own core already holds. Critical sections must be short and must not block.
pub struct IRQSafeSpinLock<T>
where
    T: ?Sized,
{
    inner: spin::Mutex<T>,
}

//--------------------------------------------------------------------------------------------------
// Public code
//--------------------------------------------------------------------------------------------------
impl<T> IRQSafeSpinLock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            inner: spin::Mutex::new(data),
        }
    }
}

impl<T> Mutex for IRQSafeSpinLock<T> {
    type Data = T;

    fn lock<R>(&self, f: impl FnOnce(&mut Self::Data) -> R) -> R {
        exception::asynchronous::exec_with_masked_irqs(|| {
            let mut data = self.inner.lock();
            f(&mut data)
        })
    }
}
