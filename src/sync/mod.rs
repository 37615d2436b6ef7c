// SPDX-License-Identifier: MIT
mod irq_safe_spin;
mod once_cell;

pub mod interface;

pub use self::irq_safe_spin::*;
pub use self::once_cell::*;
