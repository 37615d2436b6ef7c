// SPDX-License-Identifier: MIT
//! Hardware timer drivers.

pub mod mtu3;
