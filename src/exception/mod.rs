// SPDX-License-Identifier: MIT
pub mod asynchronous;
pub mod interface;
