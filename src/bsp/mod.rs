// SPDX-License-Identifier: MIT
//! Board support: where the timer lives and how it is wired on supported SoCs.

pub mod rzg2l;
