// SPDX-License-Identifier: MIT
//! MTU3 register blocks.
//!
//! Each channel owns a small block of control, status, counter and compare registers. Three
//! bytes live outside every channel block and are shared by the whole unit: a status byte and
//! two start/stop registers with one run bit per channel. Only start/stop A is used here, B
//! serves a channel group this driver does not drive.

use tock_registers::{register_bitfields, register_structs, registers::ReadWrite};

use crate::driver::MMIODerefWrapper;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

register_bitfields! {
    u8,

    /// Timer Control Register
    pub TCR [
        /// Time prescaler
        TPSC OFFSET(0) NUMBITS(3) [
            Div1 = 0,
            Div4 = 1,
            Div16 = 2,
            Div64 = 3
        ],

        /// Clock edge
        CKEG OFFSET(3) NUMBITS(2) [
            Rising = 0,
            Falling = 1,
            Both = 2
        ],

        /// Counter clear source
        CCLR OFFSET(5) NUMBITS(3) [
            Disabled = 0,
            TGRA = 1,
            TGRB = 2,
            Sync = 3,
            TGRC = 5,
            TGRD = 6
        ]
    ],

    /// Timer Mode Register
    pub TMDR [
        MD OFFSET(0) NUMBITS(4) [
            Normal = 0,
            Pwm1 = 2,
            Pwm2 = 3,
            Phase1 = 4,
            Phase2 = 5,
            Phase3 = 6,
            Phase4 = 7,
            PwmSync = 8
        ],

        /// Buffer operation A
        BFA OFFSET(4) NUMBITS(1) [],
        BFB OFFSET(5) NUMBITS(1) [],
        BFE OFFSET(6) NUMBITS(1) []
    ],

    /// Timer I/O Control Register
    pub TIOR [
        IOCL OFFSET(0) NUMBITS(4) [
            Retain = 0,
            Out0Clear = 1,
            Out0Set = 2,
            Out0Toggle = 3,
            Out1Clear = 5,
            Out1Set = 6,
            Out1Toggle = 7
        ],

        IOCH OFFSET(4) NUMBITS(4) [
            Retain = 0,
            Out0Clear = 1,
            Out0Set = 2,
            Out0Toggle = 3,
            Out1Clear = 5,
            Out1Set = 6,
            Out1Toggle = 7
        ]
    ],

    /// Timer Interrupt Enable Register
    pub TIER [
        TGIEA OFFSET(0) NUMBITS(1) [],
        TGIEB OFFSET(1) NUMBITS(1) [],
        TGIEC OFFSET(2) NUMBITS(1) [],
        TGIED OFFSET(3) NUMBITS(1) [],
        TCIEV OFFSET(4) NUMBITS(1) [],
        TCIEU OFFSET(5) NUMBITS(1) [],
        TTGE2 OFFSET(6) NUMBITS(1) [],
        TTGE OFFSET(7) NUMBITS(1) []
    ],

    /// Timer Status Register
    pub TSR [
        TGFA OFFSET(0) NUMBITS(1) [],
        TGFB OFFSET(1) NUMBITS(1) [],
        TGFC OFFSET(2) NUMBITS(1) [],
        TGFD OFFSET(3) NUMBITS(1) [],
        TCFV OFFSET(4) NUMBITS(1) [],
        TCFU OFFSET(5) NUMBITS(1) [],
        TCFD OFFSET(7) NUMBITS(1) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub ChannelRegisterBlock {
        (0x0 => pub TCR: ReadWrite<u8, TCR::Register>),
        (0x1 => pub TMDR: ReadWrite<u8, TMDR::Register>),
        (0x2 => pub TIOR: ReadWrite<u8, TIOR::Register>),
        (0x3 => _reserved0),
        (0x4 => pub TIER: ReadWrite<u8, TIER::Register>),
        (0x5 => pub TSR: ReadWrite<u8, TSR::Register>),
        (0x6 => pub TCNT: ReadWrite<u16>),
        (0x8 => pub TGRA: ReadWrite<u16>),
        (0xA => @END),
    }
}

register_structs! {
    #[allow(non_snake_case)]
    pub SharedRegisterBlock {
        (0x000 => _reserved0),
        (0x080 => pub TSTRA: ReadWrite<u8>),
        (0x081 => _reserved1),
        (0x880 => pub TSTRB: ReadWrite<u8>),
        (0x881 => _reserved2),
        (0xAB4 => pub TSTAT: ReadWrite<u8>),
        (0xAB5 => @END),
    }
}

/// Abstraction for the registers of one channel.
pub type ChannelRegisters = MMIODerefWrapper<ChannelRegisterBlock>;

/// Abstraction for the unit-wide registers.
pub type SharedRegisters = MMIODerefWrapper<SharedRegisterBlock>;

/// Bytes the register window must span.
pub const REGISTER_WINDOW_SIZE: usize = core::mem::size_of::<SharedRegisterBlock>();
