//! Values of the machine-level control and status registers the boot sequence writes.
//!
//! Each type here is a plain value with a `bits()` encoding. Nothing in this module
//! touches hardware; the writes happen through [`HartContext`](crate::HartContext).

use core::ops::Range;

use bit_field::BitField;
use bitflags::bitflags;
use strum::FromRepr;

/// A RISC-V privilege level, as encoded in the two-bit `MPP` field of `mstatus`.
#[derive(FromRepr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum PrivilegeMode {
    User = 0,
    Supervisor = 1,
    Machine = 3,
}

bitflags! {
    /// Interrupt-enable bits of `mstatus`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StatusFlags: usize {
        const SIE = 1 << 1;
        const MIE = 1 << 3;
        const SPIE = 1 << 5;
        const MPIE = 1 << 7;
    }
}

/// Bit range of the previous-privilege field in `mstatus`.
const MPP: Range<usize> = 11..13;

/// An `mstatus` image: the privilege level `mret` will switch to, and the enable bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub previous: PrivilegeMode,
    pub flags: StatusFlags,
}

impl Status {
    pub const fn new(previous: PrivilegeMode, flags: StatusFlags) -> Self {
        Self { previous, flags }
    }

    pub fn bits(&self) -> usize {
        let mut bits = self.flags.bits();
        bits.set_bits(MPP, self.previous as usize);
        bits
    }

    /// Decodes an `mstatus` value. Returns `None` for the reserved `MPP` encoding.
    pub fn from_bits(bits: usize) -> Option<Self> {
        let previous = PrivilegeMode::from_repr(bits.get_bits(MPP))?;
        Some(Self::new(previous, StatusFlags::from_bits_truncate(bits)))
    }
}

bitflags! {
    /// Per-source interrupt-enable bits of `mie`. The empty set masks everything.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InterruptMask: usize {
        const SSIE = 1 << 1;
        const MSIE = 1 << 3;
        const STIE = 1 << 5;
        const MTIE = 1 << 7;
        const SEIE = 1 << 9;
        const MEIE = 1 << 11;
    }
}

bitflags! {
    /// Access permissions of a PMP entry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PmpPermissions: u8 {
        const R = 1 << 0;
        const W = 1 << 1;
        const X = 1 << 2;
    }
}

/// Address-matching mode of a PMP entry (the `A` field).
#[derive(FromRepr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressMatching {
    Off = 0,
    /// Top of range: the entry covers `[previous pmpaddr, this pmpaddr)`.
    Tor = 1,
    Na4 = 2,
    Napot = 3,
}

/// One `pmpcfg` byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PmpConfig {
    pub permissions: PmpPermissions,
    pub matching: AddressMatching,
    /// A locked entry also binds machine mode and cannot be rewritten until reset.
    pub locked: bool,
}

impl PmpConfig {
    pub fn bits(&self) -> u8 {
        let mut bits = self.permissions.bits();
        bits.set_bits(3..5, self.matching as u8);
        bits.set_bit(7, self.locked);
        bits
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            permissions: PmpPermissions::from_bits_truncate(bits),
            // A two-bit field always decodes.
            matching: AddressMatching::from_repr(bits.get_bits(3..5)).unwrap_or(AddressMatching::Off),
            locked: bits.get_bit(7),
        }
    }
}

/// PMP entry 0: its configuration byte and its `pmpaddr0` value.
///
/// `address` is in `pmpaddr` units, i.e. a physical address shifted right by two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PmpEntry {
    pub config: PmpConfig,
    pub address: usize,
}

impl PmpEntry {
    /// The full `pmpcfg0` value, with entries 1..8 switched off.
    pub fn cfg_bits(&self) -> usize {
        self.config.bits() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_places_mpp_at_bit_11() {
        let status = Status::new(PrivilegeMode::Supervisor, StatusFlags::MPIE);
        assert_eq!(status.bits(), (1 << 11) | (1 << 7));

        let status = Status::new(PrivilegeMode::Machine, StatusFlags::MPIE | StatusFlags::MIE);
        assert_eq!(status.bits(), (0b11 << 11) | (1 << 7) | (1 << 3));
    }

    #[test]
    fn status_decodes_what_it_encodes() {
        let status = Status::new(PrivilegeMode::Supervisor, StatusFlags::MPIE | StatusFlags::SPIE);
        assert_eq!(Status::from_bits(status.bits()), Some(status));
    }

    #[test]
    fn reserved_mpp_does_not_decode() {
        assert_eq!(Status::from_bits(0b10 << 11), None);
    }

    #[test]
    fn machine_interrupt_sources_match_mie_layout() {
        let mask = InterruptMask::MSIE | InterruptMask::MTIE | InterruptMask::MEIE;
        assert_eq!(mask.bits(), (1 << 3) | (1 << 7) | (1 << 11));
        assert_eq!(InterruptMask::empty().bits(), 0);
    }

    #[test]
    fn tor_rwx_is_0x0f() {
        let config = PmpConfig {
            permissions: PmpPermissions::all(),
            matching: AddressMatching::Tor,
            locked: false,
        };
        assert_eq!(config.bits(), 0x0f);
        assert_eq!(PmpConfig::from_bits(0x0f), config);
    }

    #[test]
    fn lock_bit_is_bit_7() {
        let config = PmpConfig {
            permissions: PmpPermissions::R,
            matching: AddressMatching::Napot,
            locked: true,
        };
        assert_eq!(config.bits(), 0x80 | 0x18 | 0x01);
    }

    #[test]
    fn images_fit_the_writable_csr_bits() {
        // Register writers keep only these bits of `mstatus` and `mie`.
        const MSTATUS_WRITABLE: usize = 0x8000_0000_007f_fffe;
        const MIE_WRITABLE: usize = 0xaaa;

        for mode in [PrivilegeMode::User, PrivilegeMode::Supervisor, PrivilegeMode::Machine] {
            let status = Status::new(mode, StatusFlags::all());
            assert_eq!(status.bits() & !MSTATUS_WRITABLE, 0, "{mode:?}");
        }
        assert_eq!(InterruptMask::all().bits() & !MIE_WRITABLE, 0);
    }
}
