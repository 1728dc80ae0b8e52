//! Register map definitions for the ATM90E26 energy metering IC.
//!
//! Every register is 16 bits wide. Addresses are 7-bit; bit 7 of the header
//! byte selects read (`1`) or write (`0`).
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::CurrentGain;

// Status and special registers.
/// Register address of `SoftReset`.
pub const REG_SOFTRESET: u8 = 0x00;
/// Register address of `SysStatus`.
pub const REG_SYSSTATUS: u8 = 0x01;
/// Register address of `FuncEn`.
pub const REG_FUNCEN: u8 = 0x02;
/// Register address of `SagTh`.
pub const REG_SAGTH: u8 = 0x03;
/// Register address of `SmallPMod`.
pub const REG_SMALLPMOD: u8 = 0x04;
/// Register address of `LastData`.
pub const REG_LASTDATA: u8 = 0x06;

// Metering calibration and configuration registers.
/// Register address of `CalStart`.
pub const REG_CALSTART: u8 = 0x20;
/// Register address of `PLconstH`.
pub const REG_PLCONSTH: u8 = 0x21;
/// Register address of `PLconstL`.
pub const REG_PLCONSTL: u8 = 0x22;
/// Register address of `Lgain`.
pub const REG_LGAIN: u8 = 0x23;
/// Register address of `Lphi`.
pub const REG_LPHI: u8 = 0x24;
/// Register address of `Ngain`.
pub const REG_NGAIN: u8 = 0x25;
/// Register address of `Nphi`.
pub const REG_NPHI: u8 = 0x26;
/// Register address of `PStartTh`.
pub const REG_PSTARTTH: u8 = 0x27;
/// Register address of `PNolTh`.
pub const REG_PNOLTH: u8 = 0x28;
/// Register address of `QStartTh`.
pub const REG_QSTARTTH: u8 = 0x29;
/// Register address of `QNolTh`.
pub const REG_QNOLTH: u8 = 0x2A;
/// Register address of `MMode`.
pub const REG_MMODE: u8 = 0x2B;
/// Register address of `CS1`.
pub const REG_CS1: u8 = 0x2C;

// Measurement calibration registers.
/// Register address of `AdjStart`.
pub const REG_ADJSTART: u8 = 0x30;
/// Register address of `Ugain`.
pub const REG_UGAIN: u8 = 0x31;
/// Register address of `IgainL`.
pub const REG_IGAINL: u8 = 0x32;
/// Register address of `IgainN`.
pub const REG_IGAINN: u8 = 0x33;
/// Register address of `Uoffset`.
pub const REG_UOFFSET: u8 = 0x34;
/// Register address of `IoffsetL`.
pub const REG_IOFFSETL: u8 = 0x35;
/// Register address of `IoffsetN`.
pub const REG_IOFFSETN: u8 = 0x36;
/// Register address of `PoffsetL`.
pub const REG_POFFSETL: u8 = 0x37;
/// Register address of `QoffsetL`.
pub const REG_QOFFSETL: u8 = 0x38;
/// Register address of `PoffsetN`.
pub const REG_POFFSETN: u8 = 0x39;
/// Register address of `QoffsetN`.
pub const REG_QOFFSETN: u8 = 0x3A;
/// Register address of `CS2`.
pub const REG_CS2: u8 = 0x3B;

// Energy registers (cleared after read).
/// Register address of `APenergy`.
pub const REG_APENERGY: u8 = 0x40;
/// Register address of `ANenergy`.
pub const REG_ANENERGY: u8 = 0x41;
/// Register address of `ATenergy`.
pub const REG_ATENERGY: u8 = 0x42;
/// Register address of `RPenergy`.
pub const REG_RPENERGY: u8 = 0x43;
/// Register address of `RNenergy`.
pub const REG_RNENERGY: u8 = 0x44;
/// Register address of `RTenergy`.
pub const REG_RTENERGY: u8 = 0x45;
/// Register address of `EnStatus`.
pub const REG_ENSTATUS: u8 = 0x46;

// Measurement registers.
/// Register address of `Irms` (L line, milliamps RMS).
pub const REG_IRMS: u8 = 0x48;
/// Register address of `Urms` (centivolts RMS).
pub const REG_URMS: u8 = 0x49;
/// Register address of `Pmean` (L line active power, signed).
pub const REG_PMEAN: u8 = 0x4A;
/// Register address of `Qmean` (L line reactive power, signed).
pub const REG_QMEAN: u8 = 0x4B;
/// Register address of `Freq` (centihertz).
pub const REG_FREQ: u8 = 0x4C;
/// Register address of `PowerF`.
pub const REG_POWERF: u8 = 0x4D;
/// Register address of `Pangle`.
pub const REG_PANGLE: u8 = 0x4E;
/// Register address of `Smean`.
pub const REG_SMEAN: u8 = 0x4F;
/// Register address of `Irms2` (N line).
pub const REG_IRMS2: u8 = 0x68;
/// Register address of `Pmean2` (N line active power, signed).
pub const REG_PMEAN2: u8 = 0x6A;
/// Register address of `Qmean2` (N line reactive power, signed).
pub const REG_QMEAN2: u8 = 0x6B;
/// Register address of `PowerF2`.
pub const REG_POWERF2: u8 = 0x6D;
/// Register address of `Pangle2`.
pub const REG_PANGLE2: u8 = 0x6E;
/// Register address of `Smean2`.
pub const REG_SMEAN2: u8 = 0x6F;

/// Highest addressable register.
pub const MAX_ADDRESS: u8 = 0x7F;
/// Header bit marking a read access.
pub const READ_MARKER: u8 = 0x80;

/// Soft reset command value written to `SoftReset`.
pub const SOFT_RESET_COMMAND: u16 = 0x789A;
/// `CalStart`/`AdjStart` value starting the engine without checksum verification.
pub const START_WITHOUT_CHECKSUM: u16 = 0x5678;
/// Default L-line current gain calibration written to `IgainL`.
pub const DEFAULT_IGAINL: u16 = 0x21C1;
/// Default measurement calibration checksum written to `CS2`.
pub const DEFAULT_CS2: u16 = 0xE20E;

/// `FuncEn` bit enabling voltage sag detection.
pub const SAG_ENABLE_BIT: u16 = 1 << 5;
/// `FuncEn` bit routing sag events to the WarnOut pin.
pub const SAG_WARNOUT_BIT: u16 = 1 << 4;
/// `MMode` mask covering the L-line current gain field.
pub const MMODE_GAIN_MASK: u16 = 0xE000;

/// Static description of a register for table-driven tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDescriptor {
    /// Datasheet name.
    pub name: &'static str,
    /// 7-bit register address.
    pub address: u8,
    /// Contents are two's complement.
    pub signed: bool,
}

impl RegisterDescriptor {
    const fn unsigned(name: &'static str, address: u8) -> Self {
        Self {
            name,
            address,
            signed: false,
        }
    }

    const fn signed(name: &'static str, address: u8) -> Self {
        Self {
            name,
            address,
            signed: true,
        }
    }

    /// Finds the descriptor for an address.
    pub fn lookup(address: u8) -> Option<&'static RegisterDescriptor> {
        REGISTER_MAP.iter().find(|reg| reg.address == address)
    }

    /// Finds the descriptor by datasheet name, ignoring ASCII case.
    pub fn lookup_name(name: &str) -> Option<&'static RegisterDescriptor> {
        REGISTER_MAP
            .iter()
            .find(|reg| reg.name.eq_ignore_ascii_case(name))
    }

    /// Interprets a raw value according to the register's signedness.
    pub fn interpret(&self, raw: u16) -> i32 {
        if self.signed {
            raw as i16 as i32
        } else {
            raw as i32
        }
    }
}

/// Every documented register, in address order.
pub static REGISTER_MAP: &[RegisterDescriptor] = &[
    RegisterDescriptor::unsigned("SoftReset", REG_SOFTRESET),
    RegisterDescriptor::unsigned("SysStatus", REG_SYSSTATUS),
    RegisterDescriptor::unsigned("FuncEn", REG_FUNCEN),
    RegisterDescriptor::unsigned("SagTh", REG_SAGTH),
    RegisterDescriptor::unsigned("SmallPMod", REG_SMALLPMOD),
    RegisterDescriptor::unsigned("LastData", REG_LASTDATA),
    RegisterDescriptor::unsigned("CalStart", REG_CALSTART),
    RegisterDescriptor::unsigned("PLconstH", REG_PLCONSTH),
    RegisterDescriptor::unsigned("PLconstL", REG_PLCONSTL),
    RegisterDescriptor::unsigned("Lgain", REG_LGAIN),
    RegisterDescriptor::signed("Lphi", REG_LPHI),
    RegisterDescriptor::unsigned("Ngain", REG_NGAIN),
    RegisterDescriptor::signed("Nphi", REG_NPHI),
    RegisterDescriptor::unsigned("PStartTh", REG_PSTARTTH),
    RegisterDescriptor::unsigned("PNolTh", REG_PNOLTH),
    RegisterDescriptor::unsigned("QStartTh", REG_QSTARTTH),
    RegisterDescriptor::unsigned("QNolTh", REG_QNOLTH),
    RegisterDescriptor::unsigned("MMode", REG_MMODE),
    RegisterDescriptor::unsigned("CS1", REG_CS1),
    RegisterDescriptor::unsigned("AdjStart", REG_ADJSTART),
    RegisterDescriptor::unsigned("Ugain", REG_UGAIN),
    RegisterDescriptor::unsigned("IgainL", REG_IGAINL),
    RegisterDescriptor::unsigned("IgainN", REG_IGAINN),
    RegisterDescriptor::signed("Uoffset", REG_UOFFSET),
    RegisterDescriptor::signed("IoffsetL", REG_IOFFSETL),
    RegisterDescriptor::signed("IoffsetN", REG_IOFFSETN),
    RegisterDescriptor::signed("PoffsetL", REG_POFFSETL),
    RegisterDescriptor::signed("QoffsetL", REG_QOFFSETL),
    RegisterDescriptor::signed("PoffsetN", REG_POFFSETN),
    RegisterDescriptor::signed("QoffsetN", REG_QOFFSETN),
    RegisterDescriptor::unsigned("CS2", REG_CS2),
    RegisterDescriptor::unsigned("APenergy", REG_APENERGY),
    RegisterDescriptor::unsigned("ANenergy", REG_ANENERGY),
    RegisterDescriptor::unsigned("ATenergy", REG_ATENERGY),
    RegisterDescriptor::unsigned("RPenergy", REG_RPENERGY),
    RegisterDescriptor::unsigned("RNenergy", REG_RNENERGY),
    RegisterDescriptor::unsigned("RTenergy", REG_RTENERGY),
    RegisterDescriptor::unsigned("EnStatus", REG_ENSTATUS),
    RegisterDescriptor::unsigned("Irms", REG_IRMS),
    RegisterDescriptor::unsigned("Urms", REG_URMS),
    RegisterDescriptor::signed("Pmean", REG_PMEAN),
    RegisterDescriptor::signed("Qmean", REG_QMEAN),
    RegisterDescriptor::unsigned("Freq", REG_FREQ),
    RegisterDescriptor::unsigned("PowerF", REG_POWERF),
    RegisterDescriptor::unsigned("Pangle", REG_PANGLE),
    RegisterDescriptor::unsigned("Smean", REG_SMEAN),
    RegisterDescriptor::unsigned("Irms2", REG_IRMS2),
    RegisterDescriptor::signed("Pmean2", REG_PMEAN2),
    RegisterDescriptor::signed("Qmean2", REG_QMEAN2),
    RegisterDescriptor::unsigned("PowerF2", REG_POWERF2),
    RegisterDescriptor::unsigned("Pangle2", REG_PANGLE2),
    RegisterDescriptor::unsigned("Smean2", REG_SMEAN2),
];

/// Builds the 3-byte write frame `[addr, value_hi, value_lo]`.
pub const fn write_frame(address: u8, value: u16) -> [u8; 3] {
    let [hi, lo] = value.to_be_bytes();
    [address & MAX_ADDRESS, hi, lo]
}

/// Builds the 1-byte read header `[addr | 0x80]`.
pub const fn read_header(address: u8) -> [u8; 1] {
    [(address & MAX_ADDRESS) | READ_MARKER]
}

/// Bitfield representation of the `MMode` register (address `0x2B`).
///
/// Only the L-line current gain is exposed; the remaining 13 bits pass
/// through unchanged on read-modify-write.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterMode {
    #[skip]
    __: B13,
    // L-line current gain selection (bits 15:13).
    pub current_gain: CurrentGain,
}

impl From<u16> for MeterMode {
    fn from(value: u16) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<MeterMode> for u16 {
    fn from(value: MeterMode) -> Self {
        u16::from_le_bytes(value.into_bytes())
    }
}

/// Bitfield representation of the `FuncEn` register (address `0x02`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEnable {
    #[skip]
    __: B4,
    // Sag event drives the WarnOut pin (bit 4).
    pub sag_warn_out: bool,
    // Voltage sag detection enable (bit 5).
    pub sag_enable: bool,
    #[skip]
    __: B10,
}

impl From<u16> for FunctionEnable {
    fn from(value: u16) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<FunctionEnable> for u16 {
    fn from(value: FunctionEnable) -> Self {
        u16::from_le_bytes(value.into_bytes())
    }
}

/// Bitfield representation of the `SysStatus` register (address `0x01`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemStatus {
    #[skip]
    __: B1,
    // Voltage sag detected (bit 1).
    pub sag_warn: bool,
    #[skip]
    __: B3,
    // Active power direction changed (bit 5).
    pub rev_p_change: bool,
    // Reactive power direction changed (bit 6).
    pub rev_q_change: bool,
    // Metering line switched between L and N (bit 7).
    pub ln_change: bool,
    #[skip]
    __: B4,
    // Measurement calibration checksum error (bits 13:12).
    pub adj_err: B2,
    // Metering calibration checksum error (bits 15:14).
    pub cal_err: B2,
}

impl From<u16> for SystemStatus {
    fn from(value: u16) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<SystemStatus> for u16 {
    fn from(value: SystemStatus) -> Self {
        u16::from_le_bytes(value.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_update_preserves_other_mmode_bits() {
        let gains = [
            CurrentGain::Gain1,
            CurrentGain::Gain4,
            CurrentGain::Gain8,
            CurrentGain::Gain16,
            CurrentGain::Gain24,
        ];
        for old in [0x0000u16, 0xFFFF, 0x9422, 0x1FFF, 0xE000, 0x5A5A, 0xA5A5] {
            for gain in gains {
                let new = u16::from(MeterMode::from(old).with_current_gain(gain));
                assert_eq!(new & !MMODE_GAIN_MASK, old & !MMODE_GAIN_MASK);
                assert_eq!(new >> 13, gain.bits() as u16);
            }
        }
    }

    #[test]
    fn function_enable_bits_match_masks() {
        let funcen = FunctionEnable::from(0x0000u16)
            .with_sag_enable(true)
            .with_sag_warn_out(true);
        assert_eq!(u16::from(funcen), SAG_ENABLE_BIT | SAG_WARNOUT_BIT);

        let kept = FunctionEnable::from(0x800Cu16).with_sag_enable(true);
        assert_eq!(u16::from(kept), 0x800C | SAG_ENABLE_BIT);
    }

    #[test]
    fn system_status_layout_matches_datasheet() {
        let status = SystemStatus::from(0b1001_0000_1010_0010u16);
        assert!(status.sag_warn());
        assert!(status.rev_p_change());
        assert!(!status.rev_q_change());
        assert!(status.ln_change());
        assert_eq!(status.adj_err(), 0b01);
        assert_eq!(status.cal_err(), 0b10);
    }

    #[test]
    fn frames_use_read_marker_and_big_endian_payload() {
        assert_eq!(write_frame(REG_SOFTRESET, 0x789A), [0x00, 0x78, 0x9A]);
        assert_eq!(write_frame(REG_SAGTH, 2000), [0x03, 0x07, 0xD0]);
        assert_eq!(read_header(REG_LASTDATA), [0x86]);
        assert_eq!(read_header(REG_PMEAN), [0xCA]);
    }

    #[test]
    fn register_table_covers_core_addresses() {
        let expected = [
            ("SoftReset", 0x00),
            ("SysStatus", 0x01),
            ("FuncEn", 0x02),
            ("SagTh", 0x03),
            ("LastData", 0x06),
            ("CalStart", 0x20),
            ("MMode", 0x2B),
            ("AdjStart", 0x30),
            ("IgainL", 0x32),
            ("CS2", 0x3B),
            ("Irms", 0x48),
            ("Urms", 0x49),
            ("Pmean", 0x4A),
        ];
        for (name, address) in expected {
            let reg = RegisterDescriptor::lookup_name(name).unwrap();
            assert_eq!(reg.address, address, "{name}");
            assert_eq!(RegisterDescriptor::lookup(address).unwrap().name, name);
        }
        assert!(RegisterDescriptor::lookup_name("pmean").unwrap().signed);
        assert!(!RegisterDescriptor::lookup_name("Irms").unwrap().signed);
    }

    #[test]
    fn register_table_is_sorted_and_unique() {
        assert!(REGISTER_MAP.windows(2).all(|w| w[0].address < w[1].address));
        assert!(REGISTER_MAP.iter().all(|reg| reg.address <= MAX_ADDRESS));
    }

    #[test]
    fn signed_registers_interpret_twos_complement() {
        let pmean = RegisterDescriptor::lookup(REG_PMEAN).unwrap();
        assert_eq!(pmean.interpret(0xFFFF), -1);
        let urms = RegisterDescriptor::lookup(REG_URMS).unwrap();
        assert_eq!(urms.interpret(0xFFFF), 65535);
    }
}
