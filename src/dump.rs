//! Table-driven register dump.

use core::slice;

use crate::device::Atm90e26;
use crate::error::Result;
use crate::interface::Atm90e26Interface;
use crate::registers::{RegisterDescriptor, REGISTER_MAP};

/// Iterator over [`REGISTER_MAP`] yielding a verified read per register.
///
/// A failed read is yielded in place and iteration continues with the next
/// entry. Energy registers clear on read, so a dump resets their
/// accumulators.
pub struct RegisterDump<'a, IFACE> {
    device: &'a mut Atm90e26<IFACE>,
    registers: slice::Iter<'static, RegisterDescriptor>,
}

impl<IFACE> Atm90e26<IFACE>
where
    IFACE: Atm90e26Interface,
{
    /// Reads every documented register in address order.
    pub fn dump_registers(&mut self) -> RegisterDump<'_, IFACE> {
        RegisterDump {
            device: self,
            registers: REGISTER_MAP.iter(),
        }
    }
}

impl<IFACE> Iterator for RegisterDump<'_, IFACE>
where
    IFACE: Atm90e26Interface,
{
    type Item = (&'static RegisterDescriptor, Result<u16, IFACE::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let register = self.registers.next()?;
        Some((register, self.device.verified_read_register(register.address)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.registers.size_hint()
    }
}

impl<IFACE> ExactSizeIterator for RegisterDump<'_, IFACE> where IFACE: Atm90e26Interface {}
