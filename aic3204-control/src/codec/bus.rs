//! Paged register bus.
//!
//! Every register access on the AIC3204 is two transfers: a write of the page
//! number to the page-select register, then the access itself. Another
//! transfer slipping in between would redirect the access to a different
//! page, so [`PagedBus`] serializes whole compound operations behind a
//! blocking mutex and hands out a [`Transaction`] while the lock is held.
//!
//! Transfer framing on the wire:
//! - write: `[reg, value]`
//! - read: `[reg]`, then exactly one data byte

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::i2c::I2c;

use super::registers::{self as reg, RegisterAddress};

/// Bus shareable across threads and interrupt contexts.
pub type SharedBus<I2C> = PagedBus<CriticalSectionRawMutex, I2C>;

/// Bus for single-context use.
pub type LocalBus<I2C> = PagedBus<NoopRawMutex, I2C>;

/// Byte-register transport guarded by a lock held for whole compound
/// operations.
pub struct PagedBus<M: RawMutex, I2C> {
    i2c: Mutex<M, RefCell<I2C>>,
    address: u8,
}

impl<M: RawMutex, I2C> PagedBus<M, I2C> {
    /// The 7-bit I2C address of the codec.
    pub fn address(&self) -> u8 {
        self.address
    }
}

impl<M: RawMutex, I2C: I2c> PagedBus<M, I2C> {
    /// Default 7-bit I2C address.
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR;

    /// Create a bus at the default I2C address (0x18).
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_ADDRESS)
    }

    /// Create a bus at a specific I2C address.
    pub fn new_with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c: Mutex::new(RefCell::new(i2c)),
            address,
        }
    }

    /// Run `f` as one compound operation with exclusive use of the bus.
    ///
    /// The transaction starts with the device page unknown, so the first
    /// register access always selects its page.
    ///
    /// # Panics
    ///
    /// Panics if `f` re-enters this bus.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut Transaction<'_, I2C>) -> R) -> R {
        self.i2c.lock(|cell| {
            let mut i2c = cell.borrow_mut();
            let mut tx = Transaction {
                i2c: &mut *i2c,
                address: self.address,
                page: None,
            };
            f(&mut tx)
        })
    }

    /// Select `page`, then write `value` to `reg`.
    ///
    /// Exactly two transfers; the second is skipped when the page select fails.
    pub fn write(&self, page: u8, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.transaction(|tx| tx.write(RegisterAddress::new(page, reg), value))
    }

    /// Select `page`, then read `reg`.
    pub fn read(&self, page: u8, reg: u8) -> Result<u8, I2C::Error> {
        self.transaction(|tx| tx.read(RegisterAddress::new(page, reg)))
    }

    /// Mutable access to the transport without locking.
    pub fn transport_mut(&mut self) -> &mut I2C {
        self.i2c.get_mut().get_mut()
    }

    /// Consume the bus and return the transport.
    pub fn release(self) -> I2C {
        self.i2c.into_inner().into_inner()
    }
}

/// Exclusive access to the bus for the duration of one compound operation.
///
/// Tracks the page it last selected so consecutive accesses on one page share
/// a single page-select transfer.
pub struct Transaction<'a, I2C> {
    i2c: &'a mut I2C,
    address: u8,
    page: Option<u8>,
}

impl<I2C: I2c> Transaction<'_, I2C> {
    /// The page this transaction last selected, if known.
    pub fn page(&self) -> Option<u8> {
        self.page
    }

    /// Write the page-select register.
    ///
    /// Always transfers, even when `page` is already selected.
    pub fn select_page(&mut self, page: u8) -> Result<(), I2C::Error> {
        match self.i2c.write(self.address, &[reg::PAGE_SELECT, page]) {
            Ok(()) => {
                self.page = Some(page);
                Ok(())
            }
            Err(e) => {
                self.page = None;
                Err(e)
            }
        }
    }

    /// Write `value` to `register`, selecting its page first if needed.
    pub fn write(&mut self, register: RegisterAddress, value: u8) -> Result<(), I2C::Error> {
        self.ensure_page(register.page)?;
        self.i2c.write(self.address, &[register.offset, value])?;
        if register.is_page_select() {
            self.page = Some(value);
        }
        Ok(())
    }

    /// Read `register`, selecting its page first if needed.
    pub fn read(&mut self, register: RegisterAddress) -> Result<u8, I2C::Error> {
        self.ensure_page(register.page)?;
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[register.offset], &mut buf)?;
        Ok(buf[0])
    }

    fn ensure_page(&mut self, page: u8) -> Result<(), I2C::Error> {
        if self.page == Some(page) {
            return Ok(());
        }
        self.select_page(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAic3204, Transfer};

    fn make_bus() -> LocalBus<MockAic3204> {
        PagedBus::new(MockAic3204::new())
    }

    #[test]
    fn write_is_select_then_write() {
        let bus = make_bus();
        bus.write(1, 0x10, 0x2A).unwrap();
        let dev = bus.release();
        assert_eq!(
            dev.log(),
            &[
                Transfer::Write { reg: 0x00, value: 1 },
                Transfer::Write { reg: 0x10, value: 0x2A },
            ]
        );
        assert_eq!(dev.peek(1, 0x10), 0x2A);
        assert_eq!(dev.peek(0, 0x10), 0x00);
    }

    #[test]
    fn read_is_select_then_read() {
        let mut dev = MockAic3204::new();
        dev.poke(3, 0x22, 0x5A);
        let bus: LocalBus<_> = PagedBus::new(dev);
        assert_eq!(bus.read(3, 0x22), Ok(0x5A));
        let dev = bus.release();
        assert_eq!(
            dev.log(),
            &[Transfer::Write { reg: 0x00, value: 3 }, Transfer::Read { reg: 0x22 }]
        );
    }

    #[test]
    fn every_call_reselects_the_page() {
        let bus = make_bus();
        bus.write(0, 0x41, 1).unwrap();
        bus.write(0, 0x42, 2).unwrap();
        assert_eq!(bus.release().log().len(), 4);
    }

    #[test]
    fn failed_page_select_skips_the_access() {
        let mut dev = MockAic3204::new();
        dev.fail_at(0);
        let bus: LocalBus<_> = PagedBus::new(dev);
        assert!(bus.write(1, 0x10, 0x05).is_err());
        let dev = bus.release();
        assert_eq!(dev.log(), &[Transfer::Write { reg: 0x00, value: 1 }]);
        assert_eq!(dev.peek(1, 0x10), 0);
    }

    #[test]
    fn transaction_shares_page_selects() {
        let bus = make_bus();
        bus.transaction(|tx| {
            assert_eq!(tx.page(), None);
            tx.write(RegisterAddress::new(1, 0x10), 7)?;
            tx.write(RegisterAddress::new(1, 0x11), 7)?;
            assert_eq!(tx.page(), Some(1));
            tx.write(RegisterAddress::new(0, 0x41), 3)
        })
        .unwrap();
        let log = bus.release().log().to_vec();
        assert_eq!(
            log,
            [
                Transfer::Write { reg: 0x00, value: 1 },
                Transfer::Write { reg: 0x10, value: 7 },
                Transfer::Write { reg: 0x11, value: 7 },
                Transfer::Write { reg: 0x00, value: 0 },
                Transfer::Write { reg: 0x41, value: 3 },
            ]
        );
    }

    #[test]
    fn failed_select_forgets_the_page() {
        let mut dev = MockAic3204::new();
        dev.fail_at(2);
        let bus: LocalBus<_> = PagedBus::new(dev);
        bus.transaction(|tx| {
            tx.select_page(1).unwrap();
            tx.write(RegisterAddress::new(1, 0x10), 1).unwrap();
            assert!(tx.select_page(0).is_err());
            assert_eq!(tx.page(), None);
        });
    }

    #[test]
    fn writing_page_select_register_moves_tracked_page() {
        let bus = make_bus();
        bus.transaction(|tx| {
            tx.write(RegisterAddress::new(0, reg::PAGE_SELECT), 1).unwrap();
            assert_eq!(tx.page(), Some(1));
            // Already on page 1: no extra select.
            tx.write(RegisterAddress::new(1, 0x10), 9).unwrap();
        });
        let dev = bus.release();
        assert_eq!(dev.log().len(), 3);
        assert_eq!(dev.peek(1, 0x10), 9);
    }

    #[test]
    fn transport_is_reachable_without_locking() {
        let mut bus = make_bus();
        bus.transport_mut().poke(0, 0x41, 3);
        assert_eq!(bus.read(0, 0x41), Ok(3));
    }

    #[test]
    fn custom_address_is_used() {
        let bus: LocalBus<_> = PagedBus::new_with_address(MockAic3204::with_address(0x19), 0x19);
        assert_eq!(bus.address(), 0x19);
        assert!(bus.write(0, 0x41, 0).is_ok());

        let wrong: LocalBus<_> = PagedBus::new(MockAic3204::with_address(0x19));
        assert!(wrong.write(0, 0x41, 0).is_err());
    }
}
