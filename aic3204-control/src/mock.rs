//! Simulated AIC3204 register file for host tests.
//!
//! [`MockAic3204`] implements [`embedded_hal::i2c::I2c`] with the chip's
//! paged addressing: a write to offset 0 selects the page, every other offset
//! reads and writes the currently selected page. Each I2C call is one
//! [`Transfer`] in the log, and [`MockAic3204::fail_at`] makes a chosen
//! transfer fail so partial-failure paths can be exercised.

use std::vec::Vec;

use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

use crate::codec::registers as reg;

const PAGES: usize = 256;

/// Transport error reported by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub ErrorKind);

impl i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// One attempted I2C call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// `[reg, value]` write.
    Write {
        /// Register offset.
        reg: u8,
        /// Value written.
        value: u8,
    },
    /// `[reg]` write followed by a one-byte read.
    Read {
        /// Register offset.
        reg: u8,
    },
}

/// In-memory AIC3204 with 256 pages of 256 registers.
pub struct MockAic3204 {
    address: u8,
    pages: Vec<[u8; 256]>,
    page: u8,
    log: Vec<Transfer>,
    fail_at: Option<usize>,
}

impl MockAic3204 {
    /// A device answering at the default address (0x18).
    pub fn new() -> Self {
        Self::with_address(reg::I2C_ADDR)
    }

    /// A device answering at `address`.
    pub fn with_address(address: u8) -> Self {
        Self {
            address,
            pages: std::vec![[0u8; 256]; PAGES],
            page: 0,
            log: Vec::new(),
            fail_at: None,
        }
    }

    /// Make the transfer with log index `index` fail (counted from the start
    /// of the log, including transfers already made).
    pub fn fail_at(&mut self, index: usize) {
        self.fail_at = Some(index);
    }

    /// Make the next transfer fail.
    pub fn fail_next(&mut self) {
        self.fail_at = Some(self.log.len());
    }

    /// Stop injecting failures.
    pub fn clear_failure(&mut self) {
        self.fail_at = None;
    }

    /// Register contents, bypassing the bus.
    pub fn peek(&self, page: u8, offset: u8) -> u8 {
        if offset == reg::PAGE_SELECT {
            return self.page;
        }
        self.pages[usize::from(page)][usize::from(offset)]
    }

    /// Set register contents, bypassing the bus and the log.
    pub fn poke(&mut self, page: u8, offset: u8, value: u8) {
        self.pages[usize::from(page)][usize::from(offset)] = value;
    }

    /// The currently selected page.
    pub fn page(&self) -> u8 {
        self.page
    }

    /// Every attempted transfer, in order, including failed ones.
    pub fn log(&self) -> &[Transfer] {
        &self.log
    }

    /// Forget the transfer log. Failure injection indices restart at 0.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn begin(&mut self, address: u8, transfer: Transfer) -> Result<(), MockError> {
        let index = self.log.len();
        self.log.push(transfer);
        if address != self.address {
            return Err(MockError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        }
        if self.fail_at == Some(index) {
            self.fail_at = None;
            return Err(MockError(ErrorKind::Other));
        }
        Ok(())
    }

    fn store(&mut self, offset: u8, value: u8) {
        if offset == reg::PAGE_SELECT {
            self.page = value;
            return;
        }
        if self.page == reg::SOFTWARE_RESET.page
            && offset == reg::SOFTWARE_RESET.offset
            && value & 1 != 0
        {
            // Reset restores power-on defaults; the reset bit self-clears.
            for page in self.pages.iter_mut() {
                *page = [0u8; 256];
            }
            self.page = 0;
            return;
        }
        self.pages[usize::from(self.page)][usize::from(offset)] = value;
    }

    fn load(&self, offset: u8) -> u8 {
        self.peek(self.page, offset)
    }
}

impl Default for MockAic3204 {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for MockAic3204 {
    type Error = MockError;
}

impl i2c::I2c for MockAic3204 {
    fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), Self::Error> {
        // The codec needs a register pointer write before every read.
        Err(MockError(ErrorKind::Other))
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let [offset, value] = *bytes else {
            return Err(MockError(ErrorKind::Other));
        };
        self.begin(address, Transfer::Write { reg: offset, value })?;
        self.store(offset, value);
        Ok(())
    }

    fn write_read(&mut self, address: u8, wr: &[u8], rd: &mut [u8]) -> Result<(), Self::Error> {
        let ([offset], [out]) = (wr, rd) else {
            return Err(MockError(ErrorKind::Other));
        };
        self.begin(address, Transfer::Read { reg: *offset })?;
        *out = self.load(*offset);
        Ok(())
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        match operations {
            [Operation::Write(bytes)] => self.write(address, bytes),
            [Operation::Write(wr), Operation::Read(rd)] => self.write_read(address, wr, rd),
            _ => Err(MockError(ErrorKind::Other)),
        }
    }
}
