//! TLV320AIC3204 codec driver.
//!
//! - [`registers`]: page/offset map and bitfields
//! - [`bus`]: page-select-then-access transport under a lock
//! - [`init`]: bring-up table and its runner
//! - [`Aic3204`]: the gain controller

pub mod bus;
pub mod init;
pub mod registers;
mod aic3204;

pub use aic3204::{Aic3204, BringUpError, CodecConfig, CodecState, Ready, Uninitialized};
pub use bus::{LocalBus, PagedBus, SharedBus, Transaction};
pub use init::{InitSequence, RegisterWrite};
pub use registers::RegisterAddress;
