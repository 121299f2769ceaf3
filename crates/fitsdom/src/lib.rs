#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod entry;
pub mod error;
pub mod header;
pub mod image;
pub mod model;
pub mod options;
pub mod segment;
pub mod value;

pub use block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE};
pub use entry::{Entry, EntryKind};
pub use error::{Error, Result};
pub use header::{HeaderEnd, Param};
pub use model::FitsDataModel;
pub use options::{DecodeOptions, NegativeBitpix};
pub use value::{FromValue, Value};
