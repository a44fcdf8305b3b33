//! Wire format of the telemetry firmware.
//!
//! The firmware prints one newline-terminated line per tick.  A
//! [`LineFormat`] describes that line declaratively so a firmware change is a
//! config edit, and [`decode`] turns a line into a [`Sample`].
//!
//! [`Sample`]: telemetry_core::Sample

pub mod decoder;
pub mod format;

pub use decoder::{decode, DecodeError};
pub use format::{FieldSpec, FormatError, LineFormat, Preset};
