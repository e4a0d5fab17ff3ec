//! Typed ASTs for the two source grammars.

#[cfg(feature = "c")]
pub mod c;

#[cfg(feature = "dts")]
pub mod dts;
