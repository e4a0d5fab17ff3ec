//! Input readers - load JSON AST dumps into typed trees.

#[cfg(feature = "c")]
pub mod c;

#[cfg(feature = "c")]
pub use c::read_c;

#[cfg(feature = "dts")]
pub mod dts;

#[cfg(feature = "dts")]
pub use dts::read_dts;
