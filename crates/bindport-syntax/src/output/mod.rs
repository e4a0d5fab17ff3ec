//! Generators - emit typed ASTs as Python source.

#[cfg(feature = "c")]
pub mod c;

#[cfg(feature = "c")]
pub use c::{C_TRANSLATOR, CGenerator, CTranslator, generate_c};

#[cfg(feature = "dts")]
pub mod dts;

#[cfg(feature = "dts")]
pub use dts::{DTS_TRANSLATOR, DtsGenerator, DtsTranslator};
