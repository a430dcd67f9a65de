pub mod calculator;
pub mod settings;

#[cfg(feature = "quote")]
pub mod quote;

#[cfg(feature = "catalogue")]
pub mod catalogue;
