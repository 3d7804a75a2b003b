pub use mantle_core::*;
