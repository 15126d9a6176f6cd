//! diagram2png library crate.
//!
//! Renders plain-text ASCII diagrams into PNG images with a monospaced font:
//!
//! 1. **Font loading** - first loadable source from an ordered chain ([`font`])
//! 2. **Measurement** - line splitting and line box sizing ([`layout`])
//! 3. **Rasterization** - padded white canvas, black glyphs ([`raster`])
//! 4. **Conversion** - per-file PNG output and the batch driver ([`convert`])

pub mod config;
pub mod convert;
pub mod error;
pub mod font;
pub mod layout;
pub mod raster;

pub use error::Error;
