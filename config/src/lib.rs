//! # Config Crate
//!
//! Centralized configuration constants for the FDTD meshing pipeline.
//! All magic numbers and tunable parameters are defined here so the mesher,
//! its tests and any host application agree on the same defaults.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{wavelength, DEFAULT_METAL_RES, DEFAULT_SMOOTHNESS};
//!
//! // Conductor resolution at 10 GHz, in millimeters
//! let metal_res = wavelength(10e9, 1e-3) * DEFAULT_METAL_RES;
//! assert!((metal_res - 1.49896229).abs() < 1e-6);
//!
//! // Adjacent cells may differ by at most the smoothness factor
//! let ratio = 1.1;
//! assert!(ratio < DEFAULT_SMOOTHNESS);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Wavelength Relative**: Resolutions are fractions of the minimum wavelength
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
