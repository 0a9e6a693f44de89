//! # bird_ghg
//!
//! Relates greenhouse-gas emissions of Canadian regions to changes in bird
//! populations. Emission and population series are aligned onto a common
//! year range, then fitted with an ordinary least squares regression on one
//! gas or on every gas at once.
//!
//! ```
//! use bird_ghg::align::AlignmentPolicy;
//! use bird_ghg::selection::{SelectionResolver, Stage};
//! use bird_ghg::synthetic::{generate, SyntheticParams};
//!
//! let raw = generate(&SyntheticParams::default(), &AlignmentPolicy::default(), 42).unwrap();
//! let snapshot = raw.snapshot().unwrap();
//!
//! let mut resolver = SelectionResolver::default();
//! resolver.record_choice(Stage::Region, "Alberta").unwrap();
//! resolver.record_choice(Stage::Species, "Waterfowl").unwrap();
//! resolver.record_choice(Stage::Gas, "CO2").unwrap();
//!
//! let model = resolver.build_model(&snapshot).unwrap();
//! assert!((0.0..=1.0).contains(&model.r_squared()));
//! ```

pub mod align;
pub mod config;
pub mod error;
pub mod multiple;
pub mod records;
pub mod selection;
pub mod simple;
pub mod synthetic;
pub mod utility;

pub use error::{CoreError, Result};
