//! Export of table rows to flat documents.
//!
//! The pipeline hands the final rows and columns to a [`DocumentBuilder`]
//! picked from an [`Exporter`] registry. Only CSV is built in.

mod builder;
mod cell;
mod options;

pub use builder::*;
pub use cell::*;
pub use options::*;
