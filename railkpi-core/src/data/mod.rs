//! Data access: provider trait, sample data, CSV-backed provider and codec.

pub mod csv_codec;
pub mod csv_provider;
pub mod provider;
pub mod sample;

pub use csv_provider::CsvProvider;
pub use provider::{DataError, SeriesProvider};
pub use sample::SampleProvider;
