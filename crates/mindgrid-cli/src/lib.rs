//! Library half of the `mindgrid` command-line tool

pub mod load;

pub use load::{load_dataset, read_csv, read_json, write_grid, CsvLoadOptions};
