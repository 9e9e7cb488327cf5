//! CLI commands for the market scanner.

pub mod greet;
pub mod scan;

pub use greet::{run_greet, GreetArgs};
pub use scan::{run_scan, ScanArgs};
