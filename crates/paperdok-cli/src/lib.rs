//! paperdok CLI - Command-line interface library
//!
//! - Render: Convert a JSON paper request to DOCX, HTML or PDF
//! - Health: Query the PDF conversion service
//! - Layout: Print the shared layout table
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a paper to DOCX next to the input
//! paperdok render paper.json
//!
//! # Render to PDF with an explicit config
//! paperdok render paper.json -f pdf -o paper.pdf -c paperdok.toml
//!
//! # Is the conversion service up?
//! paperdok health --url http://localhost:5000
//!
//! # With debug logging
//! RUST_LOG=debug paperdok render paper.json
//! ```

pub mod app;

pub use app::{
    health_command, init_logging, layout_command, layout_json, render_command, report_error,
    resolve_config, run_cli,
};
