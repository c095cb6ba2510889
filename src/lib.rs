//! voxmetrics - vocal metrics extraction and PDF report generation
//!
//! Two independent stages connected only by a JSON file:
//!
//! - `analyze` decodes an audio recording, extracts vocal metrics (pitch,
//!   jitter, shimmer, HNR, formants, vibrato, intensity) and prints a single
//!   JSON metrics record to stdout.
//! - `report` reads a metrics record and renders a paginated A4 PDF with
//!   tables, gauges, a pitch-contour chart, and textual recommendations.

pub mod analysis;
pub mod audio;
pub mod health;
pub mod metrics;
pub mod notes;
pub mod report;
