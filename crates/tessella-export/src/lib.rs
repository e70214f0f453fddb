//! tessella-export: Pure format serializers (sans-IO)
//!
//! Converts a mosaic state into output formats. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, polygon_points, to_svg};
