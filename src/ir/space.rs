//! Coordinate space markers.
//!
//! Zero-sized types used as the `TSpace` parameter of
//! [`BBoxXYXY`](super::BBoxXYXY) so absolute pixel boxes and normalized boxes
//! cannot be mixed up.

/// Absolute pixel coordinates, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates expressed as fractions of the image width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalized {}
