//! Source-schema records, typed ids and the format readers/writers.
//!
//! # Design Principles
//!
//! 1. **Typed keys**: image, annotation and category ids are newtypes, and
//!    the image id is the only join key between images, label groups,
//!    partitions and output file names.
//!
//! 2. **Typed coordinate spaces**: [`BBoxXYXY`] carries a [`Pixel`] or
//!    [`Normalized`] marker so absolute and normalized boxes cannot be mixed.
//!
//! 3. **Permissive boxes**: malformed or out-of-range boxes are representable;
//!    conversion passes them through instead of panicking.
//!
//! # Example
//!
//! ```
//! use yoloprep::ir::{Annotation, BBoxXYXY, Category, Image, Pixel};
//!
//! let image = Image::new(1u64, "001.jpg", 100, 50);
//! let category = Category::new(1u64, "person", "human");
//! let annotation = Annotation::new(
//!     1u64, 1u64, 1u64,
//!     BBoxXYXY::<Pixel>::from_xyxy(10.0, 10.0, 30.0, 20.0),
//! );
//! assert_eq!(annotation.area, 200.0);
//! # let _ = (image, category);
//! ```

mod bbox;
mod ids;
pub mod io_coco_json;
pub mod io_yolo;
mod model;
mod space;

pub use bbox::BBoxXYXY;
pub use ids::{AnnotationId, CategoryId, ClassId, ImageId};
pub use model::{Annotation, Category, Dataset, Image, YoloAnnotation};
pub use space::{Normalized, Pixel};
