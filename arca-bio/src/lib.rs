//! Sequence record model and flat-file formats

pub mod formats;
pub mod record;
pub mod taxonomy;

pub use record::{Annotation, AnnotationKind, SequenceRecord};
pub use taxonomy::{TaxonomyNode, UNCERTAINTY_KEYWORDS};
