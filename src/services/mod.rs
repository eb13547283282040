// Refiner Shield Core Services
// Segmentation, detection, rewriting, the refinement loop, and payments.

pub mod detector;
pub mod payments;
pub mod refiner;
pub mod rewriter;
pub mod segmenter;

pub use detector::{Detector, ScoreStrategy};
pub use payments::CheckoutClient;
pub use refiner::Refiner;
pub use rewriter::Rewriter;
pub use segmenter::{segment, SegmentPolicy};
