//! The strip decomposition pipeline: frontage classification, alpha-strip
//! building, beta correction and parcel slicing.

mod alpha;
mod beta;
mod checkpoint;
mod decompose;
mod frontage;
mod params;
mod slice;

pub use alpha::AlphaStripBuilder;
pub use beta::{classify, supporting_line, BetaStripCorrector, SupportingVertexClass};
pub use checkpoint::{Checkpoint, CheckpointSink, TraceSink};
pub use decompose::{Decomposition, StripDecomposition};
pub use frontage::{Frontage, FrontageClassifier, FrontageRun};
pub use params::DecompositionParams;
pub use slice::{Parcel, ParcelSlicer, WidthSampler};
