use geo::Polygon;
use tracing::{info, warn};

use super::alpha::AlphaStripBuilder;
use super::beta::BetaStripCorrector;
use super::checkpoint::{Checkpoint, CheckpointSink, TraceSink};
use super::frontage::FrontageClassifier;
use super::params::DecompositionParams;
use super::slice::{Parcel, ParcelSlicer};
use crate::error::{ParcelError, Result, StripError};
use crate::road::RoadLookup;
use crate::skeleton::{skeleton_graph, SkeletonKernel};
use crate::topology::{PlanarGraph, StripGraph};

/// Output of a strip decomposition.
#[derive(Debug)]
pub struct Decomposition {
    pub parcels: Vec<Parcel>,
    /// The graph after correction, with strip faces grouping the skeleton
    /// faces.
    pub graph: PlanarGraph,
    pub strips: StripGraph,
}

/// Runs frontage classification, alpha-strip building, beta correction and
/// slicing over one block.
pub struct StripDecomposition {
    params: DecompositionParams,
}

impl StripDecomposition {
    /// Creates a new `StripDecomposition`.
    #[must_use]
    pub fn new(params: DecompositionParams) -> Self {
        Self { params }
    }

    /// Executes the decomposition on a skeleton graph.
    ///
    /// With `params.debug` set, a summary of every checkpoint is logged.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for invalid parameters and
    /// `TopologyError::OpenBoundary` if the exterior is not one cycle. A
    /// block fronting no road yields no parcels.
    pub fn execute<L>(&self, graph: PlanarGraph, lookup: &L) -> Result<Decomposition>
    where
        L: RoadLookup + ?Sized,
    {
        if self.params.debug {
            let mut trace = TraceSink;
            let sink: &mut dyn CheckpointSink = &mut trace;
            self.run(graph, lookup, Some(sink))
        } else {
            self.run(graph, lookup, None)
        }
    }

    /// Executes the decomposition, reporting every checkpoint to `sink`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn execute_with_sink<L>(
        &self,
        graph: PlanarGraph,
        lookup: &L,
        sink: &mut dyn CheckpointSink,
    ) -> Result<Decomposition>
    where
        L: RoadLookup + ?Sized,
    {
        self.run(graph, lookup, Some(sink))
    }

    /// Computes the skeleton of `block` with `kernel`, then decomposes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the weights do not match the block, the kernel
    /// fails, or the decomposition fails.
    pub fn execute_skeleton<L>(
        &self,
        kernel: &dyn SkeletonKernel,
        block: &Polygon<f64>,
        weights: &[f64],
        offset_cap: Option<f64>,
        lookup: &L,
    ) -> Result<Decomposition>
    where
        L: RoadLookup + ?Sized,
    {
        self.params.validate()?;
        let graph = skeleton_graph(kernel, block, weights, offset_cap, self.params.tolerance())?;
        self.execute(graph, lookup)
    }

    fn run<L>(
        &self,
        mut graph: PlanarGraph,
        lookup: &L,
        mut sink: Option<&mut dyn CheckpointSink>,
    ) -> Result<Decomposition>
    where
        L: RoadLookup + ?Sized,
    {
        self.params.validate()?;
        let mut strips = StripGraph::new();
        notify(&mut sink, Checkpoint::Init, &graph, &strips);

        let classifier = FrontageClassifier::new(self.params.max_road_distance);
        let frontage = match classifier.execute(&mut graph, lookup) {
            Ok(frontage) => frontage,
            Err(ParcelError::Strip(StripError::NoFrontageFound)) => {
                warn!("block fronts no road, nothing to subdivide");
                notify(&mut sink, Checkpoint::Final, &graph, &strips);
                return Ok(Decomposition {
                    parcels: Vec::new(),
                    graph,
                    strips,
                });
            }
            Err(e) => return Err(e),
        };

        strips = AlphaStripBuilder::new(&frontage).execute(&mut graph)?;
        notify(&mut sink, Checkpoint::Alpha, &graph, &strips);

        BetaStripCorrector::new(&frontage.cycle, self.params.tolerance())
            .execute(&mut graph, &mut strips)?;
        notify(&mut sink, Checkpoint::Beta, &graph, &strips);

        let parcels = ParcelSlicer::new(self.params).execute(&graph, &strips)?;
        notify(&mut sink, Checkpoint::Final, &graph, &strips);

        info!(strips = strips.len(), parcels = parcels.len(), "block decomposed");
        Ok(Decomposition {
            parcels,
            graph,
            strips,
        })
    }
}

fn notify(
    sink: &mut Option<&mut dyn CheckpointSink>,
    stage: Checkpoint,
    graph: &PlanarGraph,
    strips: &StripGraph,
) {
    if let Some(sink) = sink.as_deref_mut() {
        sink.checkpoint(stage, graph, strips);
    }
}
