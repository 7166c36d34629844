use tracing::info;

use crate::geometry::boolean::area;
use crate::topology::{PlanarGraph, StripGraph};

/// Named points of the pipeline at which the graph can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// The graph as built from the skeleton.
    Init,
    /// After alpha-strips are built.
    Alpha,
    /// After diagonal correction.
    Beta,
    /// After slicing.
    Final,
}

impl Checkpoint {
    /// Lower-case name of the checkpoint.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Final => "final",
        }
    }
}

/// Receives graph snapshots while the pipeline runs with `debug` set.
pub trait CheckpointSink {
    fn checkpoint(&mut self, stage: Checkpoint, graph: &PlanarGraph, strips: &StripGraph);
}

/// Logs a one-line summary of each checkpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl CheckpointSink for TraceSink {
    fn checkpoint(&mut self, stage: Checkpoint, graph: &PlanarGraph, strips: &StripGraph) {
        let strip_area: f64 = strips
            .iter()
            .filter_map(|(_, s)| s.face)
            .filter_map(|f| graph.face(f).ok())
            .map(|f| area(&f.geometry))
            .sum();
        info!(
            checkpoint = stage.name(),
            nodes = graph.nodes().count(),
            half_edges = graph.half_edges().count(),
            faces = graph.faces().count(),
            strips = strips.len(),
            strip_area,
            "checkpoint"
        );
    }
}

/// Records the order in which checkpoints fire.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub stages: Vec<Checkpoint>,
    pub strip_counts: Vec<usize>,
}

#[cfg(test)]
impl CheckpointSink for RecordingSink {
    fn checkpoint(&mut self, stage: Checkpoint, _graph: &PlanarGraph, strips: &StripGraph) {
        self.stages.push(stage);
        self.strip_counts.push(strips.len());
    }
}
