use std::collections::{HashMap, HashSet};

use tracing::{debug, info_span};

use crate::error::{Result, StripError};
use crate::road::RoadLookup;
use crate::topology::{FaceId, HalfEdgeId, PlanarGraph};

/// A maximal run of consecutive road-attributed exterior edges of one face.
#[derive(Debug, Clone)]
pub struct FrontageRun {
    pub face: FaceId,
    /// Edges in cycle order.
    pub edges: Vec<HalfEdgeId>,
    /// Summed edge length.
    pub length: f64,
}

/// Result of frontage classification.
#[derive(Debug, Clone)]
pub struct Frontage {
    /// The exterior cycle, rotated to start at a primary-frontage edge.
    pub cycle: Vec<HalfEdgeId>,
    /// Every run, in cycle order.
    pub runs: Vec<FrontageRun>,
    /// Faces with more than one run, in cycle order.
    pub faces_with_multiple_frontages: Vec<FaceId>,
    primary: HashMap<FaceId, usize>,
    primary_edges: HashSet<HalfEdgeId>,
}

impl Frontage {
    /// Returns `true` if the edge belongs to some face's primary run.
    #[must_use]
    pub fn is_primary(&self, edge: HalfEdgeId) -> bool {
        self.primary_edges.contains(&edge)
    }

    /// The primary run of a face.
    #[must_use]
    pub fn primary_run(&self, face: FaceId) -> Option<&FrontageRun> {
        self.primary.get(&face).map(|&i| &self.runs[i])
    }

    /// Every run of a face, in cycle order.
    pub fn runs_of(&self, face: FaceId) -> impl Iterator<Item = &FrontageRun> + '_ {
        self.runs.iter().filter(move |r| r.face == face)
    }

    /// Position of an edge in the rotated cycle.
    #[must_use]
    pub fn position(&self, edge: HalfEdgeId) -> Option<usize> {
        self.cycle.iter().position(|e| *e == edge)
    }
}

/// Attaches roads to exterior edges and selects each face's primary frontage.
pub struct FrontageClassifier {
    max_distance: f64,
}

impl FrontageClassifier {
    /// Creates a new `FrontageClassifier` searching up to `max_distance`.
    #[must_use]
    pub fn new(max_distance: f64) -> Self {
        Self { max_distance }
    }

    /// Executes the classification, storing each edge's road on the graph.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::OpenBoundary` if the exterior is not a single
    /// cycle, and `StripError::NoFrontageFound` if no edge fronts a road.
    pub fn execute<L>(&self, graph: &mut PlanarGraph, lookup: &L) -> Result<Frontage>
    where
        L: RoadLookup + ?Sized,
    {
        let _span = info_span!("frontage").entered();
        let mut cycle = graph.ordered_exterior_edges()?;
        let context = graph.block();

        let mut attributed = 0usize;
        for &edge in &cycle {
            let (a, b) = graph.endpoints(edge)?;
            let road = lookup.find_road_in_direction(&a, &b, &context, self.max_distance);
            attributed += usize::from(road.is_some());
            graph.half_edge_mut(edge)?.road = road;
        }
        if attributed == 0 {
            return Err(StripError::NoFrontageFound.into());
        }

        let runs = collect_runs(graph, &cycle)?;

        let mut primary: HashMap<FaceId, usize> = HashMap::new();
        let mut run_count: HashMap<FaceId, usize> = HashMap::new();
        let mut faces_with_multiple_frontages = Vec::new();
        for (i, run) in runs.iter().enumerate() {
            let count = run_count.entry(run.face).or_insert(0);
            *count += 1;
            if *count == 2 {
                faces_with_multiple_frontages.push(run.face);
            }
            // Strictly longer: the first run found keeps ties.
            match primary.get(&run.face) {
                Some(&best) if run.length <= runs[best].length => {}
                _ => {
                    primary.insert(run.face, i);
                }
            }
        }

        let primary_edges: HashSet<HalfEdgeId> = primary
            .values()
            .flat_map(|&i| runs[i].edges.iter().copied())
            .collect();

        // Rotate to the start of the primary run holding the first primary edge.
        let first_primary = cycle.iter().find(|e| primary_edges.contains(e)).copied();
        if let Some(first) = first_primary {
            let start = primary
                .values()
                .map(|&i| &runs[i])
                .find(|r| r.edges.contains(&first))
                .and_then(|r| r.edges.first())
                .and_then(|e| cycle.iter().position(|c| c == e));
            if let Some(start) = start {
                cycle.rotate_left(start);
            }
        }

        debug!(
            edges = cycle.len(),
            attributed,
            runs = runs.len(),
            multiple = faces_with_multiple_frontages.len(),
            "frontage classified"
        );

        Ok(Frontage {
            cycle,
            runs,
            faces_with_multiple_frontages,
            primary,
            primary_edges,
        })
    }
}

/// Splits the cycle into maximal runs of attributed edges sharing a face.
///
/// A run may wrap from the end of the cycle to its start.
fn collect_runs(graph: &PlanarGraph, cycle: &[HalfEdgeId]) -> Result<Vec<FrontageRun>> {
    let n = cycle.len();
    let mut faces = Vec::with_capacity(n);
    let mut attributed = Vec::with_capacity(n);
    let mut lengths = Vec::with_capacity(n);
    for &edge in cycle {
        let data = graph.half_edge(edge)?;
        faces.push(data.face);
        attributed.push(data.road.is_some() && data.face.is_some());
        lengths.push(graph.edge_length(edge)?);
    }

    let continues = |i: usize| {
        let prev = (i + n - 1) % n;
        attributed[i] && attributed[prev] && faces[i] == faces[prev]
    };
    // Start at a run boundary so no run is cut by the wrap.
    let start = (0..n).find(|&i| !continues(i)).unwrap_or(0);

    let mut runs: Vec<FrontageRun> = Vec::new();
    let mut open = false;
    for k in 0..n {
        let i = (start + k) % n;
        if !attributed[i] {
            open = false;
            continue;
        }
        let Some(face) = faces[i] else { continue };
        match runs.last_mut() {
            Some(run) if open && continues(i) => {
                run.edges.push(cycle[i]);
                run.length += lengths[i];
            }
            _ => {
                runs.push(FrontageRun {
                    face,
                    edges: vec![cycle[i]],
                    length: lengths[i],
                });
                open = true;
            }
        }
    }
    Ok(runs)
}
