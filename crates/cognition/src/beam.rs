//! Beam Search Predictor - extrapolate future states from observed edges
//!
//! Each step expands every live hypothesis through the `beam_width` edges
//! whose source state is closest to it, scores the successors against the
//! known edge targets and keeps the best `beam_width` overall.
//!
//! Score of a successor:
//!   parent × max(0, sim(hypothesis, edge.from)) × max(0, sim(candidate, nearest target))
//! so every score stays in [0, 1].

use glyphh_core::{ConfigurationError, EdgeState, Glyph, Result, TemporalEdge, Vector};
use serde::Serialize;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::temporal::apply_delta;

/// Ranked future state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Nearest known successor for the final state
    pub concept: String,

    pub score: f64,

    /// Predicted state vector
    pub state: Vector,

    /// Successor reached at each step, start excluded
    pub path: Vec<String>,
}

#[derive(Debug, Clone)]
struct Hypothesis {
    state: Vector,
    score: f64,
    path: Vec<String>,
}

/// Beam search over a temporal edge history
#[derive(Debug, Clone, Copy)]
pub struct BeamSearchPredictor {
    beam_width: usize,
    drift_reduction: bool,
}

impl BeamSearchPredictor {
    pub fn new(beam_width: usize, drift_reduction: bool) -> Result<Self> {
        if beam_width == 0 {
            return Err(ConfigurationError::InvalidBeamWidth.into());
        }
        Ok(Self {
            beam_width,
            drift_reduction,
        })
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    pub fn drift_reduction(&self) -> bool {
        self.drift_reduction
    }

    /// Up to `beam_width` predictions `steps` transitions ahead of `current`
    pub fn predict(&self, current: &Glyph, edges: &[TemporalEdge], steps: usize) -> Result<Vec<Prediction>> {
        if steps == 0 || edges.is_empty() {
            return Ok(Vec::new());
        }

        let targets = successor_classes(edges);
        let start = if self.drift_reduction {
            current.global_cortex.to_bipolar()
        } else {
            current.global_cortex.clone()
        };

        let mut beam = vec![Hypothesis {
            state: start,
            score: 1.0,
            path: Vec::new(),
        }];

        for step in 0..steps {
            let mut candidates = Vec::new();
            for hypothesis in &beam {
                candidates.extend(self.expand(hypothesis, edges, &targets)?);
            }
            // stable: equal scores keep expansion order
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
            candidates.truncate(self.beam_width);

            debug!(
                "Beam step {}/{}: {} hypotheses, best {:.4}",
                step + 1,
                steps,
                candidates.len(),
                candidates.first().map(|c| c.score).unwrap_or(0.0)
            );
            beam = candidates;
        }

        Ok(beam
            .into_iter()
            .map(|h| Prediction {
                concept: h.path.last().cloned().unwrap_or_default(),
                score: h.score,
                state: h.state,
                path: h.path,
            })
            .collect())
    }

    /// Successors of one hypothesis through its closest edges
    fn expand(&self, hypothesis: &Hypothesis, edges: &[TemporalEdge], targets: &[&EdgeState]) -> Result<Vec<Hypothesis>> {
        let mut ranked = edges
            .iter()
            .map(|edge| Ok((edge, hypothesis.state.cosine(&edge.from.state)?)))
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.beam_width);

        #[cfg(feature = "parallel")]
        let iter = ranked.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = ranked.into_iter();

        iter.map(|(edge, source_sim)| self.step(hypothesis, edge, source_sim, targets))
            .collect()
    }

    fn step(
        &self,
        hypothesis: &Hypothesis,
        edge: &TemporalEdge,
        source_sim: f64,
        targets: &[&EdgeState],
    ) -> Result<Hypothesis> {
        let mut state = apply_delta(&hypothesis.state, &edge.delta)?;
        if self.drift_reduction {
            state = state.to_bipolar();
        }

        let (class, class_sim) = nearest(&state, targets)?;
        let mut path = hypothesis.path.clone();
        path.push(class.to_string());

        Ok(Hypothesis {
            score: hypothesis.score * source_sim.max(0.0) * class_sim.max(0.0),
            state,
            path,
        })
    }
}

/// Distinct edge targets by concept name, first occurrence wins
fn successor_classes(edges: &[TemporalEdge]) -> Vec<&EdgeState> {
    let mut classes: Vec<&EdgeState> = Vec::new();
    for edge in edges {
        if !classes.iter().any(|c| c.concept == edge.to.concept) {
            classes.push(&edge.to);
        }
    }
    classes
}

fn nearest<'a>(state: &Vector, targets: &[&'a EdgeState]) -> Result<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for target in targets {
        let sim = state.cosine(&target.state)?;
        if best.is_none_or(|(_, b)| sim > b) {
            best = Some((target.concept.as_str(), sim));
        }
    }
    Ok(best.unwrap_or(("", 0.0)))
}
