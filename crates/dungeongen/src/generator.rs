//! The generation pipeline: sample rooms, connect them, relax their positions,
//! route corridors, assemble and validate, then optionally merge narrative
//! content and run a post-processing pass.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::content::{ContentError, ContentSource, merge_room_contents};
use crate::guidelines::{Guidelines, LayoutType};
use crate::layout::assembler::{LayoutError, assemble, validate};
use crate::layout::connectivity::{ConnectivityConfig, connect};
use crate::layout::flags::assign_room_flags;
use crate::layout::model::{DungeonLayout, Metadata, Viewport};
use crate::layout::postprocess::{Identity, PostProcess};
use crate::layout::routing::{HallwayStats, route_all};
use crate::layout::routing::types::RoutingConfig;
use crate::layout::sampler::{RoomSampler, SamplerConfig, center_on_origin};
use crate::layout::spring::{Relaxation, SpringConfig, measure, relax};

/// Everything that tunes a generation run, passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub sampler: SamplerConfig,
    pub connectivity: ConnectivityConfig,
    pub spring: SpringConfig,
    pub routing: RoutingConfig,
    /// Cells added around the room bounding box to form the viewport.
    pub margin: i32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            connectivity: ConnectivityConfig::default(),
            spring: SpringConfig::default(),
            routing: RoutingConfig::default(),
            margin: Viewport::DEFAULT_MARGIN,
        }
    }
}

/// Per-request switches echoed back in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub include_contents: bool,
    /// Fixed seed for reproducible output. `None` draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_contents: true,
            seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("failed to encode layout metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// A valid layout plus the non-fatal conditions met while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub layout: DungeonLayout,
    pub warnings: Vec<String>,
}

/// Build a layout from guidelines.
///
/// With the same guidelines, config and `seed`, the result is identical
/// across runs.
pub fn generate_layout(
    guidelines: &Guidelines,
    config: &GenerationConfig,
    seed: Option<u64>,
) -> Result<Generation, GenerateError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut warnings = Vec::new();

    let sampler = RoomSampler::new(config.sampler.clone());
    let distribution = &guidelines.room_size_distribution;
    let placement = match guidelines.layout_type {
        LayoutType::PoissonDisc => {
            sampler.sample(guidelines.room_count, distribution, None, &mut rng)
        }
        LayoutType::LineGraph => sampler.sample_line(guidelines.room_count, distribution, &mut rng),
    };
    if placement.shortfall() > 0 {
        warnings.push(format!(
            "Placed {} of {} requested rooms",
            placement.rooms.len(),
            placement.requested
        ));
    }
    tracing::debug!(
        rooms = placement.rooms.len(),
        layout = %guidelines.layout_type,
        "placement done"
    );

    let connections = connect(&placement.rooms, &config.connectivity);
    let relaxation = match guidelines.layout_type {
        LayoutType::PoissonDisc => relax(
            &placement.rooms,
            &connections,
            config.sampler.min_separation,
            &config.spring,
        ),
        LayoutType::LineGraph => Relaxation::unchanged(&placement.rooms),
    };
    let spring_applied = relaxation.iterations > 0;
    let rooms = center_on_origin(&relaxation.rooms);
    let rooms = assign_room_flags(
        &rooms,
        &connections,
        &guidelines.content_odds(),
        &mut rng,
    );

    let routed = route_all(&rooms, &connections, &config.routing);
    let fallbacks = routed.fallback_count();
    if fallbacks > 0 {
        warnings.push(format!("{fallbacks} corridor(s) fell back to a direct line"));
    }
    for id in &routed.skipped {
        warnings.push(format!("Connection {id} references an unknown room"));
    }

    let mut metadata = Metadata::new();
    metadata.insert("layout_type".into(), json!(guidelines.layout_type));
    metadata.insert(
        "algorithm".into(),
        json!(algorithm(guidelines.layout_type, spring_applied)),
    );
    metadata.insert("room_count".into(), json!(rooms.len()));
    metadata.insert("requested_room_count".into(), json!(placement.requested));
    metadata.insert(
        "min_separation".into(),
        json!(config.sampler.min_separation),
    );
    if let Some(seed) = seed {
        metadata.insert("seed".into(), json!(seed));
    }
    metadata.insert("corridor_count".into(), json!(routed.corridors.len()));
    metadata.insert(
        "hallway_stats".into(),
        serde_json::to_value(HallwayStats::from_corridors(&routed.corridors))?,
    );
    if placement.shortfall() > 0 {
        metadata.insert("placement_shortfall".into(), json!(placement.shortfall()));
    }
    metadata.insert("fallback_corridors".into(), json!(fallbacks));
    if spring_applied {
        metadata.insert(
            "spring_optimization".into(),
            json!({
                "config": serde_json::to_value(&config.spring)?,
                "iterations": relaxation.iterations,
                "converged": relaxation.converged,
                "moved_rooms": relaxation.moved,
            }),
        );
    }
    if let Some(quality) = measure(&rooms, &connections, &config.spring) {
        metadata.insert("quality_metrics".into(), serde_json::to_value(quality)?);
    }

    let layout = assemble(
        layout_name(guidelines),
        rooms,
        connections,
        routed.corridors,
        metadata,
        config.margin,
    )?;
    tracing::debug!(
        rooms = layout.rooms.len(),
        connections = layout.connections.len(),
        corridors = layout.corridors.len(),
        "layout assembled"
    );

    Ok(Generation { layout, warnings })
}

fn algorithm(layout_type: LayoutType, spring_applied: bool) -> &'static str {
    match (layout_type, spring_applied) {
        (LayoutType::PoissonDisc, true) => "poisson_disc_sampling_with_spring_optimization",
        (LayoutType::PoissonDisc, false) => "poisson_disc_sampling",
        (LayoutType::LineGraph, _) => "line_graph",
    }
}

fn layout_name(guidelines: &Guidelines) -> String {
    format!("{} {}", guidelines.atmosphere, guidelines.theme)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// One entry of a report's error list: a plain message, or a categorized
/// collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportError {
    Message(String),
    Categorized { error: String, message: String },
}

impl From<&ContentError> for ReportError {
    fn from(err: &ContentError) -> Self {
        ReportError::Categorized {
            error: err.category().to_string(),
            message: err.to_string(),
        }
    }
}

/// Top-level response of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub dungeon: DungeonLayout,
    pub guidelines: Guidelines,
    pub options: GenerationOptions,
    pub generation_time: DateTime<Utc>,
    pub status: Status,
    pub errors: Vec<ReportError>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Runs the full pipeline and packages the outcome as a report.
pub struct Generator {
    config: GenerationConfig,
    postprocess: Box<dyn PostProcess>,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            postprocess: Box::new(Identity),
        }
    }

    pub fn with_postprocess(mut self, postprocess: impl PostProcess + 'static) -> Self {
        self.postprocess = Box::new(postprocess);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a layout, merge content when requested and available, then
    /// post-process and re-validate.
    ///
    /// Content failures are recorded in the report and leave the layout
    /// intact. Only a layout that cannot be built yields an error status.
    pub fn run(
        &self,
        guidelines: &Guidelines,
        options: &GenerationOptions,
        content: Option<&dyn ContentSource>,
    ) -> GenerationReport {
        let generation_time = Utc::now();
        let report = |dungeon, status, errors| GenerationReport {
            dungeon,
            guidelines: guidelines.clone(),
            options: options.clone(),
            generation_time,
            status,
            errors,
        };

        let generation = match generate_layout(guidelines, &self.config, options.seed) {
            Ok(generation) => generation,
            Err(err) => {
                tracing::error!(error = %err, "generation failed");
                return report(
                    DungeonLayout::empty(layout_name(guidelines)),
                    Status::Error,
                    vec![ReportError::Message(format!("Generation failed: {err}"))],
                );
            }
        };

        let mut errors: Vec<ReportError> = generation
            .warnings
            .into_iter()
            .map(ReportError::Message)
            .collect();
        let mut layout = generation.layout;

        match (options.include_contents, content) {
            (true, Some(source)) => match source.room_contents(&layout, guidelines) {
                Ok(contents) => match merge_room_contents(&layout, &contents) {
                    Ok(merged) => layout = merged,
                    Err(err) => {
                        tracing::warn!(error = %err, "room content could not be merged");
                        errors.push(ReportError::from(&err));
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "room content unavailable");
                    errors.push(ReportError::from(&err));
                }
            },
            (true, None) => tracing::debug!("no content source configured"),
            (false, _) => {}
        }

        let layout = self.postprocess.process(layout);
        errors.extend(
            validate(&layout)
                .into_iter()
                .map(|e| ReportError::Message(format!("Validation: {e}"))),
        );

        report(layout, Status::Success, errors)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}
