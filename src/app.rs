//! Wires the loaded artifacts into a decision engine and renders responses.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use common::DecisionRequest;
use decision_engine::{explain, Decision, DecisionEngine, DecisionResponse, Rejection};
use demand_model::ArtifactBundle;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;

pub fn now_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decision response plus per-call metadata.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub request_id: Uuid,
    pub generated_at: String,
    pub artifact_path: String,
    #[serde(flatten)]
    pub response: DecisionResponse,
}

/// What one request produced, ready for printing.
#[derive(Debug)]
pub enum Rendered {
    Priced {
        envelope: Box<ResponseEnvelope>,
        note: String,
        summary: String,
    },
    Rejected(Rejection),
}

pub struct App {
    config: AppConfig,
    artifact_path: PathBuf,
    engine: DecisionEngine,
}

impl App {
    /// Resolve and load the artifact once; the engine is read-only afterwards.
    pub fn new(config: AppConfig) -> Result<Self> {
        let artifact_path = config.resolve_artifact_path()?;
        let bundle = ArtifactBundle::load(&artifact_path)
            .with_context(|| format!("Failed to load artifact {}", artifact_path.display()))?;
        let engine = DecisionEngine::new(bundle.into_parts(), config.engine_config());
        info!(
            "Engine ready: {} items, alpha={}, full_block_policy={:?}",
            engine.grids().len(),
            engine.config().exploration_alpha,
            engine.config().full_block_policy
        );

        Ok(Self {
            config,
            artifact_path,
            engine,
        })
    }

    pub fn usable_items(&self, limit: Option<usize>) -> Vec<&str> {
        let cap = limit
            .unwrap_or(self.config.catalog.max_listed_items)
            .min(self.config.catalog.max_listed_items);
        self.engine.grids().usable_items(cap)
    }

    pub fn recommend(&self, request: &DecisionRequest) -> Rendered {
        match self.engine.choose(request) {
            Decision::Priced(result) => {
                let explanation = explain(&result);
                let envelope = ResponseEnvelope {
                    request_id: Uuid::new_v4(),
                    generated_at: now_iso(Utc::now()),
                    artifact_path: self.artifact_path.display().to_string(),
                    response: DecisionResponse::new(&result, &explanation),
                };
                Rendered::Priced {
                    envelope: Box::new(envelope),
                    note: explanation.note,
                    summary: explanation.narrative,
                }
            }
            Decision::Rejected(rejection) => Rendered::Rejected(rejection),
        }
    }
}
