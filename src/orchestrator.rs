//! Sequences one analysis request: features, history, model, probability,
//! and the optional label that follows.

use log::{debug, info};

use crate::config::Settings;
use crate::dataset::Dataset;
use crate::error::{CopilotError, Result};
use crate::feedback;
use crate::features;
use crate::history::HistoryStore;
use crate::models::{HistoryTable, Observation, RiskAssessment};
use crate::risk::RiskModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    FeaturesExtracted,
    HistoryLoaded,
    ModelTrained,
    InsufficientHistory,
    ProbabilityComputed,
    AwaitingFeedback,
    Done,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub observation: Observation,
    pub assessment: RiskAssessment,
    /// Rows the model was trained on.
    pub history_rows: usize,
    table: HistoryTable,
    stage: Stage,
}

impl Analysis {
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

pub struct Orchestrator<'a> {
    store: &'a HistoryStore,
    settings: &'a Settings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a HistoryStore, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    pub fn assess(&self, dataset: &Dataset) -> Result<Analysis> {
        let mut stage = Stage::Idle;

        let observation = features::extract(dataset, &self.settings.columns)?;
        advance(&mut stage, Stage::FeaturesExtracted);

        let table = self.store.load()?;
        advance(&mut stage, Stage::HistoryLoaded);

        let assessment = match RiskModel::train(&table, &self.settings.forest) {
            RiskModel::Trained(forest) => {
                advance(&mut stage, Stage::ModelTrained);
                RiskAssessment::Scored {
                    probability: forest.predict(&observation),
                }
            }
            RiskModel::Untrained => {
                advance(&mut stage, Stage::InsufficientHistory);
                RiskAssessment::InsufficientHistory
            }
        };
        advance(&mut stage, Stage::ProbabilityComputed);

        info!(
            "observation {:?} scored {} from {} history rows",
            observation,
            assessment,
            table.len()
        );

        advance(&mut stage, Stage::AwaitingFeedback);
        Ok(Analysis {
            observation,
            assessment,
            history_rows: table.len(),
            table,
            stage,
        })
    }

    /// Appends the label to the history loaded for this analysis. The
    /// assessment already computed is left as is.
    pub fn submit_feedback(&self, analysis: &mut Analysis, is_risky: bool) -> Result<HistoryTable> {
        if analysis.stage != Stage::AwaitingFeedback {
            return Err(CopilotError::AlreadyLabeled);
        }

        let updated = feedback::submit(self.store, &analysis.table, analysis.observation, is_risky)?;
        advance(&mut analysis.stage, Stage::Done);
        Ok(updated)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("{:?} -> {:?}", stage, next);
    *stage = next;
}
