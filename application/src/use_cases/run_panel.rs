//! Run Panel use case
//!
//! Selects a panel (the best agent plus its runners-up), asks every member
//! the question concurrently and synthesizes their answers.

use crate::config::BehaviorConfig;
use crate::ports::agent_search::AgentSearchPort;
use crate::ports::agent_store::AgentStorePort;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::select_agent::{AgentSelection, SelectAgentError, SelectAgentUseCase};
use crate::use_cases::synthesize_responses::SynthesizeResponsesUseCase;
use panel_domain::{
    Agent, AgentResponse, Model, Phase, PromptTemplate, SynthesisContext, SynthesisError,
    SynthesizedResponse, UserPreferences,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Default number of agents asked in a panel
pub const DEFAULT_PANEL_SIZE: usize = 3;

/// Errors that can occur during a panel run
#[derive(Error, Debug)]
pub enum RunPanelError {
    #[error(transparent)]
    Selection(#[from] SelectAgentError),

    #[error("All {0} panel members failed to respond")]
    AllAgentsFailed(usize),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Input for the RunPanel use case
#[derive(Debug, Clone)]
pub struct RunPanelInput {
    pub question: String,
    /// Selected agent plus up to `panel_size - 1` alternates
    pub panel_size: usize,
    /// Named synthesis strategy; automatic when `None` or unknown
    pub strategy: Option<String>,
    pub preferences: UserPreferences,
}

impl RunPanelInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            panel_size: DEFAULT_PANEL_SIZE,
            strategy: None,
            preferences: UserPreferences::default(),
        }
    }

    pub fn with_panel_size(mut self, size: usize) -> Self {
        self.panel_size = size.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Everything a panel run produced
#[derive(Debug, Clone, Serialize)]
pub struct PanelOutcome {
    pub selection: AgentSelection,
    /// Successful answers, in panel order
    pub responses: Vec<AgentResponse>,
    pub synthesis: SynthesizedResponse,
}

/// Use case for answering a question with a panel of agents
pub struct RunPanelUseCase<G, S, F>
where
    G: LlmGateway + 'static,
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    gateway: Arc<G>,
    model: Model,
    selector: SelectAgentUseCase<G, S, F>,
    synthesizer: SynthesizeResponsesUseCase,
    behavior: BehaviorConfig,
}

impl<G, S, F> RunPanelUseCase<G, S, F>
where
    G: LlmGateway + 'static,
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        model: Model,
        selector: SelectAgentUseCase<G, S, F>,
        synthesizer: SynthesizeResponsesUseCase,
    ) -> Self {
        Self {
            gateway,
            model,
            selector,
            synthesizer,
            behavior: BehaviorConfig::default(),
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunPanelInput) -> Result<PanelOutcome, RunPanelError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunPanelInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<PanelOutcome, RunPanelError> {
        let selection = self
            .selector
            .execute_with_progress(&input.question, progress)
            .await?;

        let panel = panel_members(&selection, input.panel_size);
        info!("Starting panel with {} agents", panel.len());

        let responses = self.phase_generate(&input.question, panel, progress).await?;

        progress.on_phase_start(&Phase::Synthesize, 1);
        let context = SynthesisContext {
            query: Some(input.question.clone()),
            user_preferences: input.preferences.clone(),
        };
        let synthesis = self
            .synthesizer
            .execute(&responses, &context, input.strategy.as_deref());
        progress.on_task_complete(
            &Phase::Synthesize,
            synthesis
                .as_ref()
                .map(|s| s.metadata.strategy.as_str())
                .unwrap_or("none"),
            synthesis.is_ok(),
        );
        progress.on_phase_complete(&Phase::Synthesize);

        Ok(PanelOutcome {
            selection,
            responses,
            synthesis: synthesis?,
        })
    }

    /// Ask every panel member in parallel; failures are dropped with a warning.
    async fn phase_generate(
        &self,
        question: &str,
        panel: Vec<(Agent, f64)>,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<AgentResponse>, RunPanelError> {
        progress.on_phase_start(&Phase::Generate, panel.len());
        let panel_size = panel.len();

        let mut join_set = JoinSet::new();
        for (index, (agent, score)) in panel.into_iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let model = self.model.clone();
            let behavior = self.behavior.clone();
            let question = question.to_string();

            join_set.spawn(async move {
                let result = behavior
                    .within_deadline(Self::ask_agent(&gateway, &model, &agent, &question))
                    .await
                    .unwrap_or(Err(GatewayError::Timeout));
                (index, agent, score, result)
            });
        }

        let mut answered = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, agent, score, Ok(content))) => {
                    debug!("Agent {} responded", agent.id);
                    progress.on_task_complete(&Phase::Generate, &agent.display_name, true);
                    let response = AgentResponse::new(&agent.id, content, score)
                        .with_agent_name(&agent.display_name)
                        .with_metadata("tier", json!(agent.tier));
                    answered.push((index, response));
                }
                Ok((_, agent, _, Err(e))) => {
                    warn!("Agent {} failed: {}", agent.id, e);
                    progress.on_task_complete(&Phase::Generate, &agent.display_name, false);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }
        progress.on_phase_complete(&Phase::Generate);

        if answered.is_empty() {
            return Err(RunPanelError::AllAgentsFailed(panel_size));
        }
        answered.sort_by_key(|(index, _)| *index);
        Ok(answered.into_iter().map(|(_, response)| response).collect())
    }

    async fn ask_agent(
        gateway: &G,
        model: &Model,
        agent: &Agent,
        question: &str,
    ) -> Result<String, GatewayError> {
        let session = gateway
            .create_session_with_system_prompt(model, &PromptTemplate::panel_system(agent))
            .await?;
        session.send(&PromptTemplate::panel_query(question)).await
    }
}

/// The selected agent and up to `size - 1` alternates, each with its ranking score.
fn panel_members(selection: &AgentSelection, size: usize) -> Vec<(Agent, f64)> {
    let result = &selection.selection;
    std::iter::once((result.selected_agent.clone(), result.confidence))
        .chain(
            result
                .alternate_agents
                .iter()
                .map(|ranking| (ranking.agent.clone(), ranking.score)),
        )
        .take(size.max(1))
        .collect()
}
