use std::sync::Arc;
use std::time::Instant;

use quill_context::{build_prompt, ContextAssembler, EntryBlock};
use quill_llm::ProviderRegistry;
use quill_persist::{PersistError, ThreadStore};
use quill_retrieval::{classify, RetrievalGateway, SearchIntent};
use quill_stream::{open_stream, EventSink, EventStream};
use quill_types::{
    ChatRequest, ChatResponse, JournalEntry, Message, OrchestratorConfig, RetrievalMode, RetrievedDoc,
    SearchIteration,
};
use tracing::Instrument;

use crate::accumulator::SearchAccumulator;
use crate::error::TurnError;
use crate::planner::{PlanContext, SearchPlanner};
use crate::state::{TurnState, TurnTracker};
use crate::tools::SearchTool;

/// Drives one user turn from retrieval decision to generated answer.
///
/// Holds only shared, read-only collaborators. Every piece of per-turn state
/// lives in locals of [`run`](Self::run), so one instance serves concurrent
/// requests.
#[derive(Clone)]
pub struct Orchestrator {
    gateway: RetrievalGateway,
    llm: Arc<ProviderRegistry>,
    threads: Option<Arc<dyn ThreadStore>>,
    assembler: ContextAssembler,
    planner: Arc<dyn SearchPlanner>,
    config: OrchestratorConfig,
}

/// Entry set chosen for the turn.
enum Grounding {
    Retrieved(Vec<RetrievedDoc>),
    Reused(Vec<JournalEntry>),
}

impl Orchestrator {
    pub fn new(
        gateway: RetrievalGateway,
        llm: Arc<ProviderRegistry>,
        threads: Option<Arc<dyn ThreadStore>>,
        assembler: ContextAssembler,
        planner: Arc<dyn SearchPlanner>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            llm,
            threads,
            assembler,
            planner,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn providers(&self) -> Vec<String> {
        self.llm.providers()
    }

    /// Whether `provider` is registered. Lets callers reject a turn up front.
    pub fn supports_provider(&self, provider: &str) -> bool {
        self.llm.get(provider).is_ok()
    }

    pub fn backend_name(&self) -> &str {
        self.gateway.backend_name()
    }

    /// Run a turn without progress events.
    pub async fn run(&self, request: ChatRequest) -> Result<ChatResponse, TurnError> {
        self.execute(&request, None).await
    }

    /// Run a turn, reporting progress and the outcome through `sink`.
    ///
    /// A failed turn ends the stream with an `error` event carrying only the
    /// user-facing message. A disconnected client ends the turn silently.
    pub async fn run_with_sink(
        &self,
        request: ChatRequest,
        sink: EventSink,
    ) -> Result<ChatResponse, TurnError> {
        let result = self.stream_turn(&request, &sink).await;
        Self::finish(sink, result).await
    }

    /// Run a turn, emitting only its `search_iteration` events.
    ///
    /// The terminal event is left to the caller, which sends it with
    /// [`finish`](Self::finish) once any follow-up work on the result is done.
    pub async fn stream_turn(
        &self,
        request: &ChatRequest,
        sink: &EventSink,
    ) -> Result<ChatResponse, TurnError> {
        self.execute(request, Some(sink)).await
    }

    /// Send the terminal event for `result` and hand the result back.
    pub async fn finish(
        sink: EventSink,
        result: Result<ChatResponse, TurnError>,
    ) -> Result<ChatResponse, TurnError> {
        match result {
            Ok(response) => {
                if sink.complete(response.clone()).await.is_err() {
                    tracing::debug!("Client went away before the final event");
                }
                Ok(response)
            }
            Err(TurnError::Cancelled) => {
                tracing::info!("Turn cancelled by client disconnect");
                Err(TurnError::Cancelled)
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                let _ = sink.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    /// Spawn a turn on the runtime and return its event stream.
    ///
    /// Dropping the stream cancels the turn at its next suspension point.
    pub fn spawn_run(&self, request: ChatRequest, capacity: usize) -> EventStream {
        let (sink, stream) = open_stream(capacity);
        let orchestrator = self.clone();

        tokio::spawn(async move {
            let _ = orchestrator.run_with_sink(request, sink).await;
        });

        stream
    }

    async fn execute(
        &self,
        request: &ChatRequest,
        sink: Option<&EventSink>,
    ) -> Result<ChatResponse, TurnError> {
        let mut tracker = TurnTracker::new(uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!(
            "turn",
            turn_id = %tracker.turn_id(),
            provider = %request.provider,
            model = %request.model,
        );

        let result = self.drive(request, sink, &mut tracker).instrument(span).await;
        if result.is_err() && !tracker.state().is_terminal() {
            tracker.advance(TurnState::Failed);
        }
        result
    }

    async fn drive(
        &self,
        request: &ChatRequest,
        sink: Option<&EventSink>,
        tracker: &mut TurnTracker,
    ) -> Result<ChatResponse, TurnError> {
        let started = Instant::now();

        // Reject unknown providers before touching the network.
        self.llm.get(&request.provider)?;

        tracker.advance(TurnState::RetrievalDecision);
        let mode = request.mode.unwrap_or(self.config.mode);

        let grounding = if let Some(reused) = request.reusable_docs() {
            tracing::info!(count = reused.len(), "Reusing entries from a previous turn");
            Grounding::Reused(reused.to_vec())
        } else {
            let intent = classify(&request.query);
            tracing::info!(%mode, ?intent, "Retrieval decision");

            if intent == SearchIntent::None {
                tracker.advance(TurnState::NoRetrieval);
                Grounding::Retrieved(Vec::new())
            } else {
                tracker.advance(match mode {
                    RetrievalMode::SingleShot => TurnState::SingleRetrieval,
                    RetrievalMode::Agentic => TurnState::AgenticLoop,
                });
                let accumulator = self.search_loop(request, intent, mode, sink).await?;
                Grounding::Retrieved(accumulator.into_docs())
            }
        };

        tracker.advance(TurnState::ContextBuild);
        let thread_history = self.thread_history(request.thread_id.as_deref()).await;
        let (context, docs) = match &grounding {
            Grounding::Retrieved(docs) => {
                let assembled = self.assembler.assemble_within_budget(
                    EntryBlock::Retrieved(docs),
                    &thread_history,
                    request.history(),
                );
                let used = docs[..assembled.entries_used.min(docs.len())].to_vec();
                (assembled.text, used)
            }
            Grounding::Reused(entries) => {
                let assembled = self.assembler.assemble_within_budget(
                    EntryBlock::Reused(entries),
                    &thread_history,
                    request.history(),
                );
                let used = entries
                    .iter()
                    .take(assembled.entries_used)
                    .cloned()
                    .map(RetrievedDoc::from)
                    .collect();
                (assembled.text, used)
            }
        };

        if sink.is_some_and(EventSink::is_closed) {
            return Err(TurnError::Cancelled);
        }

        tracker.advance(TurnState::Generation);
        let prompt = build_prompt(&request.query, &context);
        let response = self
            .llm
            .generate(&prompt, &request.provider, &request.model)
            .await?;

        tracker.advance(TurnState::Complete);
        tracing::info!(
            docs = docs.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Turn complete"
        );

        Ok(ChatResponse {
            response,
            docs,
            thread_id: request.thread_id.clone(),
        })
    }

    /// Retrieval rounds. Stops when the planner has nothing left to try, a
    /// round adds no new entries, or the round limit for `mode` is reached.
    async fn search_loop(
        &self,
        request: &ChatRequest,
        intent: SearchIntent,
        mode: RetrievalMode,
        sink: Option<&EventSink>,
    ) -> Result<SearchAccumulator, TurnError> {
        let mut accumulator = SearchAccumulator::new();
        let mut last_tool: Option<SearchTool> = None;
        let top_k = self.gateway.effective_limit(request.top_k);
        let max_rounds = self.config.rounds_for(mode);

        for round in 1..=max_rounds {
            if sink.is_some_and(EventSink::is_closed) {
                return Err(TurnError::Cancelled);
            }

            let ctx = PlanContext {
                query: &request.query,
                intent,
                round,
                top_k,
                recent_count: self.gateway.recent_count(),
                last_tool: last_tool.as_ref(),
                accumulator: &accumulator,
            };
            let Some(step) = self.planner.next(&ctx) else {
                tracing::debug!(round, "Planner finished");
                break;
            };

            let retrieval = step.tool.execute(&self.gateway).await;
            if let SearchTool::DateRange { start, end, .. } = &step.tool {
                accumulator.mark_explored(*start, *end);
            }

            let fallback = retrieval.is_fallback();
            let results_count = retrieval.docs.len();
            let added = accumulator.absorb(retrieval.docs);
            let iteration = SearchIteration {
                iteration: round as u32,
                tool: step.tool.name().to_string(),
                reasoning: step.reasoning,
                query: step.tool.query_label(),
                results_count,
                new_entries_added: added,
            };
            tracing::info!(
                round,
                tool = %iteration.tool,
                results_count,
                new_entries_added = added,
                fallback,
                "Search round complete"
            );

            if let Some(sink) = sink {
                sink.iteration(iteration.clone())
                    .await
                    .map_err(|_| TurnError::Cancelled)?;
            }
            accumulator.record(iteration);
            last_tool = Some(step.tool);

            if added == 0 {
                break;
            }
        }

        Ok(accumulator)
    }

    /// Persisted history for the thread. A missing or unreadable thread only
    /// costs context, never the turn.
    async fn thread_history(&self, thread_id: Option<&str>) -> Vec<Message> {
        let (Some(store), Some(thread_id)) = (&self.threads, thread_id) else {
            return Vec::new();
        };

        match store.get_messages(thread_id).await {
            Ok(messages) => messages,
            Err(PersistError::ThreadNotFound(id)) => {
                tracing::warn!(thread_id = %id, "Thread not found, continuing without history");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "Failed to load thread history");
                Vec::new()
            }
        }
    }
}
