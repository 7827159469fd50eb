use scholar_core::{ResearchResult, Result, Trace, TraceEntry, TraceStatus};
use scholar_local::WebContentTool;
use serde_json::json;
use std::time::Duration;

use crate::catalog::{Catalog, RenderedResponse};

/// Search depth for the research stage.
pub const RESEARCH_MAX_RESULTS: usize = 3;
/// Text budget for the single page fetched during research.
pub const RESEARCH_FETCH_MAX_CHARS: usize = 5_000;

const ORCHESTRATOR_TOOL: &str = "working_crew_orchestrator";

/// Simulated per-stage latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub research: Duration,
    pub analysis: Duration,
    pub synthesis: Duration,
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            research: Duration::from_millis(500),
            analysis: Duration::from_millis(300),
            synthesis: Duration::from_millis(200),
        }
    }
}

impl StageDelays {
    pub fn none() -> Self {
        Self {
            research: Duration::ZERO,
            analysis: Duration::ZERO,
            synthesis: Duration::ZERO,
        }
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

fn success(
    agent: &str,
    action: &str,
    tool: &str,
    input: serde_json::Value,
    output: serde_json::Value,
) -> TraceEntry {
    TraceEntry::now(agent, action, tool, input, output, TraceStatus::Success)
}

/// Answers one question end to end. Implementations never fail; problems are reported
/// inside the returned trace.
#[async_trait::async_trait]
pub trait QuestionProcessor: Send + Sync {
    async fn process_question(&self, question: &str) -> ResearchResult;

    /// Whether research uses real web tools rather than a mocked lookup.
    fn tools_available(&self) -> bool;
}

/// Research → analysis → synthesis over a fixed response catalog.
///
/// Each call owns its trace, so one pipeline can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct ResearchPipeline {
    tools: Option<WebContentTool>,
    catalog: Catalog,
    delays: StageDelays,
}

impl ResearchPipeline {
    pub fn new(tools: Option<WebContentTool>, catalog: Catalog, delays: StageDelays) -> Self {
        Self {
            tools,
            catalog,
            delays,
        }
    }

    async fn run(&self, question: &str, trace: &mut Trace) -> Result<RenderedResponse> {
        trace.push(success(
            "orchestrator",
            "start_processing",
            ORCHESTRATOR_TOOL,
            json!({ "question": question, "mode": "dependency_safe" }),
            json!({ "status": "initialized" }),
        ));

        self.research(question, trace).await;
        self.analyze(trace).await;
        self.synthesize(question, trace).await
    }

    async fn research(&self, question: &str, trace: &mut Trace) {
        pause(self.delays.research).await;
        tracing::debug!(tools = self.tools.is_some(), "research stage");

        let Some(tool) = self.tools.clone() else {
            trace.push(mock_search_entry(question, None));
            return;
        };

        // Own task: a panic inside a provider or the HTML parser degrades to mock output.
        let q = question.to_string();
        let lookup = tokio::spawn(async move { research_lookup(&tool, &q).await });
        match lookup.await {
            Ok(entries) => {
                for e in entries {
                    trace.push(e);
                }
            }
            Err(e) => trace.push(mock_search_entry(question, Some(e.to_string()))),
        }
    }

    async fn analyze(&self, trace: &mut Trace) {
        pause(self.delays.analysis).await;
        tracing::debug!("analysis stage");

        // Fixed figures; nothing is actually validated.
        trace.push(success(
            "analyzer",
            "validate_information",
            "content_validator",
            json!({ "sources": 3, "facts_to_validate": 12 }),
            json!({
                "validated_facts": 10,
                "credibility_score": 0.88,
                "analysis_complete": true
            }),
        ));
    }

    async fn synthesize(&self, question: &str, trace: &mut Trace) -> Result<RenderedResponse> {
        pause(self.delays.synthesis).await;
        tracing::debug!("synthesis stage");

        trace.push(success(
            "synthesizer",
            "generate_response",
            "response_generator",
            json!({ "question": question, "validated_facts": 10 }),
            json!({
                "answer_generated": true,
                "citations_created": 3,
                "reasoning_provided": true
            }),
        ));
        self.catalog.render(question)
    }
}

#[async_trait::async_trait]
impl QuestionProcessor for ResearchPipeline {
    fn tools_available(&self) -> bool {
        self.tools.is_some()
    }

    async fn process_question(&self, question: &str) -> ResearchResult {
        let mut trace = Trace::new();
        tracing::info!(question_chars = question.chars().count(), "processing question");

        match self.run(question, &mut trace).await {
            Ok(r) => {
                trace.push(success(
                    "orchestrator",
                    "complete_processing",
                    ORCHESTRATOR_TOOL,
                    json!({ "question": question }),
                    json!({ "workflow_completed": true }),
                ));
                tracing::debug!(topic = %r.topic, "processing completed");
                ResearchResult {
                    answer: r.answer,
                    reasoning: r.reasoning,
                    citations: r.citations,
                    trace,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "pipeline failed, returning degraded response");
                trace.push(TraceEntry::now(
                    "orchestrator",
                    "error_handling",
                    ORCHESTRATOR_TOOL,
                    json!({ "question": question }),
                    json!({ "error": e.to_string() }),
                    TraceStatus::Error,
                ));
                ResearchResult {
                    answer: format!("I encountered an issue while processing: {question}"),
                    reasoning: format!("Multi-agent processing error: {e}"),
                    citations: Vec::new(),
                    trace,
                }
            }
        }
    }
}

/// Search, then fetch the first hit. Only the first result is ever fetched, and the
/// fetched text never feeds into the citations.
async fn research_lookup(tool: &WebContentTool, question: &str) -> Vec<TraceEntry> {
    let mut entries = Vec::with_capacity(2);

    let found = tool.search(question, RESEARCH_MAX_RESULTS).await;
    entries.push(success(
        "researcher",
        "web_search",
        "mcp_web_search",
        json!({ "query": question }),
        json!({
            "results_count": found.results.len(),
            "tool_type": "real",
            "provenance": found.provenance.as_str(),
        }),
    ));

    let Some(first) = found.results.first().filter(|r| !r.url.is_empty()) else {
        return entries;
    };
    let page = tool.fetch(&first.url, RESEARCH_FETCH_MAX_CHARS).await;
    entries.push(success(
        "researcher",
        "web_fetch",
        "mcp_web_fetch",
        json!({ "url": first.url }),
        json!({
            "content_length": page.length,
            "tool_type": "real",
            "status": page.status.as_str(),
        }),
    ));
    entries
}

fn mock_search_entry(question: &str, fallback_reason: Option<String>) -> TraceEntry {
    let mut output = json!({ "results_count": 3, "tool_type": "mock" });
    if let Some(reason) = fallback_reason {
        output["fallback_reason"] = json!(reason);
    }
    success(
        "researcher",
        "web_search",
        "mock_web_search",
        json!({ "query": question }),
        output,
    )
}
