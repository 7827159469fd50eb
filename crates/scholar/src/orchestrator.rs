use scholar_core::{Citation, ResearchResult, Trace, TraceEntry, TraceStatus};
use serde_json::json;
use std::sync::Arc;

use crate::pipeline::QuestionProcessor;

/// Picks between the research pipeline and a fixed fallback responder.
#[derive(Clone)]
pub struct Orchestrator {
    pipeline: Option<Arc<dyn QuestionProcessor>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("agents", &self.agents_available())
            .field("tools", &self.tools_available())
            .finish()
    }
}

impl Orchestrator {
    pub fn new(pipeline: Option<Arc<dyn QuestionProcessor>>) -> Self {
        let orch = Self { pipeline };
        tracing::info!(
            agents = orch.agents_available(),
            tools = orch.tools_available(),
            "orchestrator initialized"
        );
        orch
    }

    pub fn with_pipeline(pipeline: impl QuestionProcessor + 'static) -> Self {
        Self::new(Some(Arc::new(pipeline)))
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn agents_available(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn tools_available(&self) -> bool {
        self.pipeline
            .as_ref()
            .is_some_and(|p| p.tools_available())
    }

    pub async fn process_query(&self, question: &str) -> ResearchResult {
        let Some(pipeline) = self.pipeline.clone() else {
            return self.fallback_response(question, None);
        };

        let q = question.to_string();
        match tokio::spawn(async move { pipeline.process_question(&q).await }).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "agent processing failed");
                self.fallback_response(question, Some(&e.to_string()))
            }
        }
    }

    pub fn fallback_response(&self, question: &str, error: Option<&str>) -> ResearchResult {
        let error_msg = error
            .map(|e| format!(" (Agent Error: {e})"))
            .unwrap_or_default();

        let mut output = json!({
            "status": "fallback_mode",
            "agents_available": self.agents_available(),
        });
        if let Some(e) = error {
            output["error"] = json!(e);
        }

        let mut trace = Trace::new();
        trace.push(TraceEntry::now(
            "fallback_orchestrator",
            "process_query",
            "fallback_processor",
            json!({ "question": question }),
            output,
            TraceStatus::Success,
        ));

        ResearchResult {
            answer: format!(
                "I'm working on your question: '{question}'. The system is operating in fallback mode{error_msg}."
            ),
            reasoning: "The system is using fallback processing while agents are being configured."
                .to_string(),
            citations: vec![Citation::new(
                "https://crewai.com",
                "CrewAI Multi-Agent Framework",
                "Advanced AI agent orchestration system",
            )],
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::pipeline::{ResearchPipeline, StageDelays};

    struct PanickingProcessor;

    #[async_trait::async_trait]
    impl QuestionProcessor for PanickingProcessor {
        async fn process_question(&self, _question: &str) -> ResearchResult {
            panic!("agent crashed")
        }

        fn tools_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn fallback_only_returns_single_entry_and_citation() {
        let o = Orchestrator::fallback_only();
        let r = o.process_query("What is Rust?").await;
        assert_eq!(
            r.answer,
            "I'm working on your question: 'What is Rust?'. The system is operating in fallback mode."
        );
        assert_eq!(r.citations.len(), 1);
        assert_eq!(r.citations[0].url, "https://crewai.com");
        assert_eq!(r.trace.len(), 1);
        let e = &r.trace.entries()[0];
        assert_eq!(e.agent, "fallback_orchestrator");
        assert_eq!(e.output["status"], "fallback_mode");
        assert_eq!(e.output["agents_available"], false);
        assert!(e.output.get("error").is_none());
    }

    #[test]
    fn fallback_response_mentions_triggering_error() {
        let o = Orchestrator::fallback_only();
        let r = o.fallback_response("q", Some("task 7 panicked"));
        assert!(r.answer.ends_with("fallback mode (Agent Error: task 7 panicked)."));
        assert_eq!(r.trace.entries()[0].output["error"], "task 7 panicked");
    }

    #[tokio::test]
    async fn delegates_to_pipeline_when_available() {
        let o = Orchestrator::with_pipeline(ResearchPipeline::new(
            None,
            Catalog::builtin(),
            StageDelays::none(),
        ));
        assert!(o.agents_available());
        assert!(!o.tools_available());
        let r = o.process_query("python tips").await;
        assert_eq!(r.citations.len(), 3);
        assert_eq!(r.trace.actions()[0], "start_processing");
    }

    #[tokio::test]
    async fn panicking_pipeline_falls_back_with_agent_error() {
        let o = Orchestrator::with_pipeline(PanickingProcessor);
        assert!(o.agents_available());
        let r = o.process_query("What is Rust?").await;
        let (head, tail) = r.answer.split_once(" (Agent Error: ").unwrap();
        assert_eq!(
            head,
            "I'm working on your question: 'What is Rust?'. The system is operating in fallback mode"
        );
        assert!(tail.ends_with(")."));
        assert!(r.answer.contains("panicked"));
        assert_eq!(r.citations.len(), 1);

        let e = &r.trace.entries()[0];
        assert_eq!(e.output["status"], "fallback_mode");
        assert_eq!(e.output["agents_available"], true);
        assert!(e.output["error"].as_str().unwrap().contains("panicked"));
    }
}
