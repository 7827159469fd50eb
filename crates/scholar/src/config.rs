use clap::builder::BoolishValueParser;
use scholar_local::{search::DEFAULT_DUCKDUCKGO_ENDPOINT, WebContentTool};

use crate::catalog::Catalog;
use crate::orchestrator::Orchestrator;
use crate::pipeline::{ResearchPipeline, StageDelays};

pub const DEFAULT_CORS_ORIGINS: &str = "http://127.0.0.1:3000,http://localhost:3000";

/// Service configuration. Every flag falls back to an environment variable.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind host.
    #[arg(long, env = "HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,
    /// Bind port.
    #[arg(long, env = "PORT", default_value_t = 8000, global = true)]
    pub port: u16,
    /// Comma-separated origins allowed by CORS (`*` for any).
    #[arg(
        long,
        env = "SCHOLAR_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGINS,
        global = true
    )]
    pub cors_origins: Vec<String>,
    /// Use real web search/fetch during research (false: mock research trace).
    #[arg(
        long,
        env = "SCHOLAR_WEB_TOOLS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub web_tools: bool,
    /// Run the agent pipeline (false: every query gets the fallback response).
    #[arg(
        long,
        env = "SCHOLAR_AGENTS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub agents: bool,
    /// Sleep between pipeline stages like a real multi-agent run would.
    #[arg(
        long,
        env = "SCHOLAR_SIMULATE_LATENCY",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub simulate_latency: bool,
    /// DuckDuckGo Instant Answer endpoint.
    #[arg(
        long,
        env = "SCHOLAR_SEARCH_ENDPOINT",
        default_value = DEFAULT_DUCKDUCKGO_ENDPOINT,
        global = true
    )]
    pub search_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS
                .split(',')
                .map(str::to_string)
                .collect(),
            web_tools: true,
            agents: true,
            simulate_latency: true,
            search_endpoint: DEFAULT_DUCKDUCKGO_ENDPOINT.to_string(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn stage_delays(&self) -> StageDelays {
        if self.simulate_latency {
            StageDelays::default()
        } else {
            StageDelays::none()
        }
    }

    /// Web tools, or `None` when disabled or the HTTP client cannot be built.
    pub fn web_tools(&self) -> Option<WebContentTool> {
        if !self.web_tools {
            return None;
        }
        match WebContentTool::local(Some(&self.search_endpoint)) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(error = %e, "web tools unavailable, research will be mocked");
                None
            }
        }
    }

    pub fn build_orchestrator(&self) -> Orchestrator {
        if !self.agents {
            return Orchestrator::fallback_only();
        }
        Orchestrator::with_pipeline(ResearchPipeline::new(
            self.web_tools(),
            Catalog::builtin(),
            self.stage_delays(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        config: AppConfig,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TestCli::parse_from([
            "scholar",
            "--host",
            "0.0.0.0",
            "--port",
            "9001",
            "--web-tools",
            "0",
            "--simulate-latency",
            "no",
            "--cors-origins",
            "http://a.test,http://b.test",
        ]);
        let c = cli.config;
        assert_eq!(c.bind_addr(), "0.0.0.0:9001");
        assert!(!c.web_tools);
        assert!(c.agents);
        assert_eq!(c.stage_delays(), StageDelays::none());
        assert_eq!(c.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn default_impl_matches_cli_defaults() {
        let c = AppConfig::default();
        assert_eq!(c.bind_addr(), "127.0.0.1:8000");
        assert_eq!(c.cors_origins.len(), 2);
        assert_eq!(c.stage_delays(), StageDelays::default());
    }

    #[test]
    fn disabled_agents_build_fallback_orchestrator() {
        let c = AppConfig {
            agents: false,
            ..AppConfig::default()
        };
        assert!(!c.build_orchestrator().agents_available());
    }

    #[test]
    fn disabled_web_tools_yield_no_tools() {
        let c = AppConfig {
            web_tools: false,
            ..AppConfig::default()
        };
        assert!(c.web_tools().is_none());
        assert!(!c.build_orchestrator().tools_available());
    }
}
