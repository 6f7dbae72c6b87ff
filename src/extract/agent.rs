//! Tool-using extraction agent.
//!
//! The agent is given the category and decides itself which pages to search
//! for and visit. Each turn either calls tools, whose results are sent back
//! as the next user message, or answers with the final JSON listing.

use rig::{
    agent::{Agent, AgentBuilder},
    completion::{Completion as _, CompletionModel},
    message::{AssistantContent, Message, ToolCall, ToolResult, ToolResultContent, UserContent},
    one_or_many::OneOrMany,
};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::parsing::parse_listings;
use super::prompts::{agent_task, CATALOG_AGENT_PROMPT};
use super::tools::{FetchPageTool, WebSearchTool};
use super::{ExtractError, SearchAndExtract, SupplierListing};
use crate::crawler::PageFetcher;
use crate::model::assistant_text;
use crate::search::WebSearch;

/// Settings for the tool-calling loop
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model turns allowed before giving up
    pub max_iterations: usize,
    pub temperature: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            temperature: 0.2,
        }
    }
}

/// Extraction strategy that lets the model drive search and fetching
pub struct CatalogAgent<C: CompletionModel> {
    agent: Agent<C>,
    max_iterations: usize,
}

impl<C> CatalogAgent<C>
where
    C: CompletionModel + 'static,
{
    pub fn new<S, F>(model: C, search: S, fetcher: F, config: AgentConfig) -> Self
    where
        S: WebSearch + Clone + 'static,
        F: PageFetcher + Clone + 'static,
    {
        let agent = AgentBuilder::new(model)
            .preamble(CATALOG_AGENT_PROMPT)
            .temperature(config.temperature)
            .tool(WebSearchTool::new(search))
            .tool(FetchPageTool::new(fetcher))
            .build();
        Self {
            agent,
            max_iterations: config.max_iterations,
        }
    }

    /// Executes a tool call, turning failures into a JSON error the model can read
    #[instrument(name = "execute_tool_call", skip(self, tool_call), fields(
        tool_name = %tool_call.function.name,
        tool_id = %tool_call.id
    ))]
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> String {
        let name = &tool_call.function.name;
        let args_json = tool_call.function.arguments.to_string();
        debug!(tool_args = %args_json, "Executing tool call");

        match self.agent.tools.call(name, args_json).await {
            Ok(result) if result.is_empty() => {
                warn!(tool_name = %name, "Tool returned empty result");
                json!({ "result": "Tool returned no result" }).to_string()
            }
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, tool_name = %name, "Tool call execution failed");
                json!({ "error": format!("Tool call '{}' failed: {}", name, e) }).to_string()
            }
        }
    }
}

impl<C> SearchAndExtract for CatalogAgent<C>
where
    C: CompletionModel + 'static,
{
    #[instrument(name = "agent_execution", skip(self), fields(max_iterations = self.max_iterations))]
    async fn run(&self, category: &str) -> Result<Vec<SupplierListing>, ExtractError> {
        let mut history: Vec<Message> = Vec::new();
        let mut prompt = Message::user(agent_task(category));

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Starting agent turn");
            let response = self
                .agent
                .completion(prompt.clone(), history.clone())
                .await?
                .send()
                .await?;
            history.push(prompt);

            let tool_calls: Vec<ToolCall> = response
                .choice
                .iter()
                .filter_map(|content| match content {
                    AssistantContent::ToolCall(call) => Some(call.clone()),
                    _ => None,
                })
                .collect();
            history.push(Message::Assistant {
                content: response.choice.clone(),
            });

            if tool_calls.is_empty() {
                let answer = assistant_text(&response.choice);
                if answer.trim().is_empty() {
                    return Err(ExtractError::Agent(
                        "agent ended without a final answer".to_string(),
                    ));
                }
                let listings = parse_listings(&answer)?;
                info!(
                    iterations = iteration,
                    "Agent extracted {} supplier listings",
                    listings.len()
                );
                return Ok(listings);
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in &tool_calls {
                let output = self.execute_tool_call(call).await;
                results.push(UserContent::ToolResult(ToolResult {
                    id: call.id.clone(),
                    content: OneOrMany::one(ToolResultContent::text(output)),
                }));
            }
            prompt = Message::User {
                content: OneOrMany::many(results)
                    .map_err(|e| ExtractError::Agent(e.to_string()))?,
            };
        }

        warn!(
            max_iterations = self.max_iterations,
            "Execution reached max iterations"
        );
        Err(ExtractError::MaxIterations(self.max_iterations))
    }
}
