use std::collections::BTreeMap;
use std::sync::Arc;

use paper_core::model::ConversationMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use storage::ConfigRepository;
use tracing::{info, warn};

use crate::chat::CompletionClient;
use crate::error::{EvaluationError, GatewayError, ValidationError};

const EVALUATOR_PROMPT: &str = "你是一个研究生学术指导助手，专门帮助学生评估论文进度、理解导师意图，并提供改进和沟通建议。
请严格遵循以下规则：

1. 根据学生提供的文本信息判断当前论文阶段，阶段名称取自下方阶段信息。
2. 仅对当前阶段的各子任务进行量化评估，用 0~1 的数字表示完成程度，0 表示尚未开始，1 表示已充分完成。
3. 根据阶段和子任务进度，生成具体可操作的建议。
4. 提炼导师沟通记录中的核心关注点，并给出学生可执行的沟通策略。
5. 输出必须严格按照 JSON 结构：
{
  \"current_stage\": \"阶段名称\",
  \"tasks_progress\": { \"子任务名称\": 完成度 },
  \"advice\": \"可操作建议文本\",
  \"mentor_insights\": \"导师意见解读及沟通建议\"
}

6. 阶段及子任务信息如下：
";

/// Structured verdict on a free-text progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub current_stage: String,
    /// Task name to completion in `0..=1`.
    #[serde(default)]
    pub tasks_progress: BTreeMap<String, f64>,
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub mentor_insights: String,
}

/// Asks the assistant to place a progress description within the stage catalog.
#[derive(Clone)]
pub struct ResearchEvaluator {
    config: Arc<dyn ConfigRepository>,
    client: Arc<dyn CompletionClient>,
}

impl ResearchEvaluator {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigRepository>, client: Arc<dyn CompletionClient>) -> Self {
        Self { config, client }
    }

    /// Catalog rendered as `{"stages": [{stage, purpose, checklist: {topic: [items]}}]}`.
    #[must_use]
    pub fn catalog_outline(&self) -> Value {
        let catalog = self.config.catalog();
        let stages: Vec<Value> = catalog
            .stages()
            .iter()
            .map(|stage| {
                let mut checklist = Map::new();
                for topic in catalog.topics_for_stage(stage.id) {
                    let items: Vec<Value> = catalog
                        .checklists_for_topic(topic.id)
                        .into_iter()
                        .flat_map(|list| list.items.iter())
                        .map(|item| Value::String(item.description.clone()))
                        .collect();
                    checklist.insert(topic.name.clone(), Value::Array(items));
                }
                json!({
                    "stage": stage.name,
                    "purpose": stage.description,
                    "checklist": checklist,
                })
            })
            .collect();
        json!({ "stages": stages })
    }

    #[must_use]
    pub fn system_prompt(&self) -> String {
        let outline = serde_json::to_string_pretty(&self.catalog_outline())
            .unwrap_or_else(|_| String::from("{}"));
        format!("{EVALUATOR_PROMPT}{outline}")
    }

    /// Evaluate a progress description.
    ///
    /// # Errors
    ///
    /// `Validation` for blank input; `Gateway` when the call fails or the
    /// reply is not the expected JSON (`Format` carries the raw reply).
    pub async fn evaluate(&self, description: &str) -> Result<Evaluation, EvaluationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }

        let messages = [
            ConversationMessage::system(self.system_prompt()),
            ConversationMessage::user(description),
        ];
        let reply = self.client.complete(&messages).await?;
        let evaluation = parse_evaluation(&reply).inspect_err(|err| {
            warn!(error = %err, "evaluation reply could not be parsed");
        })?;
        info!(
            stage = %evaluation.current_stage,
            tasks = evaluation.tasks_progress.len(),
            "progress evaluated"
        );
        Ok(evaluation)
    }
}

/// Parse a reply that may be wrapped in a Markdown code fence.
pub(crate) fn parse_evaluation(reply: &str) -> Result<Evaluation, GatewayError> {
    let mut evaluation: Evaluation = serde_json::from_str(strip_code_fence(reply))
        .map_err(|_| GatewayError::Format(reply.to_owned()))?;
    for value in evaluation.tasks_progress.values_mut() {
        *value = value.clamp(0.0, 1.0);
    }
    Ok(evaluation)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
