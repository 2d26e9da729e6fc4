use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::core::config::Settings;
use crate::schemas::questions::{
    GeneratedQuestion, Language, QuestionsRequest, QuestionsResponse,
};

const QUESTIONS_SYSTEM_PROMPT: &str = "You are a helpful AI that generates multiple choice \
questions. Ensure no string exceeds 15 words. Reply with a JSON object of the form \
{\"questions\": [{\"question\": \"...\", \"answer\": \"...\", \"option1\": \"...\", \
\"option2\": \"...\", \"option3\": \"...\"}]}. option1, option2 and option3 are wrong answers \
that differ from the answer. Use HTML entities instead of quotes inside strings.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful AI that summarizes a topic to 10 words \
or less. If the topic already has 10 words or less, return it unchanged. Reply with a JSON \
object of the form {\"topicSumary\": \"...\"}. Use HTML entities instead of quotes.";

/// Produces the questions and topic summary served by `POST /api/questions`.
#[async_trait]
pub(crate) trait QuestionGenerator: Send + Sync {
    async fn generate(&self, request: &QuestionsRequest) -> Result<QuestionsResponse>;
}

#[derive(Debug, Deserialize)]
struct QuestionsReply {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct SummaryReply {
    #[serde(rename = "topicSumary")]
    topic_summary: String,
}

/// Chat completions client for any OpenAI compatible endpoint.
#[derive(Debug, Clone)]
pub(crate) struct OpenAiQuestionGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiQuestionGenerator {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let ai = settings.ai();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(ai.ai_request_timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: ai.openai_api_key.clone(),
            base_url: ai.openai_base_url.trim_end_matches('/').to_string(),
            model: ai.ai_model.clone(),
            max_tokens: ai.ai_max_tokens,
            temperature: ai.ai_temperature,
        })
    }

    async fn chat_json<T: DeserializeOwned>(
        &self,
        call: &'static str,
        system: &str,
        user: String,
    ) -> Result<T> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_completion_tokens": self.max_tokens,
            "temperature": self.temperature,
            "response_format": {"type": "json_object"}
        });

        let timer = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call language model API")?;
        let status = response.status();
        let body: Value = response.json().await.context("Failed to read language model response")?;
        metrics::histogram!("question_generation_duration_seconds", "call" => call)
            .record(timer.elapsed().as_secs_f64());

        if !status.is_success() {
            return Err(anyhow!("Language model API error ({status}): {body}"));
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing language model response content")?;

        tracing::debug!(
            call,
            model = %self.model,
            tokens_used = body.get("usage").and_then(|usage| usage.get("total_tokens")).and_then(serde_json::Value::as_u64),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Language model call finished"
        );

        serde_json::from_str(content)
            .with_context(|| format!("Language model returned unexpected {call} JSON"))
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiQuestionGenerator {
    async fn generate(&self, request: &QuestionsRequest) -> Result<QuestionsResponse> {
        let language = language_hint(request.language);

        let reply: QuestionsReply = self
            .chat_json(
                "questions",
                QUESTIONS_SYSTEM_PROMPT,
                format!(
                    "Generate exactly {} random {} multiple choice questions about \"{}\". \
                     Write every question, answer and option in {language}, at most 15 words each.",
                    request.amount,
                    request.difficulty.as_str(),
                    request.topic
                ),
            )
            .await?;

        let summary: SummaryReply = self
            .chat_json(
                "summary",
                SUMMARY_SYSTEM_PROMPT,
                format!("Summarize the following topic in {language}: {}", request.topic),
            )
            .await?;

        let response =
            QuestionsResponse { topic_summary: summary.topic_summary, questions: reply.questions };
        check_shape(&response, request.amount)?;
        Ok(response)
    }
}

fn language_hint(language: Language) -> &'static str {
    match language {
        Language::Auto => "the same language as the topic",
        Language::English => "English",
        Language::French => "French",
        Language::Arabic => "Arabic",
    }
}

fn check_shape(response: &QuestionsResponse, amount: u32) -> Result<()> {
    response.validate().context("Language model returned incomplete questions")?;
    if response.questions.len() != amount as usize {
        return Err(anyhow!(
            "Language model returned {} questions, expected {amount}",
            response.questions.len()
        ));
    }
    Ok(())
}
