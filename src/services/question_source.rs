use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use validator::Validate;

use crate::core::config::Settings;
use crate::schemas::questions::{GeneratedQuestion, QuestionsRequest, QuestionsResponse};
use crate::services::topic_text::clamp_words;

pub(crate) const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

#[derive(Debug, Error)]
pub(crate) enum QuestionSourceError {
    #[error("question service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("question service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("question service returned a malformed response: {0}")]
    Malformed(String),
}

/// Where `POST /api/game` gets its questions from.
#[async_trait]
pub(crate) trait QuestionSource: Send + Sync {
    async fn fetch_questions(
        &self,
        request: &QuestionsRequest,
    ) -> Result<QuestionsResponse, QuestionSourceError>;
}

#[derive(Debug, Clone)]
pub(crate) struct HttpQuestionSource {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpQuestionSource {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let questions = settings.questions();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(questions.request_timeout))
            .build()
            .context("Failed to build question service HTTP client")?;

        Ok(Self::new(client, &questions.api_url, questions.api_token.clone()))
    }

    pub(crate) fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/questions", base_url.trim_end_matches('/')),
            token,
        }
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch_questions(
        &self,
        request: &QuestionsRequest,
    ) -> Result<QuestionsResponse, QuestionSourceError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.header(INTERNAL_TOKEN_HEADER, token);
        }

        tracing::info!(
            endpoint = %self.endpoint,
            amount = request.amount,
            difficulty = request.difficulty.as_str(),
            language = request.language.as_str(),
            "Requesting questions"
        );

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(QuestionSourceError::Status { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|err| QuestionSourceError::Malformed(err.to_string()))
    }
}

/// Questions that passed shape checks, with a summary ready to be stored as the game topic.
#[derive(Debug, Clone)]
pub(crate) struct SynthesizedQuiz {
    pub(crate) topic_summary: String,
    pub(crate) questions: Vec<GeneratedQuestion>,
}

pub(crate) fn into_quiz(
    response: QuestionsResponse,
    amount: u32,
    fallback_topic: &str,
) -> Result<SynthesizedQuiz, QuestionSourceError> {
    response.validate().map_err(|err| QuestionSourceError::Malformed(err.to_string()))?;

    if response.questions.len() != amount as usize {
        return Err(QuestionSourceError::Malformed(format!(
            "expected {amount} questions, got {}",
            response.questions.len()
        )));
    }

    for (index, question) in response.questions.iter().enumerate() {
        let answer = question.answer.trim();
        if question.distractors().iter().any(|option| option.trim() == answer) {
            return Err(QuestionSourceError::Malformed(format!(
                "question {index} repeats its answer among the distractors"
            )));
        }
    }

    let mut topic_summary = clamp_words(&response.topic_summary);
    if topic_summary.is_empty() {
        topic_summary = clamp_words(fallback_topic);
    }

    Ok(SynthesizedQuiz { topic_summary, questions: response.questions })
}
