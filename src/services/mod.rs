pub(crate) mod document_text;
pub(crate) mod ocr;
pub(crate) mod option_shuffle;
pub(crate) mod question_generator;
pub(crate) mod question_source;
pub(crate) mod quiz_builder;
pub(crate) mod topic_text;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::config::Settings;
use document_text::{CommandDocumentExtractor, DocumentExtractor};
use ocr::OcrPool;
use question_generator::{OpenAiQuestionGenerator, QuestionGenerator};
use question_source::{HttpQuestionSource, QuestionSource};

/// External collaborators shared by the request handlers.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) documents: Arc<dyn DocumentExtractor>,
    pub(crate) ocr: OcrPool,
    pub(crate) questions: Arc<dyn QuestionSource>,
    pub(crate) generator: Arc<dyn QuestionGenerator>,
}

impl Services {
    pub(crate) async fn from_settings(settings: &Settings) -> Result<Self> {
        let ocr = OcrPool::from_settings(settings).await.context("Failed to start OCR workers")?;

        Ok(Self {
            documents: Arc::new(CommandDocumentExtractor::from_settings(settings)),
            ocr,
            questions: Arc::new(HttpQuestionSource::from_settings(settings)?),
            generator: Arc::new(OpenAiQuestionGenerator::from_settings(settings)?),
        })
    }
}
