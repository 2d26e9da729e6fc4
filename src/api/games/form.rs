use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::api::errors::ApiError;
use crate::api::validation::ValidationIssue;
use crate::db::types::Difficulty;
use crate::schemas::questions::{Language, MAX_QUESTIONS, MAX_TOPIC_CHARS, MIN_QUESTIONS};
use crate::services::document_text::DocumentKind;

const IMAGE_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];
const MISSING_SOURCE: &str = "Either topic or upload a image/doc file to extract text from";

pub(crate) const TOPIC_FIELD: &str = "topic";
pub(crate) const DOC_FIELD: &str = "topicDoc";
pub(crate) const IMAGE_FIELD: &str = "topicImage";

#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub(crate) content_type: Option<String>,
    /// Total bytes received, including any beyond the buffering cap.
    pub(crate) size: u64,
    pub(crate) bytes: Vec<u8>,
}

/// Multipart fields as received, before any validation.
#[derive(Debug, Default)]
pub(crate) struct RawQuizForm {
    pub(crate) topic: Option<String>,
    pub(crate) amount: Option<String>,
    pub(crate) difficulty: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) topic_doc: Option<UploadedFile>,
    pub(crate) topic_image: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub(crate) enum TopicInput {
    Text(String),
    Document { kind: DocumentKind, bytes: Vec<u8> },
    Image(Vec<u8>),
}

impl TopicInput {
    /// Form field the input came from, used to address issues found after extraction.
    pub(crate) fn field(&self) -> &'static str {
        match self {
            TopicInput::Text(_) => TOPIC_FIELD,
            TopicInput::Document { .. } => DOC_FIELD,
            TopicInput::Image(_) => IMAGE_FIELD,
        }
    }

    pub(crate) fn source_label(&self) -> &'static str {
        match self {
            TopicInput::Text(_) => "text",
            TopicInput::Document { .. } => "document",
            TopicInput::Image(_) => "image",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct QuizCreationForm {
    pub(crate) input: TopicInput,
    pub(crate) amount: u32,
    pub(crate) difficulty: Difficulty,
    pub(crate) language: Language,
}

impl RawQuizForm {
    /// Reads every part of the form. Files are buffered up to `max_file_bytes` plus one
    /// byte so oversize uploads can be reported without holding the whole body.
    pub(crate) async fn read(
        multipart: &mut Multipart,
        max_file_bytes: u64,
    ) -> Result<Self, ApiError> {
        let mut form = RawQuizForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|err| read_failure(err, "Invalid multipart data".to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                DOC_FIELD | IMAGE_FIELD => {
                    let content_type = field.content_type().map(|value| value.to_string());
                    let mut size = 0_u64;
                    let mut bytes = Vec::new();
                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|err| read_failure(err, "Failed to read file".to_string()))?
                    {
                        size += chunk.len() as u64;
                        if size <= max_file_bytes + 1 {
                            bytes.extend_from_slice(&chunk);
                        }
                    }

                    let file = (size > 0).then_some(UploadedFile { content_type, size, bytes });
                    if name == DOC_FIELD {
                        form.topic_doc = file;
                    } else {
                        form.topic_image = file;
                    }
                }
                TOPIC_FIELD | "amount" | "difficulty" | "language" => {
                    let text = field.text().await.map_err(|err| {
                        read_failure(err, format!("Field '{name}' is not valid text"))
                    })?;
                    let value = (!text.is_empty()).then_some(text);
                    match name.as_str() {
                        TOPIC_FIELD => form.topic = value,
                        "amount" => form.amount = value,
                        "difficulty" => form.difficulty = value,
                        _ => form.language = value,
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Checks every constraint and reports all violations together.
    pub(crate) fn validate(
        self,
        max_file_bytes: u64,
    ) -> Result<QuizCreationForm, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        if let Some(topic) = &self.topic {
            if topic.chars().count() > MAX_TOPIC_CHARS {
                issues.push(ValidationIssue::new(
                    "too_big",
                    &[TOPIC_FIELD],
                    format!("Topic must be at most {MAX_TOPIC_CHARS} characters long"),
                ));
            }
        }

        let amount = match self.amount.as_deref().map(str::trim) {
            None => {
                issues.push(ValidationIssue::new(
                    "invalid_type",
                    &["amount"],
                    "Amount is required",
                ));
                None
            }
            Some(raw) => match raw.parse::<u32>() {
                Ok(value) if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&value) => Some(value),
                Ok(_) => {
                    issues.push(ValidationIssue::custom(
                        &["amount"],
                        format!(
                            "Amount must be between {MIN_QUESTIONS} and {MAX_QUESTIONS} questions"
                        ),
                    ));
                    None
                }
                Err(_) => {
                    issues.push(ValidationIssue::new(
                        "invalid_type",
                        &["amount"],
                        "Amount must be a number",
                    ));
                    None
                }
            },
        };

        let language = match self.language.as_deref() {
            None => {
                issues.push(ValidationIssue::new(
                    "invalid_type",
                    &["language"],
                    "Language selection is required",
                ));
                None
            }
            Some(raw) => {
                let parsed = Language::parse(raw);
                if parsed.is_none() {
                    issues.push(ValidationIssue::new(
                        "invalid_enum_value",
                        &["language"],
                        format!(
                            "Invalid enum value. Expected 'auto' | 'english' | 'french' | 'arabic', received '{raw}'"
                        ),
                    ));
                }
                parsed
            }
        };

        let difficulty = match self.difficulty.as_deref() {
            None => {
                issues.push(ValidationIssue::new(
                    "invalid_type",
                    &["difficulty"],
                    "Question level is required",
                ));
                None
            }
            Some(raw) => {
                let parsed = Difficulty::parse(raw);
                if parsed.is_none() {
                    issues.push(ValidationIssue::new(
                        "invalid_enum_value",
                        &["difficulty"],
                        format!(
                            "Invalid enum value. Expected 'EASY' | 'MEDIUM' | 'HARD', received '{raw}'"
                        ),
                    ));
                }
                parsed
            }
        };

        let doc_kind = self.topic_doc.as_ref().and_then(|file| {
            check_size(file, DOC_FIELD, max_file_bytes, &mut issues);
            let kind = file.content_type.as_deref().and_then(DocumentKind::from_content_type);
            if kind.is_none() {
                issues.push(ValidationIssue::custom(
                    &[DOC_FIELD],
                    "Only PDF, DOC, or DOCX files are accepted for documents.",
                ));
            }
            kind
        });

        if let Some(file) = &self.topic_image {
            check_size(file, IMAGE_FIELD, max_file_bytes, &mut issues);
            let allowed = file
                .content_type
                .as_deref()
                .map(|value| value.trim().to_ascii_lowercase())
                .is_some_and(|value| IMAGE_CONTENT_TYPES.contains(&value.as_str()));
            if !allowed {
                issues.push(ValidationIssue::custom(
                    &[IMAGE_FIELD],
                    "Only PNG and JPEG images are accepted for images.",
                ));
            }
        }

        if self.topic.is_none() && self.topic_doc.is_none() && self.topic_image.is_none() {
            for field in [TOPIC_FIELD, IMAGE_FIELD, DOC_FIELD] {
                issues.push(ValidationIssue::custom(&[field], MISSING_SOURCE));
            }
        }

        let input = if let Some(image) = self.topic_image {
            Some(TopicInput::Image(image.bytes))
        } else if let (Some(doc), Some(kind)) = (self.topic_doc, doc_kind) {
            Some(TopicInput::Document { kind, bytes: doc.bytes })
        } else {
            self.topic.map(TopicInput::Text)
        };

        match (input, amount, difficulty, language) {
            (Some(input), Some(amount), Some(difficulty), Some(language)) if issues.is_empty() => {
                Ok(QuizCreationForm { input, amount, difficulty, language })
            }
            _ => Err(issues),
        }
    }
}

/// A body cut off by the request size limit is a 413; anything else is malformed input.
fn read_failure(err: MultipartError, message: String) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!(error = %err, "Multipart body exceeds the request limit");
        return ApiError::PayloadTooLarge("Request body is too large".to_string());
    }
    ApiError::BadRequest(message)
}

fn check_size(
    file: &UploadedFile,
    field: &str,
    max_file_bytes: u64,
    issues: &mut Vec<ValidationIssue>,
) {
    if file.size > max_file_bytes {
        issues.push(ValidationIssue::custom(
            &[field],
            format!("Max file size is {max_file_bytes} bytes."),
        ));
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::DefaultBodyLimit;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::{self, FormPart};

    const MAX: u64 = 500_000;

    fn base_form() -> RawQuizForm {
        RawQuizForm {
            amount: Some("5".to_string()),
            difficulty: Some("EASY".to_string()),
            language: Some("english".to_string()),
            ..RawQuizForm::default()
        }
    }

    fn file(content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            content_type: Some(content_type.to_string()),
            size: size as u64,
            bytes: vec![b'x'; size.min(MAX as usize + 1)],
        }
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<String> {
        issues.iter().map(|issue| issue.path.join(".")).collect()
    }

    #[test]
    fn text_topic_is_accepted() {
        let form = RawQuizForm { topic: Some("Volcanoes".to_string()), ..base_form() };
        let form = form.validate(MAX).expect("valid");

        assert_eq!(form.amount, 5);
        assert_eq!(form.difficulty, Difficulty::Easy);
        assert_eq!(form.language, Language::English);
        assert!(matches!(form.input, TopicInput::Text(ref topic) if topic == "Volcanoes"));
    }

    #[test]
    fn no_source_reports_all_three_fields() {
        let issues = base_form().validate(MAX).expect_err("missing source");

        assert_eq!(paths(&issues), vec!["topic", "topicImage", "topicDoc"]);
        assert!(issues.iter().all(|issue| issue.message == MISSING_SOURCE));
    }

    #[test]
    fn amount_out_of_range_is_rejected() {
        for amount in ["4", "16", "0"] {
            let form = RawQuizForm {
                topic: Some("Volcanoes".to_string()),
                amount: Some(amount.to_string()),
                ..base_form()
            };
            let issues = form.validate(MAX).expect_err("out of range");
            assert_eq!(paths(&issues), vec!["amount"]);
        }
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        for amount in ["5", "15"] {
            let form = RawQuizForm {
                topic: Some("Volcanoes".to_string()),
                amount: Some(amount.to_string()),
                ..base_form()
            };
            assert!(form.validate(MAX).is_ok());
        }
    }

    #[test]
    fn every_violation_is_reported_together() {
        let form = RawQuizForm {
            topic: Some("a".repeat(251)),
            amount: Some("many".to_string()),
            difficulty: Some("expert".to_string()),
            language: Some("klingon".to_string()),
            ..RawQuizForm::default()
        };
        let issues = form.validate(MAX).expect_err("invalid");
        assert_eq!(paths(&issues), vec!["topic", "amount", "language", "difficulty"]);
    }

    #[test]
    fn image_wins_over_document_and_text() {
        let form = RawQuizForm {
            topic: Some("typed".to_string()),
            topic_doc: Some(file("application/pdf", 10)),
            topic_image: Some(file("image/png", 10)),
            ..base_form()
        };
        let form = form.validate(MAX).expect("valid");
        assert!(matches!(form.input, TopicInput::Image(_)));
        assert_eq!(form.input.field(), IMAGE_FIELD);
    }

    #[test]
    fn document_wins_over_text() {
        let form = RawQuizForm {
            topic: Some("typed".to_string()),
            topic_doc: Some(file(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                10,
            )),
            ..base_form()
        };
        let form = form.validate(MAX).expect("valid");
        assert!(matches!(form.input, TopicInput::Document { kind: DocumentKind::Docx, .. }));
    }

    #[test]
    fn oversize_and_wrong_type_files_are_rejected() {
        let form = RawQuizForm {
            topic_doc: Some(file("text/plain", 10)),
            topic_image: Some(file("image/gif", MAX as usize + 10)),
            ..base_form()
        };
        let issues = form.validate(MAX).expect_err("invalid files");
        assert_eq!(paths(&issues), vec!["topicDoc", "topicImage", "topicImage"]);
    }

    #[test]
    fn lowercase_difficulty_is_rejected() {
        let form = RawQuizForm {
            topic: Some("Volcanoes".to_string()),
            difficulty: Some("easy".to_string()),
            ..base_form()
        };
        let issues = form.validate(MAX).expect_err("invalid");
        assert_eq!(paths(&issues), vec!["difficulty"]);
    }

    #[tokio::test]
    async fn body_over_the_request_limit_is_payload_too_large() {
        let app = Router::new()
            .route(
                "/upload",
                post(|mut multipart: Multipart| async move {
                    RawQuizForm::read(&mut multipart, 64).await.map(|_| StatusCode::OK)
                }),
            )
            .layer(DefaultBodyLimit::max(1024));

        let image = vec![0_u8; 8 * 1024];
        let parts = [
            FormPart::Text("amount", "5"),
            FormPart::File { name: IMAGE_FIELD, content_type: "image/png", bytes: &image },
        ];
        let response = app
            .oneshot(test_support::multipart_request("/upload", None, &parts))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = test_support::read_json(response).await;
        assert_eq!(body["status"], 413);
    }

    #[tokio::test]
    async fn file_over_the_field_cap_is_buffered_up_to_the_cap() {
        let app = Router::new().route(
            "/upload",
            post(|mut multipart: Multipart| async move {
                let form = RawQuizForm::read(&mut multipart, 64).await?;
                let file = form.topic_image.expect("image");
                assert_eq!(file.size, 200);
                assert_eq!(file.bytes.len(), 65);
                Ok::<_, ApiError>(StatusCode::OK)
            }),
        );

        let image = vec![7_u8; 200];
        let parts = [FormPart::File { name: IMAGE_FIELD, content_type: "image/png", bytes: &image }];
        let response = app
            .oneshot(test_support::multipart_request("/upload", None, &parts))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
