use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use crate::core::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub(crate) fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/msword" => Some(Self::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/wps-office.docx" => Some(Self::Docx),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }
}

#[async_trait]
pub(crate) trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, kind: DocumentKind, bytes: &[u8]) -> Result<String>;
}

/// Extracts text with poppler's `pdftotext` and a headless LibreOffice conversion.
#[derive(Debug, Clone)]
pub(crate) struct CommandDocumentExtractor {
    pdftotext_bin: String,
    libreoffice_bin: String,
    timeout: Duration,
}

impl CommandDocumentExtractor {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        let extraction = settings.extraction();
        Self {
            pdftotext_bin: extraction.pdftotext_bin.clone(),
            libreoffice_bin: extraction.libreoffice_bin.clone(),
            timeout: Duration::from_secs(extraction.timeout_seconds),
        }
    }

    async fn pdf_to_text(&self, input: &Path) -> Result<String> {
        let mut command = Command::new(&self.pdftotext_bin);
        command.arg("-q").arg("-enc").arg("UTF-8").arg(input).arg("-");
        let stdout = self.run(command, "pdftotext").await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Each conversion gets its own user profile inside `workdir`, so concurrent runs never
    /// share a profile lock or hand off to another running instance.
    fn office_command(&self, input: &Path, workdir: &Path) -> Command {
        let mut command = Command::new(&self.libreoffice_bin);
        command
            .arg(format!("-env:UserInstallation=file://{}", workdir.join("lo_profile").display()))
            .arg("--headless")
            .arg("--norestore")
            .arg("--convert-to")
            .arg("txt:Text")
            .arg("--outdir")
            .arg(workdir)
            .arg(input);
        command
    }

    async fn office_to_text(&self, input: &Path, workdir: &Path) -> Result<String> {
        self.run(self.office_command(input, workdir), "libreoffice").await?;

        let output = input.with_extension("txt");
        let bytes = fs::read(&output)
            .await
            .with_context(|| format!("LibreOffice produced no text output at {}", output.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn run(&self, mut command: Command, tool: &str) -> Result<Vec<u8>> {
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| anyhow!("{tool} timed out after {}s", self.timeout.as_secs()))?
            .with_context(|| format!("Failed to run {tool}"))?;

        if !output.status.success() {
            return Err(anyhow!(
                "{tool} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl DocumentExtractor for CommandDocumentExtractor {
    async fn extract_text(&self, kind: DocumentKind, bytes: &[u8]) -> Result<String> {
        let workdir = scratch_dir();
        fs::create_dir_all(&workdir).await.context("Failed to create extraction directory")?;

        let input = workdir.join(format!("input.{}", kind.extension()));
        let result = match fs::write(&input, bytes).await {
            Ok(()) => match kind {
                DocumentKind::Pdf => self.pdf_to_text(&input).await,
                DocumentKind::Doc | DocumentKind::Docx => {
                    self.office_to_text(&input, &workdir).await
                }
            },
            Err(err) => Err(anyhow!(err).context("Failed to stage uploaded document")),
        };

        if let Err(err) = fs::remove_dir_all(&workdir).await {
            tracing::warn!(error = %err, path = %workdir.display(), "Failed to remove extraction directory");
        }

        let text = result?;
        tracing::debug!(?kind, size = bytes.len(), chars = text.chars().count(), "Document text extracted");
        Ok(text)
    }
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("quizgen_doc_{}", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_map_to_kinds() {
        assert_eq!(DocumentKind::from_content_type("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_content_type("application/msword"), Some(DocumentKind::Doc));
        assert_eq!(
            DocumentKind::from_content_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_content_type("application/wps-office.docx"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_content_type("text/plain"), None);
    }

    fn missing_tools() -> CommandDocumentExtractor {
        CommandDocumentExtractor {
            pdftotext_bin: "/nonexistent/pdftotext".to_string(),
            libreoffice_bin: "/nonexistent/libreoffice".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn office_runs_use_a_profile_inside_their_scratch_dir() {
        let extractor = missing_tools();
        let first_dir = scratch_dir();
        let second_dir = scratch_dir();

        let args = |workdir: &Path| -> Vec<String> {
            extractor
                .office_command(&workdir.join("input.docx"), workdir)
                .as_std()
                .get_args()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect()
        };
        let first = args(&first_dir);
        let second = args(&second_dir);

        let profile =
            format!("-env:UserInstallation=file://{}", first_dir.join("lo_profile").display());
        assert_eq!(first[0], profile);
        assert!(first.iter().any(|arg| arg == "--headless"));
        assert_ne!(first[0], second[0]);
    }

    #[tokio::test]
    async fn missing_binary_is_an_error_and_cleans_up() {
        let extractor = missing_tools();

        let err = extractor
            .extract_text(DocumentKind::Pdf, b"%PDF-1.4")
            .await
            .expect_err("binary is missing");
        assert!(format!("{err:#}").contains("pdftotext"));
    }
}
