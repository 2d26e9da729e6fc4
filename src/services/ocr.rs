use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum OcrError {
    #[error("OCR queue is full")]
    QueueFull,
    #[error("OCR pool is shut down")]
    Closed,
    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// One recognizer instance. A worker calls `load` once and then reuses the engine for
/// every job it takes off the queue.
#[async_trait]
pub(crate) trait OcrEngine: Send + 'static {
    async fn load(&mut self) -> anyhow::Result<()>;
    async fn recognize(&mut self, image: &[u8]) -> anyhow::Result<String>;
}

struct OcrJob {
    image: Vec<u8>,
    reply: oneshot::Sender<Result<String, OcrError>>,
}

/// Handle to a fixed set of OCR workers fed by a bounded queue.
/// Workers stop once every handle has been dropped.
#[derive(Clone)]
pub(crate) struct OcrPool {
    sender: mpsc::Sender<OcrJob>,
}

impl OcrPool {
    pub(crate) async fn from_settings(settings: &Settings) -> Result<Self, OcrError> {
        let ocr = settings.ocr();
        let binary = ocr.tesseract_bin.clone();
        let languages = ocr.languages.clone();
        let timeout = Duration::from_secs(ocr.timeout_seconds);

        Self::start(ocr.workers, ocr.queue_capacity, |_| {
            TesseractEngine::new(binary.clone(), languages.clone(), timeout)
        })
        .await
    }

    pub(crate) async fn start<E, F>(
        workers: usize,
        queue_capacity: usize,
        mut factory: F,
    ) -> Result<Self, OcrError>
    where
        E: OcrEngine,
        F: FnMut(usize) -> E,
    {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let queue = Arc::new(Mutex::new(receiver));

        let mut engines = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let mut engine = factory(worker_id);
            engine.load().await.map_err(|err| OcrError::Engine(format!("{err:#}")))?;
            engines.push(engine);
        }

        for (worker_id, engine) in engines.into_iter().enumerate() {
            tokio::spawn(worker_loop(worker_id, engine, queue.clone()));
        }

        tracing::info!(workers, queue_capacity, "OCR worker pool started");
        Ok(Self { sender })
    }

    /// Queues the image and waits for its text. Fails fast when the queue is full.
    pub(crate) async fn recognize(&self, image: Vec<u8>) -> Result<String, OcrError> {
        let (reply, response) = oneshot::channel();
        self.sender.try_send(OcrJob { image, reply }).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => OcrError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => OcrError::Closed,
        })?;

        response.await.map_err(|_| OcrError::Closed)?
    }

    #[cfg(test)]
    pub(crate) fn free_slots(&self) -> usize {
        self.sender.capacity()
    }
}

async fn worker_loop<E: OcrEngine>(
    worker_id: usize,
    mut engine: E,
    queue: Arc<Mutex<mpsc::Receiver<OcrJob>>>,
) {
    loop {
        let job = {
            let mut queue = queue.lock().await;
            queue.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let result = engine
            .recognize(&job.image)
            .await
            .map_err(|err| OcrError::Engine(format!("{err:#}")));

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => {
                tracing::warn!(worker_id, error = %err, "OCR job failed");
                "error"
            }
        };
        metrics::counter!("ocr_jobs_total", "outcome" => outcome).increment(1);

        if job.reply.send(result).is_err() {
            tracing::debug!(worker_id, "OCR caller dropped before the result was ready");
        }
    }

    tracing::debug!(worker_id, "OCR worker stopped");
}

/// Runs the `tesseract` CLI, feeding the image on stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub(crate) struct TesseractEngine {
    binary: String,
    languages: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub(crate) fn new(binary: String, languages: String, timeout: Duration) -> Self {
        Self { binary, languages, timeout }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn load(&mut self) -> anyhow::Result<()> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            return Err(anyhow!("{} --version exited with {}", self.binary, output.status));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(
            version = version.lines().next().unwrap_or_default(),
            languages = %self.languages,
            "Tesseract engine loaded"
        );
        Ok(())
    }

    async fn recognize(&mut self, image: &[u8]) -> anyhow::Result<String> {
        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary))?;

        let run = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(image).await.context("Failed to send image to tesseract")?;
            }
            child.wait_with_output().await.context("Failed to wait for tesseract")
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| anyhow!("tesseract timed out after {}s", self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(anyhow!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
