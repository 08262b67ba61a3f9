//! End-to-end generation pipeline: topic → prompt → completion → post → sinks.
//!
//! Each run is sequential and independent: one remote call in flight at a
//! time, no shared state between rows, no retries. Batch mode records
//! per-row failures and keeps going.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use inkpress_llm::{GenerationClient, build_prompt};
use inkpress_post::{assemble, render_html, write_markdown};
use inkpress_shared::{PostInput, PostStatus, Result};
use inkpress_sheets::TopicSource;
use inkpress_wordpress::WordPressClient;

// ---------------------------------------------------------------------------
// Options & results
// ---------------------------------------------------------------------------

/// Runtime options for a pipeline instance — explicit state passed in at
/// construction, not process-wide globals.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Model identifier for generation calls.
    pub model: String,
    /// Directory receiving one markdown file per post.
    pub output_dir: PathBuf,
    /// Status for published posts.
    pub status: PostStatus,
}

/// Result of one single/custom pipeline run.
///
/// The file sink runs before the publish sink, so a publish failure still
/// leaves a written file; `publish_error` records it without discarding the
/// generation success.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    /// Final post title.
    pub title: String,
    /// Slug the output file is named after.
    pub slug: String,
    /// Path of the written markdown file.
    pub file_path: PathBuf,
    /// Remote post id when publishing succeeded.
    pub remote_id: Option<u64>,
    /// Publish failure, when publishing was attempted and failed.
    pub publish_error: Option<String>,
}

impl PostOutcome {
    /// True when the post was generated but a requested publish failed.
    pub fn generated_not_published(&self) -> bool {
        self.publish_error.is_some()
    }
}

/// One recorded failure from a batch run.
#[derive(Debug, Clone)]
pub struct RowFailure {
    /// 1-based row index.
    pub index: u32,
    /// Topic title, for reporting.
    pub title: String,
    /// Rendered error message.
    pub error: String,
}

/// Aggregate result of a batch run. Never produced by an early abort: every
/// row is attempted exactly once.
#[derive(Debug)]
pub struct BatchSummary {
    /// Rows attempted (all rows in the sheet).
    pub attempted: usize,
    /// Rows that produced a markdown file.
    pub generated: usize,
    /// Rows that were also published.
    pub published: usize,
    /// Per-row failures, in row order.
    pub failures: Vec<RowFailure>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a batch row starts.
    fn row_started(&self, index: u32, title: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn row_started(&self, _index: u32, _title: &str, _current: usize, _total: usize) {}
    fn done(&self) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The content-generation pipeline.
pub struct Pipeline {
    source: TopicSource,
    generator: GenerationClient,
    publisher: Option<WordPressClient>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Build a pipeline from its collaborators. `publisher: None` means
    /// markdown-only mode.
    pub fn new(
        source: TopicSource,
        generator: GenerationClient,
        publisher: Option<WordPressClient>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            generator,
            publisher,
            options,
        }
    }

    /// The topic source, for listing without running a generation.
    pub fn source(&self) -> &TopicSource {
        &self.source
    }

    /// Whether publishing is enabled for this pipeline.
    pub fn publishing_enabled(&self) -> bool {
        self.publisher.is_some()
    }

    /// Run the pipeline for one spreadsheet row.
    #[instrument(skip(self))]
    pub async fn run_row(&self, index: u32) -> Result<PostOutcome> {
        let row = self.source.get_topic(index).await?;
        info!(index, title = %row.title, "generating post for row");
        self.run_input(PostInput::FromRow(row)).await
    }

    /// Run the pipeline for a free-form custom title.
    #[instrument(skip(self))]
    pub async fn run_custom(&self, title: &str) -> Result<PostOutcome> {
        info!(title, "generating custom post");
        self.run_input(PostInput::FromTitle(title.to_string())).await
    }

    /// Run the pipeline for every row in sheet order, isolating per-row
    /// failures. Returns an error only when the sheet itself cannot be read.
    #[instrument(skip_all)]
    pub async fn run_all(&self, progress: &dyn ProgressReporter) -> Result<BatchSummary> {
        let start = Instant::now();

        progress.phase("Loading topics");
        let topics = self.source.list_topics().await?;
        let total = topics.len();

        let mut summary = BatchSummary {
            attempted: total,
            generated: 0,
            published: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        };

        for (i, row) in topics.into_iter().enumerate() {
            progress.row_started(row.index, &row.title, i + 1, total);
            let index = row.index;
            let title = row.title.clone();

            match self.run_input(PostInput::FromRow(row)).await {
                Ok(outcome) => {
                    summary.generated += 1;
                    if outcome.remote_id.is_some() {
                        summary.published += 1;
                    }
                    if let Some(publish_error) = outcome.publish_error {
                        warn!(index, error = %publish_error, "generated but not published");
                    }
                }
                Err(e) => {
                    warn!(index, title = %title, error = %e, "row failed, continuing");
                    summary.failures.push(RowFailure {
                        index,
                        title,
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.elapsed = start.elapsed();
        progress.done();

        info!(
            attempted = summary.attempted,
            generated = summary.generated,
            published = summary.published,
            failed = summary.failures.len(),
            elapsed_ms = summary.elapsed.as_millis(),
            "batch complete"
        );

        Ok(summary)
    }

    /// The shared single-item pipeline: prompt → generate → assemble → file
    /// sink → optional publish sink.
    async fn run_input(&self, input: PostInput) -> Result<PostOutcome> {
        let prompt = build_prompt(&input, &self.options.model);
        let raw = self.generator.generate(&prompt).await?;
        let post = assemble(&raw, &input)?;
        let file_path = write_markdown(&post, &self.options.output_dir)?;

        let (remote_id, publish_error) = match &self.publisher {
            None => (None, None),
            Some(wordpress) => {
                let html = render_html(&post.body);
                match wordpress.publish(&post, self.options.status, &html).await {
                    Ok(id) => (Some(id), None),
                    Err(e) => {
                        warn!(slug = %post.slug, error = %e, "publish failed after file write");
                        (None, Some(e.to_string()))
                    }
                }
            }
        };

        Ok(PostOutcome {
            title: post.title,
            slug: post.slug,
            file_path,
            remote_id,
            publish_error,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_shared::{InkpressError, OpenRouterConfig, SheetsConfig, WordPressConfig};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHEET_PATH: &str = "/v4/spreadsheets/sheet-1/values/A2:C";

    fn set_test_secrets() {
        // SAFETY: test-only env mutation with fixed test variable names.
        unsafe {
            std::env::set_var("INKPRESS_CORE_TEST_SHEETS_KEY", "k");
            std::env::set_var("INKPRESS_CORE_TEST_LLM_KEY", "k");
            std::env::set_var("INKPRESS_CORE_TEST_WP_PASSWORD", "k");
        }
    }

    fn topic_source(base_url: &str) -> TopicSource {
        TopicSource::new(&SheetsConfig {
            spreadsheet_id: "sheet-1".into(),
            range: "A2:C".into(),
            api_key_env: "INKPRESS_CORE_TEST_SHEETS_KEY".into(),
            base_url: base_url.into(),
        })
        .unwrap()
    }

    fn generation_client(base_url: &str) -> GenerationClient {
        GenerationClient::new(&OpenRouterConfig {
            api_key_env: "INKPRESS_CORE_TEST_LLM_KEY".into(),
            default_model: "test-model".into(),
            base_url: base_url.into(),
            timeout_secs: 10,
        })
        .unwrap()
    }

    fn wordpress_client(base_url: &str) -> WordPressClient {
        WordPressClient::new(&WordPressConfig {
            base_url: base_url.into(),
            username: "editor".into(),
            app_password_env: "INKPRESS_CORE_TEST_WP_PASSWORD".into(),
        })
        .unwrap()
    }

    fn options(tag: &str) -> PipelineOptions {
        PipelineOptions {
            model: "test-model".into(),
            output_dir: std::env::temp_dir()
                .join(format!("inkpress-pipeline-{tag}-{}", std::process::id())),
            status: PostStatus::Draft,
        }
    }

    async fn mount_sheet(server: &MockServer, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(SHEET_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "values": rows })),
            )
            .mount(server)
            .await;
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "test-model",
            "choices": [{ "message": { "role": "assistant", "content": text } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 20 }
        })
    }

    #[tokio::test]
    async fn single_row_end_to_end() {
        set_test_secrets();
        let server = MockServer::start().await;

        mount_sheet(&server, serde_json::json!([["AI", "2025", "AI Trends"]])).await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("# AI Trends\n\nBody text.")),
            )
            .mount(&server)
            .await;

        let opts = options("single");
        let out_dir = opts.output_dir.clone();
        let pipeline = Pipeline::new(
            topic_source(&server.uri()),
            generation_client(&server.uri()),
            None,
            opts,
        );

        let outcome = pipeline.run_row(1).await.unwrap();
        assert_eq!(outcome.title, "AI Trends");
        assert_eq!(outcome.slug, "ai-trends");
        assert!(outcome.remote_id.is_none());
        assert!(!outcome.generated_not_published());

        let content = std::fs::read_to_string(&outcome.file_path).unwrap();
        assert!(content.contains("# AI Trends"));
        assert!(content.contains("Body text."));

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[tokio::test]
    async fn empty_generation_writes_nothing_and_publishes_nothing() {
        set_test_secrets();
        let server = MockServer::start().await;

        mount_sheet(&server, serde_json::json!([["AI", "2025", "AI Trends"]])).await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "model": "m", "choices": [] })),
            )
            .mount(&server)
            .await;

        // Any publish call would hit this mock; expect(0) asserts none does.
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
            .expect(0)
            .mount(&server)
            .await;

        let opts = options("empty");
        let out_dir = opts.output_dir.clone();
        let pipeline = Pipeline::new(
            topic_source(&server.uri()),
            generation_client(&server.uri()),
            Some(wordpress_client(&server.uri())),
            opts,
        );

        let err = pipeline.run_row(1).await.unwrap_err();
        assert!(matches!(err, InkpressError::Generation(_)));
        assert!(!out_dir.exists());
    }

    #[tokio::test]
    async fn publish_rejection_is_generated_not_published() {
        set_test_secrets();
        let server = MockServer::start().await;

        mount_sheet(&server, serde_json::json!([["AI", "2025", "AI Trends"]])).await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("# AI Trends\n\nBody text.")),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({ "code": "rest_invalid_param", "message": "bad payload" }),
            ))
            .mount(&server)
            .await;

        let opts = options("pubfail");
        let out_dir = opts.output_dir.clone();
        let pipeline = Pipeline::new(
            topic_source(&server.uri()),
            generation_client(&server.uri()),
            Some(wordpress_client(&server.uri())),
            opts,
        );

        let outcome = pipeline.run_row(1).await.unwrap();
        // File sink ran before the publish sink
        assert!(outcome.file_path.exists());
        assert!(outcome.generated_not_published());
        assert!(outcome.remote_id.is_none());
        assert!(outcome.publish_error.unwrap().contains("bad payload"));

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        set_test_secrets();
        let server = MockServer::start().await;

        mount_sheet(
            &server,
            serde_json::json!([
                ["AI", "2025", "AI Trends"],
                ["fail", "fail", "Doomed Topic"],
                ["rust", "cli", "Rust CLI Tools"]
            ]),
        )
        .await;

        // Row 2's prompt gets an empty completion; the others succeed.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {},
                    { "content": build_prompt(
                        &PostInput::FromRow(inkpress_shared::TopicRow {
                            index: 2,
                            primary_keywords: vec!["fail".into()],
                            auxiliary_keywords: vec!["fail".into()],
                            title: "Doomed Topic".into(),
                        }),
                        "test-model",
                    ).user }
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "model": "m", "choices": [] })),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("# Generated\n\nBody text.")),
            )
            .mount(&server)
            .await;

        let opts = options("batch");
        let out_dir = opts.output_dir.clone();
        let pipeline = Pipeline::new(
            topic_source(&server.uri()),
            generation_client(&server.uri()),
            None,
            opts,
        );

        let summary = pipeline.run_all(&SilentProgress).await.unwrap();
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.generated, 2);
        assert_eq!(summary.published, 0);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].index, 2);
        assert_eq!(summary.failures[0].title, "Doomed Topic");

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[tokio::test]
    async fn custom_title_skips_the_sheet() {
        set_test_secrets();
        let server = MockServer::start().await;

        // No sheet mock mounted: a sheet read would 404 and fail the run.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("# Rust Async Patterns\n\nBody.")),
            )
            .mount(&server)
            .await;

        let opts = options("custom");
        let out_dir = opts.output_dir.clone();
        let pipeline = Pipeline::new(
            topic_source(&server.uri()),
            generation_client(&server.uri()),
            None,
            opts,
        );

        let outcome = pipeline.run_custom("Rust Async Patterns").await.unwrap();
        assert_eq!(outcome.slug, "rust-async-patterns");

        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
