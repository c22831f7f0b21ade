//! Sequences one question-to-answer run.
//!
//! Setup joins query derivation with the acquisition of both browser
//! contexts. Search runs once all three are ready; the contexts are then
//! handed to background release tasks while the answer streams, and those
//! tasks are awaited before the run returns.
use crate::filter::{IncrementalFilter, HEADING_MARKER};
use crate::prompt::compose_prompt;
use crate::traits::{AnswerGenerator, BrowserSession, ContextProvider, QueryDeriver, Searcher};
use futures::StreamExt;
use seeker_common::{Result, RunRequest, ScriptMode, SeekerError, ValidationError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

const SCRIPTABLE: &str = "scriptable";
const SCRIPT_DISABLED: &str = "script-disabled";

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The generator's final text.
    pub answer: String,
    /// Everything written to the caller's sink, in order.
    pub emitted: String,
    /// Browser contexts whose release failed.
    pub release_warnings: usize,
}

/// Background releases of browser contexts.
#[derive(Default)]
struct ReleaseSet {
    pending: Vec<(&'static str, JoinHandle<Result<()>>)>,
}

impl ReleaseSet {
    fn spawn<C: BrowserSession>(&mut self, label: &'static str, context: C) {
        debug!(target: "browser.context", context = label, "releasing browser context");
        self.pending.push((label, tokio::spawn(context.release())));
    }

    /// Wait for every release; returns how many failed.
    async fn join(self) -> usize {
        let mut failed = 0;
        for (label, handle) in self.pending {
            match handle.await {
                Ok(Ok(())) => debug!(target: "browser.context", context = label, "browser context released"),
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(target: "browser.context", context = label, error = %e, "failed to release browser context");
                }
                Err(e) => {
                    failed += 1;
                    warn!(target: "browser.context", context = label, error = %e, "release task did not complete");
                }
            }
        }
        failed
    }
}

/// Drives the collaborators for one question.
pub struct Pipeline<Q, P, S, G> {
    deriver: Q,
    provider: P,
    searcher: S,
    generator: G,
}

impl<Q, P, S, G> Pipeline<Q, P, S, G>
where
    Q: QueryDeriver,
    P: ContextProvider,
    S: Searcher<P::Context>,
    G: AnswerGenerator,
{
    pub fn new(deriver: Q, provider: P, searcher: S, generator: G) -> Self {
        Self {
            deriver,
            provider,
            searcher,
            generator,
        }
    }

    /// Answer `request.question()`, writing the settled part of the answer
    /// to `out` as it streams in.
    ///
    /// Both browser contexts are released before this returns, whatever the
    /// outcome. A failed release is logged and counted, never returned.
    pub async fn run<W>(
        &self,
        request: &RunRequest,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if request.question().trim().is_empty() {
            return Err(ValidationError::MissingQuestion.into());
        }
        let span = info_span!(
            target: "pipeline",
            "run",
            run_id = %Uuid::new_v4(),
            browser = %request.browser(),
        );
        self.run_inner(request, out, cancel).instrument(span).await
    }

    async fn run_inner<W>(
        &self,
        request: &RunRequest,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if cancel.is_cancelled() {
            return Err(SeekerError::Cancelled);
        }
        let browser = request.browser();
        let no_script_dir = request.no_script_session_dir();

        info!(target: "pipeline.setup", session_dir = %request.session_dir().display(), "starting setup");
        let (query, context, no_script) = tokio::join!(
            self.deriver.derive_query(request.question()),
            self.provider
                .acquire_context(browser, request.session_dir(), ScriptMode::Enabled),
            self.provider
                .acquire_context(browser, &no_script_dir, ScriptMode::Disabled),
        );
        let (query, context, no_script) = match (query, context, no_script) {
            (Ok(q), Ok(c), Ok(n)) => (q, c, n),
            (query, context, no_script) => {
                return Err(abort_setup(query.err(), context, no_script).await);
            }
        };
        info!(target: "pipeline.setup", query = %query, "setup complete");

        let searched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SeekerError::Cancelled),
            r = self.searcher.search(browser, &context, &no_script, &query) => r,
        };

        let mut releases = ReleaseSet::default();
        releases.spawn(SCRIPTABLE, context);
        releases.spawn(SCRIPT_DISABLED, no_script);

        let page_contents = match searched {
            Ok(p) => p,
            Err(e) => {
                releases.join().await;
                return Err(e);
            }
        };
        info!(target: "pipeline.search", bytes = page_contents.len(), "search complete");

        let prompt = compose_prompt(request.question(), &page_contents);
        let streamed = self.stream_answer(&prompt, out, cancel).await;
        let release_warnings = releases.join().await;
        let (answer, emitted) = streamed?;

        Ok(RunOutcome {
            answer,
            emitted,
            release_warnings,
        })
    }

    /// Consume the generator's snapshots through the filter. Returns the
    /// final text and what was written.
    async fn stream_answer<W>(
        &self,
        prompt: &str,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<(String, String)>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut stream = self.generator.stream_answer(prompt).await?;
        let mut filter = IncrementalFilter::new();
        let mut last: Option<String> = None;
        let (mut received, mut dropped) = (0usize, 0usize);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SeekerError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = chunk?;
            received += 1;

            match filter.accept(&chunk) {
                Some(suffix) => {
                    if !suffix.is_empty() {
                        out.write_all(suffix.as_bytes()).await?;
                        out.flush().await?;
                    }
                }
                None => {
                    dropped += 1;
                    trace!(target: "pipeline.stream", len = chunk.len(), "snapshot dropped");
                }
            }
            last = Some(chunk);
        }

        let Some(answer) = last else {
            return Err(SeekerError::Generation(
                "answer stream ended without output".to_string(),
            ));
        };

        if filter.emitted() != answer {
            warn!(
                target: "pipeline.stream",
                emitted = filter.emitted().len(),
                final_len = answer.len(),
                has_heading = answer.contains(HEADING_MARKER),
                "final answer was not fully shown"
            );
        }

        info!(target: "pipeline.stream", received, dropped, "answer complete");
        Ok((answer, filter.emitted().to_string()))
    }
}

/// Release whatever setup acquired and pick the error to surface: the
/// first failure in the order query, scriptable, script-disabled.
async fn abort_setup<C: BrowserSession>(
    query_err: Option<SeekerError>,
    context: Result<C>,
    no_script: Result<C>,
) -> SeekerError {
    let mut failures: Vec<(&'static str, SeekerError)> = Vec::new();
    failures.extend(query_err.map(|e| ("query", e)));

    let mut releases = ReleaseSet::default();
    match context {
        Ok(c) => releases.spawn(SCRIPTABLE, c),
        Err(e) => failures.push((SCRIPTABLE, e)),
    }
    match no_script {
        Ok(c) => releases.spawn(SCRIPT_DISABLED, c),
        Err(e) => failures.push((SCRIPT_DISABLED, e)),
    }
    releases.join().await;

    let mut failures = failures.into_iter();
    let Some((stage, first)) = failures.next() else {
        return SeekerError::Context("setup failed without a cause".to_string());
    };
    for (other, e) in failures {
        warn!(target: "pipeline.setup", stage = other, error = %e, "additional setup failure");
    }
    warn!(target: "pipeline.setup", stage, error = %first, "setup failed");
    first
}
