use anyhow::{Context, Result};
use clap::Parser;
use seeker_common::observability::{LogConfig, init_logging};
use seeker_common::{BrowserName, ValidationError};
use seeker_config::invocation::INPUT_VAR;
use seeker_config::{Invocation, RawInvocation, SeekerConfigLoader, SeekerSettings};
use seeker_runtime::SeekerRuntime;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
mod tether;

/// Answer a question from live web search results.
#[derive(Parser, Debug)]
#[command(name = "seeker", version)]
struct Cli {
    /// JSON object with a `question` field.
    #[arg(long, env = "GPTSCRIPT_INPUT", hide_env_values = true)]
    input: Option<String>,

    #[arg(long, env = "GPTSCRIPT_WORKSPACE_ID")]
    workspace_id: Option<String>,

    /// The browser session is persisted under this directory.
    #[arg(long, env = "GPTSCRIPT_WORKSPACE_DIR")]
    workspace_dir: Option<String>,

    /// chrome, firefox or edge.
    #[arg(long, env = "GPTSCRIPT_INSTALLED_BROWSER")]
    browser: Option<String>,

    /// Settings file (YAML or TOML). Defaults to the user config directory.
    #[arg(long, env = "SEEKER_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn raw_invocation(&self) -> RawInvocation {
        RawInvocation {
            input: self.input.clone(),
            workspace_id: self.workspace_id.clone(),
            workspace_dir: self.workspace_dir.clone(),
            browser: self.browser.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // SAFETY: no other threads exist yet. Browser drivers launched later
    // must not inherit the caller's input.
    unsafe { std::env::remove_var(INPUT_VAR) };

    let invocation = match cli.raw_invocation().validate() {
        Ok(invocation) => invocation,
        Err(e) => {
            report_invalid(&e);
            return ExitCode::FAILURE;
        }
    };

    match run(invocation, cli.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn report_invalid(err: &ValidationError) {
    println!("error: {err}");
    if matches!(err, ValidationError::InvalidBrowser(_)) {
        println!("valid browsers: {}", BrowserName::valid_names());
    }
}

fn load_settings(path: Option<&Path>) -> Result<SeekerSettings> {
    let loader = match path {
        Some(p) => SeekerConfigLoader::new().with_file(p),
        None => SeekerConfigLoader::new().with_default_location(),
    };
    loader.load().context("failed to load settings")
}

fn run(invocation: Invocation, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let log_path = init_logging(LogConfig {
        app_name: "seeker",
        log_dir: settings.logging.dir.clone(),
        emit_stderr: settings.logging.emit_stderr,
        format: settings.logging.format,
        default_filter: "info",
    })?;
    tracing::info!(
        workspace = %invocation.workspace_id,
        browser = %invocation.browser,
        log = %log_path.display(),
        "seeker starting"
    );

    execute(&invocation, settings).inspect_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "run failed");
    })
}

/// Everything after logging is up.
fn execute(invocation: &Invocation, settings: SeekerSettings) -> Result<()> {
    let request = invocation.to_run_request();
    let runtime = SeekerRuntime::build("seeker")?;
    let result = runtime.run_until_ctrl_c(|cancel| async move {
        let pipeline = tether::build_pipeline(&settings).await?;
        let mut stdout = tokio::io::stdout();
        let outcome = pipeline.run(&request, &mut stdout, &cancel).await?;
        stdout.flush().await?;
        Ok::<_, anyhow::Error>(outcome)
    });
    runtime.shutdown(Duration::from_secs(2));

    let outcome = result?;
    tracing::info!(
        answer_bytes = outcome.answer.len(),
        emitted_bytes = outcome.emitted.len(),
        release_warnings = outcome.release_warnings,
        "run complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_feed_the_invocation() {
        let cli = Cli::try_parse_from([
            "seeker",
            "--input",
            r#"{"question":"why?"}"#,
            "--workspace-id",
            "ws",
            "--workspace-dir",
            "/tmp/ws",
            "--browser",
            "FIREFOX",
        ])
        .unwrap();
        let invocation = cli.raw_invocation().validate().unwrap();
        assert_eq!(invocation.browser, BrowserName::Firefox);
        assert_eq!(invocation.session_dir(), PathBuf::from("/tmp/ws/browser_session"));
    }

    #[test]
    fn settings_failure_is_returned_before_logging_starts() {
        let invocation = RawInvocation {
            input: Some(r#"{"question":"why?"}"#.into()),
            workspace_id: Some("ws".into()),
            workspace_dir: Some("/tmp/ws".into()),
            browser: None,
        }
        .validate()
        .unwrap();

        let err = run(invocation, Some(Path::new("/nonexistent/seeker.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load settings"));
    }
}
