use super::behavioral::BehavioralEngine;
use super::capabilities::{build_capabilities, ContextOptions};
use super::context::BrowserContext;
use super::fingerprint::UserAgentManager;
use async_trait::async_trait;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::ClientBuilder;
use seeker_common::{BrowserName, Result, ScriptMode, SeekerError, StealthLevel};
use seeker_config::{BrowserSettings, WebDriverEndpoints};
use seeker_pipeline::ContextProvider;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Launches contexts against per-browser WebDriver services.
pub struct WebDriverContextProvider {
    endpoints: WebDriverEndpoints,
    headless: bool,
    stealth: StealthLevel,
    page_load_timeout: Duration,
    user_agents: Mutex<UserAgentManager>,
}

impl WebDriverContextProvider {
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self {
            endpoints: settings.webdriver.clone(),
            headless: settings.headless,
            stealth: settings.stealth,
            page_load_timeout: settings.page_load_timeout(),
            user_agents: Mutex::new(UserAgentManager::new()),
        }
    }

    pub fn endpoint(&self, browser: BrowserName) -> &str {
        self.endpoints.for_browser(browser)
    }
}

#[async_trait]
impl ContextProvider for WebDriverContextProvider {
    type Context = BrowserContext;

    async fn acquire_context(
        &self,
        browser: BrowserName,
        session_dir: &Path,
        scripts: ScriptMode,
    ) -> Result<BrowserContext> {
        tokio::fs::create_dir_all(session_dir).await.map_err(|e| {
            SeekerError::Context(format!(
                "failed to create session directory {}: {e}",
                session_dir.display()
            ))
        })?;

        // Both contexts of a run share one fingerprint.
        let profile = match self.user_agents.lock() {
            Ok(mut manager) => manager.session_profile().clone(),
            Err(poisoned) => poisoned.into_inner().session_profile().clone(),
        };
        let caps = build_capabilities(&ContextOptions {
            browser,
            session_dir,
            scripts,
            headless: self.headless,
            stealth: self.stealth,
            profile: &profile,
        });

        let endpoint = self.endpoint(browser);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(endpoint)
            .await
            .map_err(|e| {
                SeekerError::Context(format!(
                    "failed to start {browser} session via {endpoint}: {e}"
                ))
            })?;

        let timeouts = TimeoutConfiguration::new(None, Some(self.page_load_timeout), None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            tracing::warn!(target: "browser.context", error = %e, "could not set page load timeout");
        }

        info!(
            target: "browser.context",
            browser = %browser,
            scripts = ?scripts,
            session_dir = %session_dir.display(),
            "browser context ready"
        );
        Ok(BrowserContext {
            client,
            browser,
            scripts,
            session_dir: session_dir.to_path_buf(),
            stealth: self.stealth,
            profile,
            behavioral_engine: BehavioralEngine::new(),
            page_load_timeout: self.page_load_timeout,
        })
    }
}
