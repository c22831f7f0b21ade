use super::behavioral::BehavioralEngine;
use super::fingerprint::UserAgentProfile;
use super::stealth::StealthScripts;
use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use fantoccini::Client;
use seeker_common::{BrowserName, ScriptMode, SeekerError, StealthLevel};
use seeker_pipeline::BrowserSession;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A page as rendered by a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the browser ended up after redirects.
    pub url: String,
    pub title: String,
    pub html: String,
}

/// One live WebDriver session bound to a profile directory.
pub struct BrowserContext {
    pub(crate) client: Client,
    pub(crate) browser: BrowserName,
    pub(crate) scripts: ScriptMode,
    pub(crate) session_dir: PathBuf,
    pub(crate) stealth: StealthLevel,
    pub(crate) profile: UserAgentProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
    pub(crate) page_load_timeout: Duration,
}

impl BrowserContext {
    pub fn browser(&self) -> BrowserName {
        self.browser
    }

    pub fn scripts(&self) -> ScriptMode {
        self.scripts
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Navigate to `url` and capture the rendered document.
    ///
    /// Stealth evasions only run where scripts are enabled; the other
    /// context cannot execute them.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if self.scripts.is_enabled() {
            self.behavioral_engine.random_delay(300, 1200).await;
        }

        tokio::time::timeout(self.page_load_timeout, self.client.goto(url))
            .await
            .map_err(|_| anyhow!("page load timed out after {:?}: {url}", self.page_load_timeout))?
            .with_context(|| format!("navigation failed: {url}"))?;

        if self.scripts.is_enabled() {
            self.apply_stealth().await?;
        }

        let html = self.client.source().await.context("failed to read page source")?;
        let title = self.client.title().await.unwrap_or_default();
        let final_url = self
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());

        debug!(
            target: "browser.context",
            scripts = ?self.scripts,
            url = %final_url,
            bytes = html.len(),
            "page fetched"
        );
        Ok(FetchedPage {
            url: final_url,
            title,
            html,
        })
    }

    async fn apply_stealth(&self) -> Result<()> {
        for script in StealthScripts::for_level(self.stealth, &self.profile) {
            self.client
                .execute(&script, vec![])
                .await
                .context("failed to apply stealth evasions")?;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for BrowserContext {
    async fn release(self) -> seeker_common::Result<()> {
        let dir = self.session_dir.display().to_string();
        self.client.close().await.map_err(|e| {
            SeekerError::Context(format!("failed to close {} session at {dir}: {e}", self.browser))
        })?;
        info!(target: "browser.context", browser = %self.browser, scripts = ?self.scripts, session_dir = %dir, "browser context closed");
        Ok(())
    }
}
