//! Live scraping through a visible Chromium window.
//!
//! The window is shown so the user can log in by hand before harvesting
//! starts; the session cookies then carry over to every target.

use super::source::PostSource;
use crate::config::HarvestConfig;
use crate::error::{ForgeError, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use std::time::Duration;

fn harvest_error(context: &str, e: impl std::fmt::Display) -> ForgeError {
    ForgeError::Harvest {
        message: format!("{}: {}", context, e),
    }
}

/// A [`PostSource`] backed by a real browser page.
pub struct BrowserPostSource {
    browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
    post_query: String,
    settle_delay: Duration,
}

impl BrowserPostSource {
    /// Launch a headed browser and open the login page.
    pub async fn launch(config: &HarvestConfig) -> Result<Self> {
        let browser_config = BrowserConfig::builder()
            .with_head()
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .build()
            .map_err(|e| harvest_error("failed to configure browser", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| harvest_error("failed to launch browser", e))?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page(config.login_url.as_str())
            .await
            .map_err(|e| harvest_error("failed to open login page", e))?;

        // Selector is embedded as a JSON string literal so quotes survive.
        let selector = serde_json::to_string(&config.post_selector)?;
        let post_query = format!(
            "Array.from(document.querySelectorAll({})).map(e => e.innerText)",
            selector
        );

        Ok(Self {
            browser,
            page,
            handler,
            post_query,
            settle_delay: config.settle_delay()?,
        })
    }

    /// Close the browser and stop the event handler.
    pub async fn close(mut self) -> Result<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| harvest_error("failed to close browser", e));
        self.handler.abort();
        result
    }
}

#[async_trait::async_trait]
impl PostSource for BrowserPostSource {
    async fn open(&mut self, target: &str) -> Result<()> {
        self.page
            .goto(target)
            .await
            .map_err(|e| harvest_error(&format!("failed to open {}", target), e))?;
        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    async fn requires_login(&mut self) -> Result<bool> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| harvest_error("failed to read page url", e))?;
        Ok(url.is_some_and(|u| u.contains("login")))
    }

    async fn visible_posts(&mut self) -> Result<Vec<String>> {
        self.page
            .evaluate(self.post_query.as_str())
            .await
            .map_err(|e| harvest_error("failed to read posts", e))?
            .into_value::<Vec<String>>()
            .map_err(|e| harvest_error("unexpected post list", e))
    }

    async fn scroll(&mut self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(|e| harvest_error("failed to scroll", e))?;
        Ok(())
    }
}
