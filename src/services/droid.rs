use std::time::{Duration, Instant};

use async_trait::async_trait;
use thirtyfour::{error::WebDriverError, prelude::*, ChromiumLikeCapabilities};

use crate::{configuration::BrowserSettings, error::ScrapeError};

use super::{BrowsingSurface, Locator};

const IDLE_PROBE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// A chromedriver-backed browser session.
pub struct Droid {
    pub driver: WebDriver,
    poll_interval: Duration,
}

fn browser_error(e: WebDriverError) -> ScrapeError {
    ScrapeError::Browser(e.to_string())
}

fn environment_error(e: WebDriverError) -> ScrapeError {
    ScrapeError::Environment(e.to_string())
}

impl Droid {
    pub async fn new(settings: &BrowserSettings, poll_interval: Duration) -> Result<Self, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();

        if settings.headless {
            caps.set_headless().map_err(environment_error)?;
            caps.set_disable_gpu().map_err(environment_error)?;
        }
        if !settings.sandbox {
            caps.set_no_sandbox().map_err(environment_error)?;
            caps.add_arg("--disable-setuid-sandbox")
                .map_err(environment_error)?;
        }
        caps.set_disable_dev_shm_usage()
            .map_err(environment_error)?;
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ))
        .map_err(environment_error)?;
        if let Some(binary) = &settings.binary {
            caps.set_binary(binary).map_err(environment_error)?;
        }

        log::info!(
            "Starting browser session on {} (headless: {})",
            settings.webdriver_url,
            settings.headless
        );
        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps)
            .await
            .map_err(environment_error)?;

        Ok(Droid {
            driver,
            poll_interval,
        })
    }

    async fn find(&self, locator: &Locator) -> Result<WebElement, ScrapeError> {
        self.driver
            .find(By::Css(locator.to_string()))
            .await
            .map_err(browser_error)
    }

    async fn probe_idle(&self) -> Result<(bool, u64), ScrapeError> {
        let ret = self
            .driver
            .execute(IDLE_PROBE, Vec::new())
            .await
            .map_err(browser_error)?;
        let value = ret.json();

        let complete = value[0].as_str() == Some("complete");
        let resources = value[1].as_u64().unwrap_or_default();
        Ok((complete, resources))
    }
}

#[async_trait]
impl BrowsingSurface for Droid {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        self.driver.goto(url).await.map_err(browser_error)
    }

    async fn wait_for_element(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        self.driver
            .query(By::Css(locator.to_string()))
            .wait(timeout, self.poll_interval)
            .exists()
            .await
            .map_err(browser_error)
    }

    async fn type_text(
        &self,
        locator: &Locator,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), ScrapeError> {
        let input = self.find(locator).await?;

        if per_char_delay.is_zero() {
            return input.send_keys(text).await.map_err(browser_error);
        }

        for c in text.chars() {
            input
                .send_keys(c.to_string())
                .await
                .map_err(browser_error)?;
            tokio::time::sleep(per_char_delay).await;
        }
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<(), ScrapeError> {
        self.find(locator)
            .await?
            .click()
            .await
            .map_err(browser_error)
    }

    async fn query_all(&self, locator: &Locator) -> Result<Vec<WebElement>, ScrapeError> {
        self.driver
            .find_all(By::Css(locator.to_string()))
            .await
            .map_err(browser_error)
    }

    async fn read_text(&self, element: &WebElement) -> Result<String, ScrapeError> {
        element.text().await.map_err(browser_error)
    }

    async fn click_element(&self, element: &WebElement) -> Result<(), ScrapeError> {
        element.click().await.map_err(browser_error)
    }

    async fn current_path(&self) -> Result<String, ScrapeError> {
        self.driver
            .current_url()
            .await
            .map(|url| url.path().to_string())
            .map_err(browser_error)
    }

    /// The page counts as idle once it has finished loading and its resource
    /// timing entries stop growing for `idle_window`.
    async fn wait_for_network_idle(
        &self,
        idle_window: Duration,
        timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        let deadline = Instant::now() + timeout;
        let mut last_count = None;
        let mut stable_since = Instant::now();

        loop {
            let (complete, count) = self.probe_idle().await?;
            let now = Instant::now();

            if complete && last_count == Some(count) {
                if now.duration_since(stable_since) >= idle_window {
                    return Ok(true);
                }
            } else {
                last_count = Some(count);
                stable_since = now;
            }

            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn snapshot(&self) -> Result<String, ScrapeError> {
        self.driver
            .source()
            .await
            .map_err(|e| ScrapeError::Extraction(e.to_string()))
    }

    async fn close(self) -> Result<(), ScrapeError> {
        log::info!("Closing browser session");
        self.driver.quit().await.map_err(browser_error)
    }
}
