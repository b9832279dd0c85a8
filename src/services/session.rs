use std::time::Duration;

use futures::future::join_all;
use uuid::Uuid;

use crate::{
    configuration::Settings,
    domain::{extract_records, ExtractionRules, RunResult},
    error::ScrapeError,
};

use super::{BrowsingSurface, Locator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Authenticating,
    NavigatingToTarget,
    Refreshing,
    Extracting,
    Done,
    Failed,
}

/// Drives one page from the login form to the extracted connection list.
///
/// Only the login inputs and the target tab are required; every other wait
/// is advisory and only logs when it runs out.
pub struct SessionController<'a, S: BrowsingSurface> {
    surface: &'a S,
    settings: &'a Settings,
    run_id: Uuid,
    state: SessionState,
}

impl<'a, S: BrowsingSurface> SessionController<'a, S> {
    pub fn new(surface: &'a S, settings: &'a Settings, run_id: Uuid) -> Self {
        SessionController {
            surface,
            settings,
            run_id,
            state: SessionState::Start,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub async fn run(&mut self) -> Result<RunResult, ScrapeError> {
        let mut result = None;

        loop {
            let step = match self.state {
                SessionState::Start => self
                    .authenticate()
                    .await
                    .map(|_| SessionState::Authenticating),
                SessionState::Authenticating => self
                    .open_target()
                    .await
                    .map(|_| SessionState::NavigatingToTarget),
                SessionState::NavigatingToTarget => {
                    self.refresh().await.map(|_| SessionState::Refreshing)
                }
                SessionState::Refreshing => self.extract().await.map(|r| {
                    result = Some(r);
                    SessionState::Extracting
                }),
                SessionState::Extracting => Ok(SessionState::Done),
                SessionState::Done | SessionState::Failed => break,
            };

            match step {
                Ok(next) => {
                    log::info!("[run {}] {:?} -> {:?}", self.run_id, self.state, next);
                    self.state = next;
                }
                Err(e) => {
                    log::error!("[run {}] failed while {:?}: {}", self.run_id, self.state, e);
                    self.state = SessionState::Failed;
                    return Err(e);
                }
            }
        }

        result.ok_or_else(|| ScrapeError::Extraction("session ended without records".to_string()))
    }

    async fn authenticate(&self) -> Result<(), ScrapeError> {
        let dashboard = &self.settings.dashboard;
        let timeouts = &self.settings.timeouts;
        let username_field = Locator::css(&dashboard.username_field);
        let password_field = Locator::css(&dashboard.password_field);

        log::info!("[run {}] Opening login page {}", self.run_id, dashboard.login_url);
        self.surface.navigate(dashboard.login_url.as_str()).await?;

        self.require(&username_field, "username input").await?;
        self.surface
            .type_text(&username_field, &dashboard.username, timeouts.typing_delay())
            .await?;

        self.require(&password_field, "password input").await?;
        self.surface
            .type_text(&password_field, &dashboard.password, timeouts.typing_delay())
            .await?;

        let login_path = self.surface.current_path().await.ok();
        self.surface
            .click(&Locator::css(&dashboard.submit_control))
            .await?;

        let navigated = self
            .wait_for_path(|path| Some(path) != login_path.as_deref(), timeouts.navigation())
            .await;
        if !navigated {
            log::warn!(
                "[run {}] No navigation observed after login submit, continuing",
                self.run_id
            );
        }
        self.settle_network(timeouts.idle_timeout()).await;

        Ok(())
    }

    async fn open_target(&self) -> Result<(), ScrapeError> {
        let dashboard = &self.settings.dashboard;
        let timeouts = &self.settings.timeouts;
        let target_tab = Locator::css(&dashboard.target_tab);

        self.require(&target_tab, "target tab").await?;
        self.surface.click(&target_tab).await?;

        let arrived = self
            .wait_for_path(
                |path| path.contains(&dashboard.target_path),
                timeouts.navigation(),
            )
            .await;
        if !arrived {
            log::warn!(
                "[run {}] Location never reached {}, continuing",
                self.run_id,
                dashboard.target_path
            );
        }
        self.settle_network(timeouts.idle_timeout()).await;

        Ok(())
    }

    async fn refresh(&self) -> Result<(), ScrapeError> {
        let extraction = &self.settings.extraction;
        let timeouts = &self.settings.timeouts;
        let control = Locator::css(&extraction.action_control);

        if !self
            .surface
            .wait_for_element(&control, timeouts.required_element())
            .await?
        {
            log::warn!("[run {}] No `{}` on the page, skipping refresh", self.run_id, control);
            return Ok(());
        }

        let controls = self.surface.query_all(&control).await?;
        let texts = join_all(controls.iter().map(|c| self.surface.read_text(c))).await;
        let keyword = extraction.refresh_keyword.to_lowercase();

        let refresh = controls.iter().zip(texts).find_map(|(c, text)| match text {
            Ok(text) if text.trim().to_lowercase().contains(&keyword) => Some(c),
            _ => None,
        });

        let Some(refresh) = refresh else {
            log::info!(
                "[run {}] Refresh control `{}` not found, extracting current view",
                self.run_id,
                extraction.refresh_keyword
            );
            return Ok(());
        };

        log::info!("[run {}] Refreshing connections", self.run_id);
        if let Err(e) = self.surface.click_element(refresh).await {
            log::warn!("[run {}] Refresh click failed: {}", self.run_id, e);
            return Ok(());
        }
        self.settle_network(timeouts.refresh_idle_timeout()).await;
        tokio::time::sleep(timeouts.settle()).await;

        Ok(())
    }

    async fn extract(&self) -> Result<RunResult, ScrapeError> {
        let snapshot = self.surface.snapshot().await?;
        let rules = ExtractionRules::from_settings(&self.settings.extraction)?;
        let records = extract_records(&snapshot, &rules);

        log::info!("[run {}] Extracted {} connection(s)", self.run_id, records.len());
        Ok(RunResult::from(records))
    }

    async fn require(&self, locator: &Locator, element: &'static str) -> Result<(), ScrapeError> {
        let timeout = self.settings.timeouts.required_element();
        match self.surface.wait_for_element(locator, timeout).await? {
            true => Ok(()),
            false => Err(ScrapeError::RequiredElementTimeout {
                element,
                locator: locator.to_string(),
                timeout,
            }),
        }
    }

    async fn wait_for_path(&self, accept: impl Fn(&str) -> bool, timeout: Duration) -> bool {
        let poll_interval = self.settings.timeouts.poll_interval();
        let probe = async {
            loop {
                if let Ok(path) = self.surface.current_path().await {
                    if accept(&path) {
                        return;
                    }
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, probe).await.is_ok()
    }

    async fn settle_network(&self, timeout: Duration) {
        let idle_window = self.settings.timeouts.idle_window();
        match self.surface.wait_for_network_idle(idle_window, timeout).await {
            Ok(true) => {}
            Ok(false) => log::warn!("[run {}] Network still busy after {:?}", self.run_id, timeout),
            Err(e) => log::warn!("[run {}] Could not observe network activity: {}", self.run_id, e),
        }
    }
}
