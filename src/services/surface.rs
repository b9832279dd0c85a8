use std::{fmt, time::Duration};

use async_trait::async_trait;

use crate::error::ScrapeError;

/// A CSS selector identifying an element on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The page-driving primitives a session needs from a browser.
///
/// Waits report a timeout as `Ok(false)`; `Err` is reserved for the browser
/// itself failing.
#[async_trait]
pub trait BrowsingSurface: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), ScrapeError>;

    async fn wait_for_element(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, ScrapeError>;

    async fn type_text(
        &self,
        locator: &Locator,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), ScrapeError>;

    async fn click(&self, locator: &Locator) -> Result<(), ScrapeError>;

    async fn query_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScrapeError>;

    async fn read_text(&self, element: &Self::Element) -> Result<String, ScrapeError>;

    async fn click_element(&self, element: &Self::Element) -> Result<(), ScrapeError>;

    async fn current_path(&self) -> Result<String, ScrapeError>;

    async fn wait_for_network_idle(
        &self,
        idle_window: Duration,
        timeout: Duration,
    ) -> Result<bool, ScrapeError>;

    /// Serialized markup of the current page.
    async fn snapshot(&self) -> Result<String, ScrapeError>;

    async fn close(self) -> Result<(), ScrapeError>
    where
        Self: Sized;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::{HashMap, HashSet},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Mutex,
        },
    };

    use super::*;
    use crate::configuration::Settings;

    /// What the scripted page reports when asked for network quiescence.
    #[derive(Debug, Clone, Copy, Default)]
    pub enum NetworkIdle {
        #[default]
        Quiet,
        Busy,
        Unobservable,
    }

    /// In-memory page that answers from a fixed script.
    #[derive(Default)]
    pub struct ScriptedSurface {
        pub present: HashSet<String>,
        pub controls: Vec<String>,
        pub page: String,
        pub path: Mutex<String>,
        pub path_after_click: HashMap<String, String>,
        pub fail_snapshot: bool,
        pub network_idle: NetworkIdle,
        pub idle_waits: Mutex<usize>,
        pub typed: Mutex<Vec<(String, String)>>,
        pub clicks: Mutex<Vec<String>>,
        pub closed: Arc<AtomicBool>,
    }

    impl ScriptedSurface {
        pub fn with_elements(selectors: &[&str]) -> Self {
            ScriptedSurface {
                present: selectors.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn closed_flag(&self) -> Arc<AtomicBool> {
            self.closed.clone()
        }

        pub fn clicked(&self) -> Vec<String> {
            self.clicks.lock().unwrap().clone()
        }

        pub fn typed(&self) -> Vec<(String, String)> {
            self.typed.lock().unwrap().clone()
        }

        pub fn idle_waits(&self) -> usize {
            *self.idle_waits.lock().unwrap()
        }

        fn follow(&self, target: &str) {
            if let Some(path) = self.path_after_click.get(target) {
                *self.path.lock().unwrap() = path.clone();
            }
        }
    }

    #[async_trait]
    impl BrowsingSurface for ScriptedSurface {
        type Element = usize;

        async fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
            let path = url::Url::parse(url)
                .map(|u| u.path().to_string())
                .map_err(|e| ScrapeError::Browser(e.to_string()))?;
            *self.path.lock().unwrap() = path;
            Ok(())
        }

        async fn wait_for_element(
            &self,
            locator: &Locator,
            timeout: Duration,
        ) -> Result<bool, ScrapeError> {
            if self.present.contains(locator.as_str()) {
                return Ok(true);
            }
            tokio::time::sleep(timeout).await;
            Ok(false)
        }

        async fn type_text(
            &self,
            locator: &Locator,
            text: &str,
            _per_char_delay: Duration,
        ) -> Result<(), ScrapeError> {
            self.typed
                .lock()
                .unwrap()
                .push((locator.to_string(), text.to_string()));
            Ok(())
        }

        async fn click(&self, locator: &Locator) -> Result<(), ScrapeError> {
            self.clicks.lock().unwrap().push(locator.to_string());
            self.follow(locator.as_str());
            Ok(())
        }

        async fn query_all(&self, _locator: &Locator) -> Result<Vec<usize>, ScrapeError> {
            Ok((0..self.controls.len()).collect())
        }

        async fn read_text(&self, element: &usize) -> Result<String, ScrapeError> {
            self.controls
                .get(*element)
                .cloned()
                .ok_or_else(|| ScrapeError::Extraction("stale element".to_string()))
        }

        async fn click_element(&self, element: &usize) -> Result<(), ScrapeError> {
            let text = self.read_text(element).await?;
            self.clicks.lock().unwrap().push(text);
            Ok(())
        }

        async fn current_path(&self) -> Result<String, ScrapeError> {
            Ok(self.path.lock().unwrap().clone())
        }

        async fn wait_for_network_idle(
            &self,
            _idle_window: Duration,
            _timeout: Duration,
        ) -> Result<bool, ScrapeError> {
            *self.idle_waits.lock().unwrap() += 1;
            match self.network_idle {
                NetworkIdle::Quiet => Ok(true),
                NetworkIdle::Busy => Ok(false),
                NetworkIdle::Unobservable => Err(ScrapeError::Browser(
                    "javascript execution is disabled".to_string(),
                )),
            }
        }

        async fn snapshot(&self) -> Result<String, ScrapeError> {
            match self.fail_snapshot {
                true => Err(ScrapeError::Extraction("session closed".to_string())),
                false => Ok(self.page.clone()),
            }
        }

        async fn close(self) -> Result<(), ScrapeError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    pub fn test_settings() -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(
                r#"
application:
  host: 127.0.0.1
  port: 0
dashboard:
  login_url: https://dash.example.com/login
  username: ops@example.com
  password: hunter2
timeouts:
  required_element: 30
  navigation: 30
  idle_timeout: 30
  refresh_idle_timeout: 30
  settle: 1
  typing_delay: 0
  poll_interval: 5
extraction:
  card_selector: div.card
  required_tags: [card]
  eligibility_keyword: disconnect
  refresh_keyword: refresh
"#,
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    pub const PAGE: &str = r#"
        <html><body>
          <div class="card">
            <p><span class="font-bold">WABA:</span> Acme WA</p>
            <p>+1 555 0100</p>
            <p><span class="font-bold">Message limit:</span> 1K</p>
            <footer><button>Disconnect</button></footer>
          </div>
          <div class="card">
            <p><span class="font-bold">WABA:</span> Idle line</p>
            <footer><button>Connect</button></footer>
          </div>
        </body></html>
    "#;

    pub fn happy_surface() -> ScriptedSurface {
        let mut surface = ScriptedSurface::with_elements(&[
            r#"input[type="email"]"#,
            r#"input[type="password"]"#,
            r#"a[href="/meta/connections"]"#,
            "button",
        ]);
        surface.controls = vec!["Novo".to_string(), " Refresh list ".to_string()];
        surface.page = PAGE.to_string();
        surface.path_after_click = HashMap::from([
            (r#"button[type="submit"]"#.to_string(), "/home".to_string()),
            (
                r#"a[href="/meta/connections"]"#.to_string(),
                "/meta/connections".to_string(),
            ),
        ]);
        surface
    }
}
