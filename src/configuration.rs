use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

use crate::domain::FieldBinding;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Credentials and locators for the dashboard login flow. Locators have
/// defaults, credentials never do.
#[derive(Deserialize, Clone, Debug)]
pub struct DashboardSettings {
    pub login_url: Url,
    pub username: String,
    pub password: String,
    #[serde(default = "default_username_field")]
    pub username_field: String,
    #[serde(default = "default_password_field")]
    pub password_field: String,
    #[serde(default = "default_submit_control")]
    pub submit_control: String,
    #[serde(default = "default_target_tab")]
    pub target_tab: String,
    #[serde(default = "default_target_path")]
    pub target_path: String,
}

fn default_username_field() -> String {
    r#"input[type="email"]"#.to_string()
}

fn default_password_field() -> String {
    r#"input[type="password"]"#.to_string()
}

fn default_submit_control() -> String {
    r#"button[type="submit"]"#.to_string()
}

fn default_target_tab() -> String {
    r#"a[href="/meta/connections"]"#.to_string()
}

fn default_target_path() -> String {
    "/meta/connections".to_string()
}

/// How the browsing surface is acquired.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub sandbox: bool,
    pub binary: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            sandbox: false,
            binary: None,
            window_width: 1366,
            window_height: 800,
        }
    }
}

/// All values in milliseconds.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TimeoutSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub required_element: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub navigation: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_window: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_timeout: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub refresh_idle_timeout: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub typing_delay: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        TimeoutSettings {
            required_element: 15_000,
            navigation: 15_000,
            idle_window: 800,
            idle_timeout: 5_000,
            refresh_idle_timeout: 10_000,
            settle: 1_000,
            typing_delay: 20,
            poll_interval: 100,
        }
    }
}

impl TimeoutSettings {
    pub fn required_element(&self) -> Duration {
        Duration::from_millis(self.required_element)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout)
    }

    pub fn refresh_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_idle_timeout)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ExtractionSettings {
    pub card_selector: String,
    pub required_tags: Vec<String>,
    pub action_region: String,
    pub action_control: String,
    pub eligibility_keyword: String,
    pub refresh_keyword: String,
    pub field_selector: String,
    pub label_selector: String,
    pub emphasis_selector: String,
    pub identity_marker: String,
    pub eligibility_required: bool,
    pub binding: FieldBinding,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        ExtractionSettings {
            card_selector: "div.MuiPaper-root".to_string(),
            required_tags: [
                "MuiPaper-root",
                "MuiPaper-background",
                "MuiPaper-rounded",
                "flex",
                "flex-col",
                "justify-between",
                "items-start",
                "gap-10",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            action_region: "footer".to_string(),
            action_control: "button".to_string(),
            eligibility_keyword: "desconectar".to_string(),
            refresh_keyword: "atualizar".to_string(),
            field_selector: "p".to_string(),
            label_selector: "span".to_string(),
            emphasis_selector: "span.font-bold".to_string(),
            identity_marker: "waba".to_string(),
            eligibility_required: true,
            binding: FieldBinding::Keyword,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct OutputSettings {
    pub artifact_path: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            artifact_path: "conexoes.json".to_string(),
        }
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
