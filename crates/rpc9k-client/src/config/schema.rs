use rpc9k_core::error::{Result, Rpc9kError};
use serde::Deserialize;

use crate::options::Auth;
use crate::session::DEFAULT_MAX_REDIRECTS;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub client: ClientSection,

    /// Passed through to the transport untouched.
    #[serde(default)]
    pub auth: Option<Auth>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Rpc9kError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.client.validate()?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            client: ClientSection::default(),
            auth: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default = "default_root_url")]
    pub root_url: String,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        if self.root_url.trim().is_empty() {
            return Err(Rpc9kError::Config("client.root_url must not be empty".into()));
        }
        if !(1..=32).contains(&self.max_redirects) {
            return Err(Rpc9kError::Config(
                "client.max_redirects must be between 1 and 32".into(),
            ));
        }
        Ok(())
    }
}

fn default_root_url() -> String {
    "/".into()
}
fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}
