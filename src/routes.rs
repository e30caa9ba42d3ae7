//! Page routing table of the desktop front-end.
//!
//! | Page        | Path         | Name        | Kept alive |
//! |-------------|--------------|-------------|------------|
//! | `Home`      | `/`          | `home`      | yes        |
//! | `Configure` | `/configure` | `configure` | no         |
//! | `JsonRpc`   | `/jsonrpc`   | `jsonrpc`   | no         |
//! | `Account`   | `/account`   | `account`   | no         |

use serde::{Deserialize, Serialize};

/// A navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Home,
    Configure,
    JsonRpc,
    Account,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Configure, Page::JsonRpc, Page::Account];

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Configure => "/configure",
            Page::JsonRpc => "/jsonrpc",
            Page::Account => "/account",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Configure => "configure",
            Page::JsonRpc => "jsonrpc",
            Page::Account => "account",
        }
    }

    /// Whether the page keeps its state while navigated away from.
    ///
    /// Only the home page does, so its live telemetry view is not rebuilt on every visit.
    pub fn keep_alive(self) -> bool {
        matches!(self, Page::Home)
    }

    /// Resolves a path; a single trailing slash is ignored.
    ///
    /// # Example
    /// ```
    /// use trinvisor::routes::Page;
    ///
    /// assert_eq!(Page::from_path("/configure/"), Some(Page::Configure));
    /// assert_eq!(Page::from_path("/missing"), None);
    /// ```
    pub fn from_path(path: &str) -> Option<Page> {
        let path = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(trimmed) => trimmed,
        };
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
