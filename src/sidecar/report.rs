//! # Node report lines.
//!
//! The node prints one periodic summary per subnetwork on stdout, e.g.
//!
//! ```text
//! 2024-07-01T10:00:00Z INFO trin_history: reports~ data: radius=4% content=12.5/2000mb #=812 disk=31.2mb; msgs: offers=3/7, accepts=2/5, validations=2/2
//! ```
//!
//! [`Subnetwork::of_report`] recognizes the line, [`parse_report_line`] extracts the numbers.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::bridge::SubnetworkData;

static REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"radius=(\d+\.?\d*)%\s+content=(\d+\.?\d*)/(\d+\.?\d*)mb\s+#=(\d+)\s+disk=(\d+\.?\d*)mb.*offers=(\d+)/(\d+),\s+accepts=(\d+)/(\d+),\s+validations=(\d+)/(\d+)",
    )
    .expect("report pattern is valid")
});

/// Portal subnetworks that emit report lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subnetwork {
    History,
    State,
    Beacon,
}

impl Subnetwork {
    pub const ALL: [Subnetwork; 3] = [Subnetwork::History, Subnetwork::State, Subnetwork::Beacon];

    pub fn as_str(self) -> &'static str {
        match self {
            Subnetwork::History => "history",
            Subnetwork::State => "state",
            Subnetwork::Beacon => "beacon",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Subnetwork::History => "trin_history: reports~ data:",
            Subnetwork::State => "trin_state: reports~ data:",
            Subnetwork::Beacon => "trin_beacon: reports~ data:",
        }
    }

    /// Returns the subnetwork a report line belongs to, `None` for any other output.
    pub fn of_report(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|net| line.contains(net.marker()))
    }
}

/// Why a report line could not be parsed.
#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("line does not match the report pattern")]
    NoMatch,

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Extracts the per-subnetwork numbers from a node report line.
///
/// # Example
/// ```
/// use trinvisor::sidecar::parse_report_line;
///
/// let line = "trin_state: reports~ data: radius=100% content=0.0/1000mb #=0 disk=0.1mb; \
///             msgs: offers=1/2, accepts=3/4, validations=5/6";
/// let data = parse_report_line(line).unwrap();
/// assert_eq!(data.radius, 100.0);
/// assert_eq!(data.validations_out, 6);
/// ```
pub fn parse_report_line(line: &str) -> Result<SubnetworkData, ReportError> {
    let caps = REPORT.captures(line).ok_or(ReportError::NoMatch)?;
    let field = |idx: usize, name: &'static str| Capture {
        text: caps.get(idx).map_or("", |m| m.as_str()),
        name,
    };

    Ok(SubnetworkData {
        radius: field(1, "radius").parse()?,
        content_current: field(2, "content_current").parse()?,
        content_total: field(3, "content_total").parse()?,
        count: field(4, "count").parse()?,
        disk_usage: field(5, "disk_usage").parse()?,
        offers_in: field(6, "offers_in").parse()?,
        offers_out: field(7, "offers_out").parse()?,
        accepts_in: field(8, "accepts_in").parse()?,
        accepts_out: field(9, "accepts_out").parse()?,
        validations_in: field(10, "validations_in").parse()?,
        validations_out: field(11, "validations_out").parse()?,
    })
}

struct Capture<'a> {
    text: &'a str,
    name: &'static str,
}

impl Capture<'_> {
    fn parse<T: FromStr>(&self) -> Result<T, ReportError> {
        self.text.parse().map_err(|_| ReportError::InvalidNumber {
            field: self.name,
            value: self.text.to_string(),
        })
    }
}
