//! Document header: format version, source application and units.

use std::fmt;

use crate::util::{AngularUnit, Error, LinearUnit, Result, TimeUnit, UnitContext};

/// Version of the text format, `major.minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    /// The version this crate reads and writes.
    pub const V1_1: Self = Self { major: 1, minor: 1 };

    /// Parse "1.1" style version strings. Returns `None` on anything
    /// that is not two dot-separated integers.
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.trim().parse().ok()?,
            minor: minor.trim().parse().ok()?,
        })
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::V1_1
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Header of an ANIM document.
///
/// `start <= end` is required on encode; decode keeps whatever the file
/// declares so damaged files can still be inspected.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimHeader {
    pub version: FormatVersion,
    /// Version string of the application that produced the file
    /// (the `mayaVersion` statement).
    pub app_version: String,
    pub time_unit: TimeUnit,
    pub linear_unit: LinearUnit,
    pub angular_unit: AngularUnit,
    /// First frame of the animation.
    pub start: i64,
    /// Last frame of the animation.
    pub end: i64,
    /// Header statements with keys this crate does not type; kept
    /// verbatim in file order.
    pub extras: Vec<(String, String)>,
}

impl Default for AnimHeader {
    fn default() -> Self {
        let units = UnitContext::default();
        Self {
            version: FormatVersion::V1_1,
            app_version: String::new(),
            time_unit: units.time,
            linear_unit: units.linear,
            angular_unit: units.angular,
            start: 0,
            end: 0,
            extras: Vec::new(),
        }
    }
}

impl AnimHeader {
    /// Unit choices declared by this header.
    pub fn unit_context(&self) -> UnitContext {
        UnitContext {
            time: self.time_unit,
            linear: self.linear_unit,
            angular: self.angular_unit,
        }
    }

    /// Check invariants required before writing.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidHeader(format!(
                "startTime {} is after endTime {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}
