//! Unit tables for the ANIM format.
//!
//! The format declares a time unit (an integer frame rate), a linear unit
//! and an angular unit in its header; every channel additionally declares
//! an output domain. Conversions are plain factor lookups relative to the
//! reference units: meters, radians and frames.
//!
//! All conversion state is carried explicitly by [`UnitContext`]; there is
//! no ambient scene state anywhere in the crate.

use crate::util::{Error, Result};

/// Time unit of a document, one of the fixed Maya frame-rate names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    /// 15 fps
    Game,
    /// 24 fps
    Film,
    /// 25 fps
    Pal,
    /// 30 fps
    Ntsc,
    /// 48 fps
    Show,
    /// 50 fps
    Palf,
    /// 60 fps
    Ntscf,
}

impl TimeUnit {
    /// Frame rate this unit stands for.
    pub fn fps(self) -> u32 {
        match self {
            Self::Game => 15,
            Self::Film => 24,
            Self::Pal => 25,
            Self::Ntsc => 30,
            Self::Show => 48,
            Self::Palf => 50,
            Self::Ntscf => 60,
        }
    }

    /// Reverse lookup from a frame rate.
    pub fn from_fps(fps: u32) -> Option<Self> {
        match fps {
            15 => Some(Self::Game),
            24 => Some(Self::Film),
            25 => Some(Self::Pal),
            30 => Some(Self::Ntsc),
            48 => Some(Self::Show),
            50 => Some(Self::Palf),
            60 => Some(Self::Ntscf),
            _ => None,
        }
    }

    /// Keyword used in the text format.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Film => "film",
            Self::Pal => "pal",
            Self::Ntsc => "ntsc",
            Self::Show => "show",
            Self::Palf => "palf",
            Self::Ntscf => "ntscf",
        }
    }

    /// Parse a keyword from the text format. The table is closed;
    /// anything else is an error.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "game" => Ok(Self::Game),
            "film" => Ok(Self::Film),
            "pal" => Ok(Self::Pal),
            "ntsc" => Ok(Self::Ntsc),
            "show" => Ok(Self::Show),
            "palf" => Ok(Self::Palf),
            "ntscf" => Ok(Self::Ntscf),
            _ => Err(Error::UnknownUnit { kind: "time", name: name.to_string() }),
        }
    }
}

/// Linear unit of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearUnit {
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
    Inches,
    Feet,
    Miles,
}

impl LinearUnit {
    /// How many of this unit fit in one meter.
    pub fn per_meter(self) -> f64 {
        match self {
            Self::Millimeters => 1000.0,
            Self::Centimeters => 100.0,
            Self::Meters => 1.0,
            Self::Kilometers => 0.001,
            Self::Inches => 1.0 / 0.0254,
            Self::Feet => 1.0 / 0.3048,
            Self::Miles => 1.0 / 1609.344,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Centimeters => "cm",
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Inches => "in",
            Self::Feet => "ft",
            Self::Miles => "mi",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "mm" => Ok(Self::Millimeters),
            "cm" => Ok(Self::Centimeters),
            "m" => Ok(Self::Meters),
            "km" => Ok(Self::Kilometers),
            "in" => Ok(Self::Inches),
            "ft" => Ok(Self::Feet),
            "mi" => Ok(Self::Miles),
            _ => Err(Error::UnknownUnit { kind: "linear", name: name.to_string() }),
        }
    }
}

/// Angular unit of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngularUnit {
    Degrees,
    Radians,
}

impl AngularUnit {
    /// How many of this unit make one full turn.
    pub fn per_turn(self) -> f64 {
        match self {
            Self::Degrees => 360.0,
            Self::Radians => std::f64::consts::TAU,
        }
    }

    /// Convert radians into this unit.
    #[inline]
    pub fn from_radians(self, radians: f64) -> f64 {
        radians * self.per_turn() / std::f64::consts::TAU
    }

    /// Convert a value in this unit into radians.
    #[inline]
    pub fn to_radians(self, value: f64) -> f64 {
        value * std::f64::consts::TAU / self.per_turn()
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Degrees => "deg",
            Self::Radians => "rad",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "deg" => Ok(Self::Degrees),
            "rad" => Ok(Self::Radians),
            _ => Err(Error::UnknownUnit { kind: "angular", name: name.to_string() }),
        }
    }
}

/// Output domain of a channel: what the value axis of its curve measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputUnit {
    Time,
    Linear,
    Angular,
    #[default]
    Unitless,
}

impl OutputUnit {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Linear => "linear",
            Self::Angular => "angular",
            Self::Unitless => "unitless",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "time" => Ok(Self::Time),
            "linear" => Ok(Self::Linear),
            "angular" => Ok(Self::Angular),
            "unitless" => Ok(Self::Unitless),
            _ => Err(Error::UnknownUnit { kind: "output", name: name.to_string() }),
        }
    }
}

/// Unit choices for one encode or decode pass, as plain data.
///
/// Native values are meters, radians and frames; document values are
/// whatever the header declares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitContext {
    pub time: TimeUnit,
    pub linear: LinearUnit,
    pub angular: AngularUnit,
}

impl Default for UnitContext {
    fn default() -> Self {
        Self {
            time: TimeUnit::Film,
            linear: LinearUnit::Centimeters,
            angular: AngularUnit::Degrees,
        }
    }
}

impl UnitContext {
    /// Meters to document linear unit.
    #[inline]
    pub fn linear_to_document(&self, meters: f64) -> f64 {
        meters * self.linear.per_meter()
    }

    /// Document linear unit to meters.
    #[inline]
    pub fn linear_to_native(&self, value: f64) -> f64 {
        value / self.linear.per_meter()
    }

    /// Radians to document angular unit.
    #[inline]
    pub fn angular_to_document(&self, radians: f64) -> f64 {
        self.angular.from_radians(radians)
    }

    /// Document angular unit to radians.
    #[inline]
    pub fn angular_to_native(&self, value: f64) -> f64 {
        self.angular.to_radians(value)
    }
}
