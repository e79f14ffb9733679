//! Grammar reader: header statements, `anim` declarations, `animData`
//! blocks and key lines.
//!
//! Numeric failure policy: a malformed float becomes `NaN` (and is
//! counted) so one corrupt value never discards the document; a
//! malformed integer becomes `None` and the caller treats the field as
//! missing. Unknown enum keywords are fatal because the mapping tables
//! are closed.

use tracing::warn;

use crate::model::{
    AnimHeader, ChannelSettings, FixedTangent, FormatVersion, Infinity, Keyframe, TangentType,
};
use crate::util::{AngularUnit, Error, LinearUnit, OutputUnit, Result, TimeUnit};

/// Strip the `#` comment and the `;` terminator from a raw line.
pub fn clean_line(line: &str) -> &str {
    let line = line.split('#').next().unwrap_or("");
    line.split(';').next().unwrap_or("").trim()
}

/// A parsed `anim` declaration line.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimDecl {
    /// Channel declaration:
    /// `anim <attrFull> <attrShort> <node> <row> <children> <index>;`
    Channel {
        attr: String,
        node: String,
        children: u32,
        index: Option<i64>,
    },
    /// Bare structural line for a present but unanimated node:
    /// `anim <name> <row> <children> 0;`
    Node { name: String, children: u32 },
}

/// Cursor over the lines of a document.
pub struct Reader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    nan_count: usize,
}

impl<'a> Reader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { lines: text.lines().collect(), pos: 0, nan_count: 0 }
    }

    /// 1-based number of the last consumed line.
    pub fn line_number(&self) -> usize {
        self.pos
    }

    /// How many malformed floats were replaced by NaN so far.
    pub fn nan_substitutions(&self) -> usize {
        self.nan_count
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    fn parse_float(&mut self, token: &str) -> f64 {
        token.parse().unwrap_or_else(|_| {
            warn!(line = self.pos, token, "malformed float, substituting NaN");
            self.nan_count += 1;
            f64::NAN
        })
    }

    fn parse_int(token: &str) -> Option<i64> {
        token.parse().ok()
    }

    /// Read header statements up to (not including) the first `anim`
    /// line. Known keys are typed; everything else lands in `extras`.
    pub fn read_header(&mut self) -> Result<AnimHeader> {
        let mut header = AnimHeader::default();

        while let Some(raw) = self.peek() {
            let clean = clean_line(raw);
            if clean.starts_with("anim ") || clean == "animData {" {
                break;
            }
            self.pos += 1;
            if clean.is_empty() {
                continue;
            }

            let (key, value) = match clean.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v.trim()),
                None => {
                    warn!(line = self.pos, statement = clean, "header statement without value");
                    continue;
                }
            };

            match key {
                "animVersion" => match FormatVersion::parse(value) {
                    Some(v) => header.version = v,
                    None => warn!(line = self.pos, value, "unparseable animVersion"),
                },
                "mayaVersion" => header.app_version = value.to_string(),
                "timeUnit" => header.time_unit = TimeUnit::parse(value)?,
                "linearUnit" => header.linear_unit = LinearUnit::parse(value)?,
                "angularUnit" => header.angular_unit = AngularUnit::parse(value)?,
                "startTime" => match Self::parse_int(value) {
                    Some(v) => header.start = v,
                    None => warn!(line = self.pos, value, "unparseable startTime"),
                },
                "endTime" => match Self::parse_int(value) {
                    Some(v) => header.end = v,
                    None => warn!(line = self.pos, value, "unparseable endTime"),
                },
                _ => header.extras.push((key.to_string(), value.to_string())),
            }
        }
        Ok(header)
    }

    /// Consume one `anim` declaration line.
    pub fn read_anim_decl(&mut self) -> Result<AnimDecl> {
        let raw = self
            .next_line()
            .ok_or_else(|| Error::structural(self.pos, "expected anim declaration"))?;
        let clean = clean_line(raw);
        let rest = clean.strip_prefix("anim").unwrap_or(clean).trim();
        let tokens: Vec<&str> = rest.split_whitespace().collect();

        match tokens.len() {
            6 => {
                let children = Self::parse_int(tokens[4]).unwrap_or(0).max(0) as u32;
                Ok(AnimDecl::Channel {
                    attr: tokens[0].to_string(),
                    node: tokens[2].to_string(),
                    children,
                    index: Self::parse_int(tokens[5]),
                })
            }
            4 => {
                let children = Self::parse_int(tokens[2]).unwrap_or(0).max(0) as u32;
                Ok(AnimDecl::Node { name: tokens[0].to_string(), children })
            }
            n => Err(Error::structural(
                self.pos,
                format!("anim declaration has {n} fields, expected 4 or 6"),
            )),
        }
    }

    /// Consume an `animData { ... }` block, including its nested
    /// `keys { ... }` block. The cursor must stand on the opening line.
    pub fn read_anim_data(&mut self) -> Result<(ChannelSettings, Vec<Keyframe>)> {
        let open_line = self.pos + 1;
        let raw = self
            .next_line()
            .ok_or_else(|| Error::structural(self.pos, "expected animData block"))?;
        if clean_line(raw) != "animData {" {
            return Err(Error::structural(self.pos, "expected animData block"));
        }

        let mut settings = ChannelSettings::default();
        let mut keys = Vec::new();

        loop {
            let raw = self.next_line().ok_or(Error::UnterminatedBlock {
                block: "animData",
                line: open_line,
            })?;
            let clean = clean_line(raw);
            if clean == "}" {
                break;
            }
            if clean == "keys {" {
                keys = self.read_keys()?;
                continue;
            }
            if clean.is_empty() {
                continue;
            }

            let (key, value) = match clean.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v.trim()),
                None => {
                    warn!(line = self.pos, statement = clean, "animData statement without value");
                    continue;
                }
            };
            match key {
                "input" => settings.input = OutputUnit::parse(value)?,
                "output" => settings.output = OutputUnit::parse(value)?,
                "weighted" => {
                    settings.weighted = Self::parse_int(value).map(|i| i != 0).unwrap_or(false)
                }
                "tangentAngleUnit" => {
                    settings.tangent_angle_unit = Some(AngularUnit::parse(value)?)
                }
                "preInfinity" => settings.pre_infinity = Infinity::parse(value)?,
                "postInfinity" => settings.post_infinity = Infinity::parse(value)?,
                _ => warn!(line = self.pos, key, "unknown animData statement skipped"),
            }
        }

        Ok((settings, keys))
    }

    fn read_keys(&mut self) -> Result<Vec<Keyframe>> {
        let open_line = self.pos;
        let mut keys = Vec::new();
        loop {
            let raw = self.next_line().ok_or(Error::UnterminatedBlock {
                block: "keys",
                line: open_line,
            })?;
            let clean = clean_line(raw);
            if clean == "}" {
                break;
            }
            if clean.is_empty() {
                continue;
            }
            keys.push(self.parse_keyframe(clean)?);
        }
        Ok(keys)
    }

    /// Parse one key line. The two optional angle/weight pairs are
    /// present iff the corresponding tangent type is `fixed`, so field
    /// positions shift by how many tangents are fixed.
    fn parse_keyframe(&mut self, clean: &str) -> Result<Keyframe> {
        let tokens: Vec<&str> = clean.split_whitespace().collect();
        if tokens.len() < 7 {
            return Err(Error::structural(
                self.pos,
                format!("keyframe line has {} fields, expected at least 7", tokens.len()),
            ));
        }

        let time = self.parse_float(tokens[0]);
        let value = self.parse_float(tokens[1]);
        let in_tangent = TangentType::parse(tokens[2])?;
        let out_tangent = TangentType::parse(tokens[3])?;
        let flag = |t: &str| Self::parse_int(t).map(|i| i != 0).unwrap_or(false);
        let tangent_lock = flag(tokens[4]);
        let weight_lock = flag(tokens[5]);
        let breakdown = flag(tokens[6]);

        let mut cursor = 7;
        let mut fixed_pair = |reader: &mut Self, tangent: TangentType| -> Result<Option<FixedTangent>> {
            if tangent != TangentType::Fixed {
                return Ok(None);
            }
            if cursor + 2 > tokens.len() {
                return Err(Error::structural(
                    reader.pos,
                    "keyframe line is missing fixed tangent angle/weight",
                ));
            }
            let pair = FixedTangent {
                angle: reader.parse_float(tokens[cursor]),
                weight: reader.parse_float(tokens[cursor + 1]),
            };
            cursor += 2;
            Ok(Some(pair))
        };

        let in_fixed = fixed_pair(self, in_tangent)?;
        let out_fixed = fixed_pair(self, out_tangent)?;

        Ok(Keyframe {
            time,
            value,
            in_tangent,
            out_tangent,
            tangent_lock,
            weight_lock,
            breakdown,
            in_fixed,
            out_fixed,
        })
    }
}
