//! Closed set of session operations.
//!
//! Operations can be built directly or parsed from the `Name(arg, arg)`
//! form used in declarative markup, e.g. `Blur(4)`, `Desaturate(50,true)`,
//! `Channel(r)`. Names are matched case-sensitively against a fixed table.

use std::fmt;
use std::str::FromStr;

use crate::error::{ManipError, Result};
use crate::filters::ChannelSelector;
use crate::gradient::GradientMap;

/// A manipulation with strongly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Blur { radius: u32 },
    Desaturate { percentage: i64, human: bool },
    GrayScale { human: bool },
    Channel { selector: ChannelSelector },
    BuildGradientMap { threshold: i32, angle: i32 },
    BrightnessScaleMap { threshold: i32 },
    Commit,
    Revert,
}

/// Result of applying an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Working (or source) buffer updated.
    Applied,
    /// Gradient pass finished; working buffer now holds its grayscale input.
    Map(GradientMap),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Blur { .. } => "Blur",
            Operation::Desaturate { .. } => "Desaturate",
            Operation::GrayScale { .. } => "GrayScale",
            Operation::Channel { .. } => "Channel",
            Operation::BuildGradientMap { .. } => "BuildGradientMap",
            Operation::BrightnessScaleMap { .. } => "BrightnessScaleMap",
            Operation::Commit => "Commit",
            Operation::Revert => "Revert",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Operation::Blur { radius } => write!(f, "{name}({radius})"),
            Operation::Desaturate { percentage, human } => {
                write!(f, "{name}({percentage},{human})")
            }
            Operation::GrayScale { human } => write!(f, "{name}({human})"),
            Operation::Channel { selector } => write!(f, "{name}({selector})"),
            Operation::BuildGradientMap { threshold, angle } => {
                write!(f, "{name}({threshold},{angle})")
            }
            Operation::BrightnessScaleMap { threshold } => write!(f, "{name}({threshold})"),
            Operation::Commit | Operation::Revert => write!(f, "{name}()"),
        }
    }
}

/// Positional argument reader.
struct Args<'a> {
    op: &'a str,
    items: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn split(op: &'a str, raw: &'a str) -> Self {
        let items = if raw.trim().is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(str::trim).collect()
        };
        Self { op, items }
    }

    fn raw(&self, index: usize) -> Option<&'a str> {
        self.items.get(index).copied().filter(|s| !s.is_empty())
    }

    fn required(&self, index: usize, what: &str) -> Result<&'a str> {
        self.raw(index)
            .ok_or_else(|| ManipError::invalid(format!("{} @param {what} is required", self.op)))
    }

    fn number<T: FromStr>(&self, index: usize, what: &str) -> Result<T> {
        let raw = self.required(index, what)?;
        raw.parse().map_err(|_| {
            ManipError::invalid(format!("{} @param {what} must be numeric, got '{raw}'", self.op))
        })
    }

    fn flag(&self, index: usize, what: &str) -> Result<bool> {
        match self.raw(index) {
            None | Some("false") | Some("0") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some(other) => Err(ManipError::invalid(format!(
                "{} @param {what} must be true or false, got '{other}'",
                self.op
            ))),
        }
    }

    fn at_most(&self, count: usize) -> Result<()> {
        if self.items.len() > count {
            return Err(ManipError::invalid(format!(
                "{} takes at most {count} arguments, got {}",
                self.op,
                self.items.len()
            )));
        }
        Ok(())
    }
}

impl FromStr for Operation {
    type Err = ManipError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, raw_args) = match s.split_once('(') {
            Some((name, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(|| {
                    ManipError::invalid(format!("unterminated argument list in '{s}'"))
                })?;
                (name.trim(), inner)
            }
            None => (s, ""),
        };
        let args = Args::split(name, raw_args);

        let op = match name {
            "Blur" => {
                args.at_most(1)?;
                Operation::Blur {
                    radius: args.number(0, "radius")?,
                }
            }
            "Desaturate" => {
                args.at_most(2)?;
                Operation::Desaturate {
                    percentage: args.number(0, "percentage")?,
                    human: args.flag(1, "forHumans")?,
                }
            }
            "GrayScale" => {
                args.at_most(1)?;
                Operation::GrayScale {
                    human: args.flag(0, "forHumans")?,
                }
            }
            "Channel" => {
                args.at_most(1)?;
                Operation::Channel {
                    selector: args.required(0, "channel")?.parse()?,
                }
            }
            "BuildGradientMap" => {
                args.at_most(2)?;
                Operation::BuildGradientMap {
                    threshold: args.number(0, "threshold")?,
                    angle: args.number(1, "angle")?,
                }
            }
            "BrightnessScaleMap" => {
                args.at_most(1)?;
                Operation::BrightnessScaleMap {
                    threshold: args.number(0, "threshold")?,
                }
            }
            "Commit" | "Apply" => {
                args.at_most(0)?;
                Operation::Commit
            }
            "Revert" | "Reset" => {
                args.at_most(0)?;
                Operation::Revert
            }
            "" => return Err(ManipError::invalid("empty manipulation")),
            other => {
                return Err(ManipError::invalid(format!(
                    "manipulation '{other}' is not supported"
                )))
            }
        };
        Ok(op)
    }
}
