use crate::error::{GramError, Result};
use crate::model::Position;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where patches go on the background.
///
/// In task files this is either the string `"auto"` or a list of `[x, y]`
/// pairs, one per patch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PlacementRepr", into = "PlacementRepr")]
pub enum Placement {
    /// Compute a single-row layout with [`crate::layout::plan_layout`].
    #[default]
    Auto,
    /// Caller-supplied top-left positions, in patch order.
    Explicit(Vec<Position>),
}

impl From<Vec<Position>> for Placement {
    fn from(v: Vec<Position>) -> Self {
        Self::Explicit(v)
    }
}

impl FromStr for Placement {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PlacementRepr {
    Keyword(String),
    Positions(Vec<Position>),
}

impl TryFrom<PlacementRepr> for Placement {
    type Error = String;
    fn try_from(r: PlacementRepr) -> std::result::Result<Self, Self::Error> {
        match r {
            PlacementRepr::Keyword(k) => k
                .parse()
                .map_err(|_| format!("unknown placement {k:?}, expected \"auto\" or [[x, y], ...]")),
            PlacementRepr::Positions(p) => Ok(Self::Explicit(p)),
        }
    }
}

impl From<Placement> for PlacementRepr {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Auto => PlacementRepr::Keyword("auto".into()),
            Placement::Explicit(v) => PlacementRepr::Positions(v),
        }
    }
}

/// Options for delimited text arrays (`.txt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxtOptions {
    /// Column separator. `None` splits on any whitespace when reading and
    /// writes a single space.
    #[serde(default)]
    pub delimiter: Option<char>,
    /// Decimal places written per value.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for TxtOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            precision: default_precision(),
        }
    }
}

fn default_precision() -> usize {
    2
}

impl TxtOptions {
    pub fn delimiter(mut self, v: char) -> Self {
        self.delimiter = Some(v);
        self
    }
    pub fn precision(mut self, v: usize) -> Self {
        self.precision = v;
        self
    }

    /// Rejects delimiters that could be read back as part of a number.
    pub fn validate(&self) -> Result<()> {
        if self.precision > 17 {
            return Err(GramError::InvalidInput(format!(
                "precision {} exceeds the 17 significant digits of f64",
                self.precision
            )));
        }
        if let Some(d) = self.delimiter {
            if d.is_ascii_digit() || matches!(d, '.' | '-' | '+' | 'e' | 'E') {
                return Err(GramError::InvalidInput(format!(
                    "delimiter {d:?} is ambiguous with numeric text"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn separator(&self) -> String {
        self.delimiter.map(String::from).unwrap_or_else(|| " ".into())
    }
}
