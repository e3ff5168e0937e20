//! Types for the command module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// chdman subcommand for the image to CHD directions.
pub const CREATE_SUBCOMMAND: &str = "createcd";
/// chdman subcommand for the CHD to image directions.
pub const EXTRACT_SUBCOMMAND: &str = "extractcd";

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Single-track ISO to CHD
    IsoToChd,
    /// BIN/CUE to CHD
    CueToChd,
    /// Dreamcast GDI to CHD
    GdiToChd,
    /// CHD to raw ISO
    ChdToIso,
    /// CHD to BIN/CUE
    ChdToCue,
    /// CHD to GDI
    ChdToGdi,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Self::IsoToChd,
        Self::CueToChd,
        Self::GdiToChd,
        Self::ChdToIso,
        Self::ChdToCue,
        Self::ChdToGdi,
    ];

    /// Whether this direction compresses into a CHD archive.
    pub fn is_to_archive(&self) -> bool {
        matches!(self, Self::IsoToChd | Self::CueToChd | Self::GdiToChd)
    }

    /// The chdman subcommand for this direction.
    pub fn subcommand(&self) -> &'static str {
        if self.is_to_archive() {
            CREATE_SUBCOMMAND
        } else {
            EXTRACT_SUBCOMMAND
        }
    }

    /// Snake-case identifier, as used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsoToChd => "iso_to_chd",
            Self::CueToChd => "cue_to_chd",
            Self::GdiToChd => "gdi_to_chd",
            Self::ChdToIso => "chd_to_iso",
            Self::ChdToCue => "chd_to_cue",
            Self::ChdToGdi => "chd_to_gdi",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::IsoToChd => "ISO -> CHD",
            Self::CueToChd => "CUE -> CHD",
            Self::GdiToChd => "GDI -> CHD",
            Self::ChdToIso => "CHD -> ISO",
            Self::ChdToCue => "CHD -> CUE",
            Self::ChdToGdi => "CHD -> GDI",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IsoToChd => "Convert single-track ISO to compressed CHD",
            Self::CueToChd => "Convert BIN/CUE (multi-track) to CHD",
            Self::GdiToChd => "Convert Dreamcast GDI to CHD",
            Self::ChdToIso => "Extract CHD to raw ISO",
            Self::ChdToCue => "Extract CHD to BIN/CUE",
            Self::ChdToGdi => "Extract CHD to Dreamcast GDI",
        }
    }

    /// File extension expected on inputs.
    pub fn input_extension(&self) -> &'static str {
        match self {
            Self::IsoToChd => "iso",
            Self::CueToChd => "cue",
            Self::GdiToChd => "gdi",
            Self::ChdToIso | Self::ChdToCue | Self::ChdToGdi => "chd",
        }
    }

    /// File extension given to derived outputs.
    pub fn output_extension(&self) -> &'static str {
        match self {
            Self::IsoToChd | Self::CueToChd | Self::GdiToChd => "chd",
            Self::ChdToIso => "iso",
            Self::ChdToCue => "cue",
            Self::ChdToGdi => "gdi",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown direction name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown conversion direction: {0}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

/// How an option is presented and turned into arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "choices", rename_all = "snake_case")]
pub enum OptionKind {
    /// Bare switch without a value (e.g. `-f`).
    Flag,
    /// Free-form value.
    Text,
    /// Value picked from a fixed list.
    Choice(Vec<String>),
}

impl OptionKind {
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }
}

/// A user-selectable chdman option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolOption {
    /// Option key as passed to chdman, e.g. `-c`.
    pub key: String,
    /// Option value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Help text.
    #[serde(default)]
    pub help: String,
    /// Kind of option.
    #[serde(default = "default_kind")]
    pub kind: OptionKind,
    /// Whether the user enabled this option.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_kind() -> OptionKind {
    OptionKind::Text
}

fn default_enabled() -> bool {
    true
}

impl ToolOption {
    /// An enabled valued option.
    pub fn valued(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            help: String::new(),
            kind: OptionKind::Text,
            enabled: true,
        }
    }

    /// An enabled flag option.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            help: String::new(),
            kind: OptionKind::Flag,
            enabled: true,
        }
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the kind.
    pub fn with_kind(mut self, kind: OptionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Arguments this option contributes on its own.
    ///
    /// A non-empty value gives `[key, value]`, a flag gives `[key]`, and a
    /// valued option left empty gives nothing.
    pub fn as_arguments(&self) -> Vec<String> {
        match self.value.as_deref() {
            Some(value) if !value.is_empty() => vec![self.key.clone(), value.to_string()],
            _ if self.kind.is_flag() => vec![self.key.clone()],
            _ => Vec::new(),
        }
    }

    /// Parses `KEY` or `KEY=VALUE` as typed on the command line.
    pub fn parse_cli(spec: &str) -> Self {
        match spec.split_once('=') {
            Some((key, value)) => Self::valued(key.trim(), value.trim()),
            None => Self::flag(spec.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommand_per_direction_class() {
        for direction in Direction::ALL {
            let expected = if direction.is_to_archive() {
                "createcd"
            } else {
                "extractcd"
            };
            assert_eq!(direction.subcommand(), expected);
        }
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Direction::CueToChd.input_extension(), "cue");
        assert_eq!(Direction::CueToChd.output_extension(), "chd");
        assert_eq!(Direction::ChdToGdi.input_extension(), "chd");
        assert_eq!(Direction::ChdToGdi.output_extension(), "gdi");
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("cue_to_chd".parse::<Direction>(), Ok(Direction::CueToChd));
        assert_eq!("CHD-TO-ISO".parse::<Direction>(), Ok(Direction::ChdToIso));
        assert!("zip_to_chd".parse::<Direction>().is_err());
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(direction));
        }
    }

    #[test]
    fn test_direction_serde_name() {
        let json = serde_json::to_string(&Direction::GdiToChd).unwrap();
        assert_eq!(json, "\"gdi_to_chd\"");
    }

    #[test]
    fn test_option_arguments() {
        assert_eq!(ToolOption::valued("-c", "cdlz").as_arguments(), vec!["-c", "cdlz"]);
        assert_eq!(ToolOption::flag("-f").as_arguments(), vec!["-f"]);
        assert!(ToolOption::valued("-hs", "").as_arguments().is_empty());

        let mut unset = ToolOption::valued("-ob", "");
        unset.value = None;
        assert!(unset.as_arguments().is_empty());
    }

    #[test]
    fn test_flag_with_value_passes_value() {
        let mut option = ToolOption::flag("-v");
        option.value = Some("2".into());
        assert_eq!(option.as_arguments(), vec!["-v", "2"]);
    }

    #[test]
    fn test_parse_cli() {
        assert_eq!(ToolOption::parse_cli("-c=cdzl"), ToolOption::valued("-c", "cdzl"));
        assert_eq!(ToolOption::parse_cli("-f"), ToolOption::flag("-f"));
    }

    #[test]
    fn test_option_deserialize_defaults() {
        let option: ToolOption = serde_json::from_str(r#"{"key": "-hs", "value": "2048"}"#).unwrap();
        assert!(option.enabled);
        assert_eq!(option.kind, OptionKind::Text);

        let flag: ToolOption =
            serde_json::from_str(r#"{"key": "-f", "kind": {"type": "flag"}}"#).unwrap();
        assert_eq!(flag.kind, OptionKind::Flag);
    }
}
