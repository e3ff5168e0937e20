//! Known chdman options per direction.

use super::types::{Direction, OptionKind, ToolOption};

/// CD compression codecs accepted by `createcd -c`.
pub const CD_CODECS: [&str; 4] = ["cd", "cdlz", "cdzl", "cdfl"];

/// One-line description of a CD compression codec.
pub fn codec_description(codec: &str) -> Option<&'static str> {
    match codec {
        "cd" => Some("Standard CD-ROM (recommended) - Best compatibility, fast compression"),
        "cdlz" => Some("CD-ROM + LZMA - Smaller size, slower compression, good for archival"),
        "cdzl" => Some("CD-ROM + Zlib - Balanced size/speed, good general purpose"),
        "cdfl" => Some("CD-ROM + FLAC - Best for audio-heavy games, preserves audio quality"),
        _ => None,
    }
}

fn codec_option() -> ToolOption {
    ToolOption::valued("-c", "cd")
        .with_help("Compression codec")
        .with_kind(OptionKind::Choice(
            CD_CODECS.iter().map(|c| c.to_string()).collect(),
        ))
}

fn force_option() -> ToolOption {
    ToolOption::flag("-f").with_help("Force overwrite existing files")
}

impl Direction {
    /// Options chdman understands for this direction, all disabled.
    ///
    /// Valued entries carry their default value, empty when there is none.
    pub fn known_options(&self) -> Vec<ToolOption> {
        let options = if self.is_to_archive() {
            vec![
                codec_option(),
                ToolOption::valued("-hs", "").with_help("Hunk size in bytes (e.g., 2048, 4096)"),
                force_option(),
                ToolOption::flag("-np").with_help("Proceed even if not perfect"),
            ]
        } else {
            let mut options = vec![force_option()];
            if matches!(self, Self::ChdToCue | Self::ChdToGdi) {
                options.push(ToolOption::valued("-ob", "").with_help("Output BIN filename"));
            }
            options
        };

        options.into_iter().map(|o| o.enabled(false)).collect()
    }

    /// Looks up a known option by key, returned enabled.
    pub fn known_option(&self, key: &str) -> Option<ToolOption> {
        self.known_options()
            .into_iter()
            .find(|o| o.key == key)
            .map(|o| o.enabled(true))
    }
}

/// Adds `option` to `options` unless an option with the same key is present.
///
/// Returns whether the option was added.
pub fn add_option(options: &mut Vec<ToolOption>, option: ToolOption) -> bool {
    if options.iter().any(|o| o.key == option.key) {
        return false;
    }
    options.push(option);
    true
}
