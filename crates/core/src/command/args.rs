//! Argument vector construction.

use std::path::Path;

use super::types::{Direction, ToolOption};

const INPUT_FLAG: &str = "-i";
const OUTPUT_FLAG: &str = "-o";

/// Builds `[subcommand, "-i", input, "-o", output, ...options]`.
///
/// Disabled options are skipped. Options keyed `-i` or `-o` (any case) are
/// dropped so the vector always holds exactly one input and one output.
pub fn build_arguments(
    direction: Direction,
    input: &Path,
    output: &Path,
    options: &[ToolOption],
) -> Vec<String> {
    let mut args = vec![
        direction.subcommand().to_string(),
        INPUT_FLAG.to_string(),
        input.to_string_lossy().to_string(),
        OUTPUT_FLAG.to_string(),
        output.to_string_lossy().to_string(),
    ];

    for option in options.iter().filter(|o| o.enabled) {
        if is_reserved(&option.key) {
            continue;
        }
        args.extend(option.as_arguments());
    }

    args
}

fn is_reserved(key: &str) -> bool {
    let key = key.trim();
    key.eq_ignore_ascii_case(INPUT_FLAG) || key.eq_ignore_ascii_case(OUTPUT_FLAG)
}

/// Renders an argument vector as a copy-pasteable shell line, for logs.
pub fn display_command(executable: &Path, args: &[String]) -> String {
    let mut line = quote(&executable.to_string_lossy());
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg));
    }
    line
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
