//! Command module: conversion directions, chdman options and argument vectors.

mod args;
mod catalog;
mod types;

pub use args::{build_arguments, display_command};
pub use catalog::{add_option, codec_description, CD_CODECS};
pub use types::{
    Direction, OptionKind, ToolOption, UnknownDirection, CREATE_SUBCOMMAND, EXTRACT_SUBCOMMAND,
};
