//! CLI subcommands

pub mod check;
pub mod compress;
pub mod delete;
pub mod list;
pub mod new;
pub mod show;
