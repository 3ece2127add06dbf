//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod clean;
pub(crate) mod common;
pub(crate) mod history;
pub(crate) mod init;
pub(crate) mod mark;
pub(crate) mod migrate_yoyo;
pub(crate) mod new;
pub(crate) mod prompt;
pub(crate) mod remove;
pub(crate) mod rollback;
pub(crate) mod squash;
pub(crate) mod unmark;
pub(crate) mod validate;
