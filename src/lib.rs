//! treeviz: client for a remote binary tree service
//!
//! Keeps a local view of one tree in sync with the service, lays the
//! snapshot out on a plane and draws it onto a canvas.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
