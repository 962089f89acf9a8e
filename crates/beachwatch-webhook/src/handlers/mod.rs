pub mod options;
pub mod webhook;
