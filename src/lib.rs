//! Verified line-level patching of smali files
//!
//! A [`patch::PatchRule`] decides, line by line, how one disassembled class gets rewritten and how
//! many edits that must add up to. The [`patch::PatchRunner`] streams the file through the rule and
//! only swaps the result in when the edit count is exactly right. [`rules`] holds the concrete
//! rewrites applied to `services.jar`.

pub mod patch;
pub mod rules;
pub mod smali;
