//! `shortmoji_core`：纯逻辑层，不直接接触 DOM / 终端 / 文件。
//!
//! 设计目标：
//! - **核心可复用**：浏览器插件（wasm）与 CLI 演示共享同一套逻辑
//! - **分层清晰**：session -> processor -> engine -> trigger / search -> region（宿主替换文本、定位光标）
//! - **宿主无关**：可编辑区域、下拉框、设置存储都以 trait 形式注入
pub mod caret;
pub mod config;
pub mod context;
pub mod engine;
pub mod index;
pub mod key_event;
pub mod memory;
pub mod model;
pub mod processor;
pub mod region;
pub mod search;
pub mod session;
pub mod trigger;
