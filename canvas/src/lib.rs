//! Measurement engine for flooring takeoffs on blueprint images.
//!
//! This crate is compiled to WebAssembly and runs in the browser. The user
//! draws rectangles, circles and triangles over an uploaded blueprint and
//! types in their real dimensions, or calibrates the scale from two reference
//! points and traces free-form room outlines. The engine keeps the committed
//! measurements, their running totals, and a read-only snapshot for the chat
//! assistant. The host JavaScript layer wires DOM events in, shows the forms
//! the engine asks for, and displays the totals carried by
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`input`] | Modes, the gesture state machine, and the input request/reply contract |
//! | [`selection`] | Committed selections, calibrated polygons and their totals |
//! | [`calibrate`] | Two-point scale calibration |
//! | [`snapshot`] | Read-only export for the chat assistant |
//! | [`viewport`] | Display, normalized and device coordinate spaces |
//! | [`geom`] | Distance and area formulas |
//! | [`render`] | Draw-list construction and Canvas2D painting |
//! | [`consts`] | Shared numeric and style constants |

pub mod calibrate;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod input;
pub mod render;
pub mod selection;
pub mod snapshot;
pub mod viewport;
