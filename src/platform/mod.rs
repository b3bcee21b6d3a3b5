//! Platform bindings
//!
//! The carousel core only talks to `AnimationTarget` and `CardHandle`. The
//! browser binding implements both over `web_sys` and drives the frame loop;
//! native builds use the headless `sim` backend instead.

#[cfg(target_arch = "wasm32")]
pub mod web;
