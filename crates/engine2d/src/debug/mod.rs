//! Debug visualization
//!
//! Collider outlines are produced as plain render submissions so any backend
//! (or a test) can consume them through [`RenderSink`].

pub mod collider_debug;

pub use collider_debug::{
    collider_debug_submissions, RenderSink, RenderSubmission, CIRCLE_VERTEX_ARRAY,
    DEBUG_PIPELINE, LINE_VERTEX_ARRAY,
};
