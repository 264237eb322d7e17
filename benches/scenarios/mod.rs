//! Real-world scenario benchmarks.
//!
//! A full pool of sounding voices, and the press/release traffic that drives
//! stealing and restitution.

mod allocator;
mod render;

pub use allocator::bench_allocator;
pub use render::bench_render;
