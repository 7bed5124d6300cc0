// Purpose: the render side. Sample bank, voice pool and the mixing engine.
// Everything reachable from `PolySampler::render_block` is realtime-safe.

pub mod bank;
pub mod message;
pub mod poly;
pub mod pool;
pub mod voice;
