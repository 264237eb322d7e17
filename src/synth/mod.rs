// Purpose: note sources, voice binding, allocation policy, parameter mapping
// Everything here runs on the control task; the renderer only sees snapshots

pub mod allocator;
pub mod mapper;
pub mod message;
pub mod pool;
pub mod quantizer;
pub mod source;
