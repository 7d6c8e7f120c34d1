//! Platform abstraction layer
//!
//! Browser bindings live in `web` (wasm32 only). Native hosts use the core
//! directly with `MemoryStore` and `NullCues`.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Seed for a new session's RNG
#[cfg(target_arch = "wasm32")]
pub fn entropy_seed() -> u64 {
    let now = js_sys::Date::now() as u64;
    let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
    now.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (noise << 32)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn entropy_seed() -> u64 {
    use rand::Rng;
    rand::rng().random()
}
