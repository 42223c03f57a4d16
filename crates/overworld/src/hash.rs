//! Stateless per-tile hash driving all terrain generation.
//!
//! Murmur3-style block mixing of the five inputs followed by the Murmur3
//! `fmix32` finalizer. The constants are part of the world format: changing
//! any of them silently changes every generated chunk for every seed.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const MIX_ADD: u32 = 0xe654_6b64;
const FMIX_1: u32 = 0x85eb_ca6b;
const FMIX_2: u32 = 0xc2b2_ae35;

/// 2^31, the normalisation divisor for the masked 31-bit result.
const NORM: f64 = 2_147_483_648.0;

#[inline]
fn mix_block(mut state: u32, value: i32) -> u32 {
    let mut k = value as u32;
    k = k.wrapping_mul(C1);
    k = k.rotate_left(15);
    k = k.wrapping_mul(C2);
    state ^= k;
    state = state.rotate_left(13);
    state.wrapping_mul(5).wrapping_add(MIX_ADD)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(FMIX_1);
    h ^= h >> 13;
    h = h.wrapping_mul(FMIX_2);
    h ^= h >> 16;
    h
}

/// Raw 32-bit hash of a chunk/local coordinate under `seed`.
#[inline]
pub fn tile_hash_u32(cx: i32, cy: i32, x: i32, y: i32, seed: u32) -> u32 {
    let mut h = seed;
    h = mix_block(h, cx);
    h = mix_block(h, cy);
    h = mix_block(h, x);
    h = mix_block(h, y);
    // Input length, as in Murmur3, so (cx, cy) = (a, b) and shifted
    // argument lists cannot collide trivially.
    h ^= 20;
    fmix32(h)
}

/// Reproducible pseudo-random value in `[0, 1)` for one tile.
#[inline]
pub fn tile_hash(cx: i32, cy: i32, x: i32, y: i32, seed: u32) -> f64 {
    (tile_hash_u32(cx, cy, x, y, seed) & 0x7fff_ffff) as f64 / NORM
}
