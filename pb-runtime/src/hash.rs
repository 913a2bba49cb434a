//! The `hashCode` avalanche mixer (spec.md §4.4.1.b).
//!
//! Generated `Hash` impls fold each field into a 32-bit accumulator using
//! the ordinary polynomial-31 rule, then run the accumulator through this
//! fixed bit-mixing sequence once. The shift constants are part of the wire
//! contract: two equal model values built in different processes must
//! produce the same hash, so this sequence must never change.

/// Applies the avalanche mix to `result` (widened to 64 bits for the shifts)
/// and truncates back to 32 bits.
pub fn avalanche(result: i32) -> i32 {
    let mut h = result as i64;
    h = h.wrapping_add(h << 30);
    h ^= (h as u64 >> 27) as i64;
    h = h.wrapping_add(h << 16);
    h ^= (h as u64 >> 20) as i64;
    h = h.wrapping_add(h << 5);
    h ^= (h as u64 >> 18) as i64;
    h = h.wrapping_add(h << 10);
    h ^= (h as u64 >> 24) as i64;
    h = h.wrapping_add(h << 30);
    h as i32
}

/// Folds one more field's hash into the running `result`, using the
/// standard `result * 31 + fieldHash` polynomial combination.
pub fn mix(result: i32, field_hash: i32) -> i32 {
    result.wrapping_mul(31).wrapping_add(field_hash)
}

/// The per-byte polynomial-31 fold generated `STRING`/`BYTES` field hashers
/// use (the same shape `java.lang.String.hashCode()` uses, one `mix` per
/// byte rather than per character).
pub fn hash_bytes(data: &[u8]) -> i32 {
    let mut result = 0i32;
    for &byte in data {
        result = mix(result, byte as i32);
    }
    result
}

/// `Long.hashCode()`-style fold of a 64-bit value into 32 bits, used by
/// generated hashers for `INT64`/`SINT64`/`UINT64`/`FIXED64`/`SFIXED64`
/// fields.
pub fn hash_long(value: i64) -> i32 {
    (value ^ ((value as u64) >> 32) as i64) as i32
}
