//! Deterministic 32-bit hashing and the two probe derivations built on it.
//!
//! Both tables feed a key's raw bytes through a seedless FNV-1a hasher so
//! placements are reproducible across runs and across save/load. Keys go
//! through [`KeyBytes`] rather than `Hash`: `impl Hash for str` appends a
//! terminator byte, which would move every string key off its FNV-1a slot.
//! The hasher is a type parameter on every table; tests swap in a constant
//! hasher to force collisions.

use core::hash::{BuildHasher, Hasher};

/// Capacity used when none (or zero) is requested.
pub const DEFAULT_CAPACITY: usize = 101;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over raw bytes.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut h = Fnv32Hasher::default();
    h.write(bytes);
    h.state
}

#[derive(Clone, Copy, Debug)]
pub struct Fnv32Hasher {
    state: u32,
}

impl Default for Fnv32Hasher {
    fn default() -> Self {
        Self {
            state: FNV32_OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv32Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u32::from(b);
            self.state = self.state.wrapping_mul(FNV32_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

/// Seedless builder for [`Fnv32Hasher`]; the default hasher of every table.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildFnv32;

impl BuildHasher for BuildFnv32 {
    type Hasher = Fnv32Hasher;

    fn build_hasher(&self) -> Fnv32Hasher {
        Fnv32Hasher::default()
    }
}

/// Keys hashed as their raw byte representation, with no length prefix or
/// terminator. A type and every type it `Borrow`s as must feed identical
/// bytes.
pub trait KeyBytes {
    fn write_key<H: Hasher>(&self, state: &mut H);
}

impl KeyBytes for [u8] {
    #[inline]
    fn write_key<H: Hasher>(&self, state: &mut H) {
        state.write(self);
    }
}

impl KeyBytes for Vec<u8> {
    #[inline]
    fn write_key<H: Hasher>(&self, state: &mut H) {
        state.write(self);
    }
}

impl KeyBytes for str {
    #[inline]
    fn write_key<H: Hasher>(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl KeyBytes for String {
    #[inline]
    fn write_key<H: Hasher>(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl<T: ?Sized + KeyBytes> KeyBytes for &T {
    #[inline]
    fn write_key<H: Hasher>(&self, state: &mut H) {
        (**self).write_key(state);
    }
}

macro_rules! int_key_bytes {
    ($($t:ty),*) => {$(
        impl KeyBytes for $t {
            #[inline]
            fn write_key<H: Hasher>(&self, state: &mut H) {
                state.write(&self.to_le_bytes());
            }
        }
    )*};
}

int_key_bytes!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// The shared 32-bit hash of `key` under `builder`. With [`BuildFnv32`] this
/// is exactly `fnv1a_32` of the key's bytes.
#[inline]
pub fn hash32<S, Q>(builder: &S, key: &Q) -> u32
where
    S: BuildHasher,
    Q: ?Sized + KeyBytes,
{
    let mut state = builder.build_hasher();
    key.write_key(&mut state);
    state.finish() as u32
}

/// Start slot and stride of a double-hashing probe sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DoubleProbe {
    pub start: usize,
    pub stride: usize,
}

impl DoubleProbe {
    /// `start = h mod cap`, `stride = h mod (cap - 1)` with zero forced to 1.
    /// `capacity` must be non-zero.
    pub fn new(hash: u32, capacity: usize) -> Self {
        let h = hash as usize;
        let stride = if capacity > 1 { h % (capacity - 1) } else { 0 };
        Self {
            start: h % capacity,
            stride: stride.max(1),
        }
    }

    /// Slot indices `(start + i * stride) mod capacity` for `i in 0..capacity`.
    pub fn sequence(self, capacity: usize) -> impl Iterator<Item = usize> {
        let mut index = self.start;
        (0..capacity).map(move |_| {
            let current = index;
            index = (index + self.stride) % capacity;
            current
        })
    }
}

/// The two canonical homes of a key in a cuckoo table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CuckooHomes {
    pub first: usize,
    pub second: usize,
}

impl CuckooHomes {
    /// `first = h mod cap`, `second = (h / cap) mod cap`. `capacity` must be
    /// non-zero.
    pub fn new(hash: u32, capacity: usize) -> Self {
        let h = hash as usize;
        Self {
            first: h % capacity,
            second: (h / capacity) % capacity,
        }
    }
}

/// Smallest prime capacity that holds `len` entries at no more than half
/// load, never below [`DEFAULT_CAPACITY`].
pub fn capacity_for(len: usize) -> usize {
    let mut n = DEFAULT_CAPACITY.max(len.saturating_mul(2));
    while !is_prime(n) {
        n += 1;
    }
    n
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn fnv1a_known_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn hash32_is_deterministic_and_order_sensitive() {
        let a = hash32(&BuildFnv32, "ab");
        assert_eq!(a, hash32(&BuildFnv32, "ab"));
        assert_ne!(a, hash32(&BuildFnv32, "ba"));
        // String and str hash identically.
        assert_eq!(a, hash32(&BuildFnv32, &"ab".to_string()));
    }

    #[test]
    fn hash32_is_plain_fnv1a_of_key_bytes() {
        assert_eq!(hash32(&BuildFnv32, "a"), fnv1a_32(b"a"));
        assert_eq!(hash32(&BuildFnv32, "a"), 0xe40c_292c);
        assert_eq!(hash32(&BuildFnv32, ""), 0x811c_9dc5);
        assert_eq!(hash32(&BuildFnv32, &b"foobar".to_vec()), 0xbf9c_f968);
        assert_eq!(hash32(&BuildFnv32, &7u32), fnv1a_32(&[7, 0, 0, 0]));
        // "a" starts its path at slot 10 of a 101-slot table.
        assert_eq!(DoubleProbe::new(hash32(&BuildFnv32, "a"), 101).start, 10);
    }

    #[test]
    fn stride_is_never_zero() {
        // h mod (cap - 1) == 0 for every multiple of cap - 1.
        for h in [0u32, 4, 8, 400] {
            assert_eq!(DoubleProbe::new(h, 5).stride, 1);
        }
        assert_eq!(DoubleProbe::new(7, 1), DoubleProbe { start: 0, stride: 1 });
    }

    #[test]
    fn prime_capacity_probe_visits_every_slot() {
        let probe = DoubleProbe::new(12345, 101);
        let seen: BTreeSet<usize> = probe.sequence(101).collect();
        assert_eq!(seen.len(), 101);
    }

    #[test]
    fn cuckoo_homes_use_distinct_derivations() {
        let homes = CuckooHomes::new(1234, 10);
        assert_eq!(homes, CuckooHomes { first: 4, second: 3 });
    }

    #[test]
    fn capacity_for_rounds_to_prime() {
        assert_eq!(capacity_for(0), 101);
        assert_eq!(capacity_for(60), 127);
        assert!(is_prime(capacity_for(1000)));
    }
}
