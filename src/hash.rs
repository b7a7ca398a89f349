//! Client identity hashing.
//!
//! The lease table keys clients by a 32-bit hash of their identifier bytes
//! (the client-id option when present, otherwise the hardware address). The
//! hash is a seeded cyclic-rotation rolling hash: fast, deterministic, and
//! explicitly not cryptographic. At the scale this server targets (tens of
//! clients) collisions are accepted as a trade-off; two colliding clients
//! are treated as one and share a lease slot.

/// Non-zero seed so that even an empty identifier never hashes to the
/// lease table's empty-slot sentinel (0).
const HASH_SEED: u32 = 0xa5a5_5a5a;

/// Hashes a variable-length client identifier into a lease table key.
///
/// Order-sensitive: for each input byte the accumulator is rotated right by
/// 7 bits, xor-combined with the byte, and added back in. The input length
/// is not mixed in beyond iterating the bytes, so inputs of different
/// lengths can legitimately collide.
pub fn client_hash(data: &[u8]) -> u32 {
    let mut hash = HASH_SEED;
    for &byte in data {
        hash = hash.wrapping_add(hash.rotate_right(7) ^ u32::from(byte));
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_seed() {
        assert_eq!(client_hash(&[]), 0xa5a5_5a5a);
    }

    #[test]
    fn known_vectors() {
        assert_eq!(client_hash(b"abc"), 0x6919_d3c6);
        assert_eq!(
            client_hash(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            0xdce6_3a68
        );
        assert_eq!(
            client_hash(&[0x01, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            0xbcd2_c824
        );
    }

    #[test]
    fn deterministic() {
        let id = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
        assert_eq!(client_hash(&id), client_hash(&id));
        assert_eq!(client_hash(&id), 0x66eb_6475);
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(client_hash(&[1, 2, 3]), client_hash(&[3, 2, 1]));
    }

    #[test]
    fn distribution_over_random_ids() {
        // xorshift32 gives us a cheap deterministic stream of MAC-like IDs.
        let mut state = 0x1234_5678u32;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        const BUCKETS: usize = 16;
        const SAMPLES: usize = 20_000;
        let mut buckets = [0usize; BUCKETS];
        for _ in 0..SAMPLES {
            let a = next().to_be_bytes();
            let b = next().to_be_bytes();
            let id = [a[0], a[1], a[2], a[3], b[0], b[1]];
            buckets[client_hash(&id) as usize % BUCKETS] += 1;
        }

        // Each bucket should hold roughly 1/16th of the samples; allow a
        // generous 20% relative error.
        let expected = SAMPLES / BUCKETS;
        for &count in &buckets {
            assert!(count > expected * 8 / 10, "bucket underfull: {count}");
            assert!(count < expected * 12 / 10, "bucket overfull: {count}");
        }
    }
}
