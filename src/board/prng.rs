/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Seed state for the Zobrist keys. Changing these changes every [`super::ZobristKey`].
const SEEDS: [u64; 4] = [
    0x91C5AB3CEBFD5A71,
    0x06BA253B9DD897CD,
    0x8015B5E59CC275E9,
    0xF8F427FC5411DE53,
];

/// A `const` pseudo-random number generator using the xoshiro256** algorithm.
///
/// See <https://prng.di.unimi.it/xoshiro256starstar.c>. Only used to fill tables at compile time,
/// so every call consumes `self` and hands back the advanced state.
#[derive(Clone, Copy, Debug)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(SEEDS)
    }

    /// Returns `(next, advanced_state)`.
    pub const fn get_next_const(self) -> (u64, Self) {
        let mut s = self.0;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        (result, Self(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_does_not_repeat_early() {
        let mut prng = XoShiRo::new();
        let mut seen = Vec::new();

        for _ in 0..1024 {
            let value;
            (value, prng) = prng.get_next_const();
            assert!(!seen.contains(&value));
            seen.push(value);
        }
    }
}
