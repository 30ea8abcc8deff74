//! Universal hash families `h(x) = (a*x + b) mod c` over a shared prime modulus.

use crate::error::PipelineError;
use rand::Rng;

/// Upper bound on candidates examined while searching for the next prime.
const MAX_PRIME_SEARCH: u64 = 1 << 20;

/// Trial division up to `floor(sqrt(num)) + 1`.
pub fn is_prime(num: u64) -> bool {
    if num < 2 {
        return false;
    }
    if num == 2 {
        return true;
    }
    let limit = (num as f64).sqrt() as u64 + 1;
    (2..=limit.min(num - 1)).all(|i| num % i != 0)
}

/// Smallest prime strictly greater than `n`.
pub fn next_prime_above(n: u64) -> Result<u64, PipelineError> {
    let mut candidate = n;
    for _ in 0..MAX_PRIME_SEARCH {
        candidate = candidate
            .checked_add(1)
            .ok_or(PipelineError::Domain { bound: n })?;
        if is_prime(candidate) {
            return Ok(candidate);
        }
    }
    Err(PipelineError::Domain { bound: n })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashFunction {
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

impl HashFunction {
    #[inline]
    pub fn hash(&self, x: u64) -> u64 {
        debug_assert!(x < self.c, "{x} is outside the domain of modulus {}", self.c);
        ((self.a as u128 * x as u128 + self.b as u128) % self.c as u128) as u64
    }
}

/// Independent hash functions sharing the smallest prime modulus above a domain bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashFamily {
    functions: Vec<HashFunction>,
    modulus: u64,
}

impl HashFamily {
    /// Draws `count` functions able to hash every value in `[0, domain]`.
    ///
    /// `a` and `b` are uniform in `[1, c-1]` where `c` is the smallest prime above `domain`.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        domain: u64,
        count: usize,
    ) -> Result<Self, PipelineError> {
        let modulus = next_prime_above(domain)?;
        let functions = (0..count)
            .map(|_| HashFunction {
                a: rng.gen_range(1..modulus),
                b: rng.gen_range(1..modulus),
                c: modulus,
            })
            .collect();
        Ok(Self { functions, modulus })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, i: usize) -> &HashFunction {
        &self.functions[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HashFunction> {
        self.functions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn primality() {
        for p in [2, 3, 5, 17, 601, 7919] {
            assert!(is_prime(p), "{p} is prime");
        }
        for n in [0, 1, 4, 9, 25, 100, 7917] {
            assert!(!is_prime(n), "{n} is composite");
        }
    }

    #[test]
    fn next_prime_is_strictly_above() {
        assert_eq!(next_prime_above(1), Ok(2));
        assert_eq!(next_prime_above(2), Ok(3));
        assert_eq!(next_prime_above(10), Ok(11));
        assert_eq!(next_prime_above(11), Ok(13));
        assert_eq!(next_prime_above(14), Ok(17));
        assert_eq!(next_prime_above(600), Ok(601));
    }

    #[test]
    fn next_prime_overflow_is_a_domain_error() {
        assert_eq!(
            next_prime_above(u64::MAX),
            Err(PipelineError::Domain { bound: u64::MAX })
        );
    }

    #[test]
    fn coefficients_are_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let family = HashFamily::generate(&mut rng, 100, 256).unwrap();
        assert_eq!(family.modulus(), 101);
        assert_eq!(family.len(), 256);
        for f in family.iter() {
            assert_eq!(f.c, 101);
            assert!((1..101).contains(&f.a));
            assert!((1..101).contains(&f.b));
            for x in [0, 1, 50, 100] {
                assert!(f.hash(x) < 101);
            }
        }
    }

    #[test]
    fn same_seed_same_family() {
        let a = HashFamily::generate(&mut StdRng::seed_from_u64(11), 1_000, 64).unwrap();
        let b = HashFamily::generate(&mut StdRng::seed_from_u64(11), 1_000, 64).unwrap();
        let c = HashFamily::generate(&mut StdRng::seed_from_u64(12), 1_000, 64).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_is_a_permutation_of_the_field() {
        let f = HashFunction { a: 3, b: 5, c: 7 };
        let mut images: Vec<u64> = (0..7).map(|x| f.hash(x)).collect();
        images.sort_unstable();
        assert_eq!(images, (0..7).collect::<Vec<_>>());
    }
}
