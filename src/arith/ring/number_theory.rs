//! Integer helpers: primality, prime search and modular roots.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::RngCore;

/// Trial divisors, also used as Miller-Rabin witnesses.
const SMALL_PRIMES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Miller-Rabin test with the first twenty primes as witnesses.
///
/// Deterministic for `n < 3.3 * 10^24`, probabilistic above.
pub fn is_probable_prime(n: &BigUint) -> bool {
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    if *n < BigUint::from(2u32) {
        return false;
    }

    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for a in SMALL_PRIMES {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Largest prime `<= n`, if any.
pub fn prev_prime(n: &BigUint) -> Option<BigUint> {
    let two = BigUint::from(2u32);
    if *n < two {
        return None;
    }
    if *n == two {
        return Some(two);
    }
    let mut candidate = if n.is_even() { n - 1u32 } else { n.clone() };
    while candidate > two {
        if is_probable_prime(&candidate) {
            return Some(candidate);
        }
        candidate -= 2u32;
    }
    Some(two)
}

/// The `count` largest distinct primes `<= bound`, in decreasing order.
pub fn largest_primes(bound: &BigUint, count: usize) -> Option<Vec<BigUint>> {
    let mut primes = Vec::with_capacity(count);
    let mut next = bound.clone();
    while primes.len() < count {
        let prime = prev_prime(&next)?;
        next = &prime - 1u32;
        primes.push(prime);
    }
    Some(primes)
}

/// Samples a prime of exactly `bits` bits.
pub fn random_prime<R: RngCore + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    let top = BigUint::one() << (bits.max(2) - 1);
    loop {
        let candidate = rng.gen_biguint(bits.max(2)) | &top | BigUint::one();
        if is_probable_prime(&candidate) {
            return candidate;
        }
    }
}

/// Square root of `a` modulo the odd prime `p` (Tonelli-Shanks).
pub fn sqrt_mod(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(a);
    }
    let p_minus_one = p - 1u32;
    if a.modpow(&(&p_minus_one >> 1u32), p) != BigUint::one() {
        return None;
    }
    if (p % 4u32) == BigUint::from(3u32) {
        return Some(a.modpow(&((p + 1u32) >> 2u32), p));
    }

    let s = p_minus_one.trailing_zeros().unwrap_or(0);
    let q = &p_minus_one >> s;
    let mut z = BigUint::from(2u32);
    while z.modpow(&(&p_minus_one >> 1u32), p) != p_minus_one {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = a.modpow(&q, p);
    let mut r = a.modpow(&((&q + 1u32) >> 1u32), p);
    while !t.is_one() {
        let mut i = 0;
        let mut probe = t.clone();
        while !probe.is_one() {
            probe = (&probe * &probe) % p;
            i += 1;
            if i == m {
                return None;
            }
        }
        let b = c.modpow(&(BigUint::one() << (m - i - 1)), p);
        m = i;
        c = (&b * &b) % p;
        t = (&t * &c) % p;
        r = (&r * &b) % p;
    }
    Some(r)
}

/// A primitive cube root of unity modulo `p`, which exists iff `p ≡ 1 (mod 3)`.
pub fn cube_root_of_unity(p: &BigUint) -> Option<BigUint> {
    if (p % 3u32) != BigUint::one() {
        return None;
    }
    let exponent = (p - 1u32) / 3u32;
    let mut g = BigUint::from(2u32);
    while &g < p {
        let w = g.modpow(&exponent, p);
        if !w.is_one() {
            return Some(w);
        }
        g += 1u32;
    }
    None
}

/// Cube root of `a` modulo the prime `p` (Adleman-Manders-Miller).
///
/// For `p ≡ 1 (mod 3)` the returned root is one of three; the others are
/// obtained by multiplying with a primitive cube root of unity.
pub fn cube_root_mod(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(a);
    }
    let three = BigUint::from(3u32);
    if *p == three {
        return Some(a);
    }
    let p_mod_3 = p % 3u32;
    if p_mod_3 == BigUint::from(2u32) {
        return Some(a.modpow(&((p * 2u32 - 1u32) / 3u32), p));
    }
    if p_mod_3.is_zero() {
        return None;
    }

    let p_minus_one = p - 1u32;
    if !a.modpow(&(&p_minus_one / 3u32), p).is_one() {
        return None;
    }

    // p - 1 = 3^s * t with 3 not dividing t
    let mut s = 0u32;
    let mut t = p_minus_one.clone();
    while (&t % 3u32).is_zero() {
        t /= 3u32;
        s += 1;
    }

    let mut z = BigUint::from(2u32);
    while z.modpow(&(&p_minus_one / 3u32), p).is_one() {
        z += 1u32;
    }
    // c generates the Sylow 3-subgroup
    let c = z.modpow(&t, p);
    let omega = c.modpow(&three.pow(s - 1), p);
    let omega_sq = (&omega * &omega) % p;

    let e = if (&t % 3u32) == BigUint::from(2u32) {
        (&t + 1u32) / 3u32
    } else {
        (&t * 2u32 + 1u32) / 3u32
    };
    let r = a.modpow(&e, p);
    // r^3 / a lies in the Sylow 3-subgroup; find k with c^k = a / r^3
    let target = (&a * (&r * &r * &r % p).modinv(p)?) % p;
    let c_inv = c.modinv(p)?;

    let mut k = BigUint::zero();
    let mut digit_weight = BigUint::one();
    for i in 0..s {
        let residue = (&target * c_inv.modpow(&k, p)) % p;
        let probe = residue.modpow(&three.pow(s - 1 - i), p);
        let digit = if probe.is_one() {
            0u32
        } else if probe == omega {
            1
        } else if probe == omega_sq {
            2
        } else {
            return None;
        };
        k += &digit_weight * digit;
        digit_weight *= 3u32;
    }

    if !(&k % 3u32).is_zero() {
        return None;
    }
    let h = c.modpow(&(k / 3u32), p);
    let root = (r * h) % p;
    (root.modpow(&three, p) == a).then_some(root)
}
