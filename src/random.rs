//! Sources of uniformly distributed random data.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{trace, warn};

use crate::{Error, ErrorRepr};

/// How many draws in a row a rejection loop may discard before giving up on the source.
///
/// Every rejection loop in this crate discards a draw with probability below 1/2, so a healthy
/// source hits this limit with probability below 2^-128.
pub(crate) const MAX_CONSECUTIVE_REJECTIONS: u32 = 128;

/// A cryptographically secure source of uniformly distributed bytes.
///
/// The generators in this crate only depend on this trait, never on a particular entropy source.
/// Sharing a source between threads is up to the implementation; the generators themselves hold
/// no mutable state.
pub trait UniformRandomSource {
    /// Fill `dest` entirely with random bytes, or fail.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error>;

    /// Draw 4 bytes and read them as a big-endian `u32`.
    fn next_u32(&mut self) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Draw 8 bytes and read them as a big-endian `u64`.
    fn next_u64(&mut self) -> Result<u64, Error> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// A uniformly distributed integer in `[0, n)`.
    ///
    /// Draws that fall in the incomplete last "copy" of `[0, n)` within the 64-bit range are
    /// rejected and re-drawn, so the result is unbiased even when `n` is not a power of two.
    fn uniform_below(&mut self, n: u64) -> Result<u64, Error> {
        if n == 0 {
            return Err(ErrorRepr::EmptyRange.into());
        }
        if n == 1 {
            return Ok(0);
        }
        // 2^64 mod n: the values below this are the ones that would favour small results.
        let zone = n.wrapping_neg() % n;
        for _ in 0..MAX_CONSECUTIVE_REJECTIONS {
            let v = self.next_u64()?;
            if v >= zone {
                return Ok(v % n);
            }
            trace!(bound = n, "rejected biased draw");
        }
        warn!(
            bound = n,
            "random source exhausted the rejection budget while picking an index"
        );
        Err(ErrorRepr::IndexDrawExhausted {
            rejected: MAX_CONSECUTIVE_REJECTIONS,
            bound: n,
        }
        .into())
    }
}

impl<S: UniformRandomSource + ?Sized> UniformRandomSource for &mut S {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

impl<S: UniformRandomSource + ?Sized> UniformRandomSource for Box<S> {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

/// Adapts any `rand` generator that is marked [`CryptoRng`] into a [`UniformRandomSource`].
///
/// Failures reported by [`RngCore::try_fill_bytes`] surface as
/// [`ErrorKind::RandomSourceFailure`](crate::ErrorKind::RandomSourceFailure).
#[derive(Clone, Debug, Default)]
pub struct CryptoRngSource<R>(R);

impl<R> CryptoRngSource<R>
where
    R: RngCore + CryptoRng,
{
    pub fn new(rng: R) -> CryptoRngSource<R> {
        CryptoRngSource(rng)
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R> UniformRandomSource for CryptoRngSource<R>
where
    R: RngCore + CryptoRng,
{
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.try_fill_bytes(dest).map_err(Error::random_source)
    }
}

/// The operating system's entropy source.
pub type OsRandom = CryptoRngSource<OsRng>;
