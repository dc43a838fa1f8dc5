//! Reed-Solomon error correction codewords over GF(256).
//!
//! The field is generated by the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//! (0x11d) with generator element 2. Multiplication and division go through
//! exp/log tables built at compile time.

const PRIMITIVE_POLY: u16 = 0x11d;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    // alpha^255 == alpha^0
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
static EXP_TABLE: [u8; 256] = TABLES.0;
static LOG_TABLE: [u8; 256] = TABLES.1;

/// GF(256) field operations using log/exp tables.
pub struct Gf256;

impl Gf256 {
    /// alpha^n.
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// Discrete log of `a`.
    ///
    /// # Panics
    ///
    /// Panics if `a` is zero; the log of zero is undefined and asking for it
    /// means the caller has a logic error.
    pub fn log(a: u8) -> usize {
        assert!(a != 0, "GF(256) arithmetic domain error: log of zero");
        usize::from(LOG_TABLE[usize::from(a)])
    }

    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        EXP_TABLE[(Self::log(a) + Self::log(b)) % 255]
    }

    /// # Panics
    ///
    /// Panics on division by zero.
    pub fn div(a: u8, b: u8) -> u8 {
        assert!(b != 0, "GF(256) arithmetic domain error: division by zero");
        if a == 0 {
            return 0;
        }
        EXP_TABLE[(Self::log(a) + 255 - Self::log(b)) % 255]
    }
}

/// A polynomial over GF(256), coefficients ordered highest degree first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GfPoly {
    coeffs: Vec<u8>,
}

impl GfPoly {
    /// Builds a polynomial, dropping leading zero coefficients.
    pub fn new(coeffs: &[u8]) -> Self {
        let first = coeffs.iter().position(|&c| c != 0).unwrap_or(coeffs.len());
        Self {
            coeffs: coeffs[first..].to_vec(),
        }
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree of the polynomial; the zero polynomial reports 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &[u8] {
        &self.coeffs
    }

    pub fn multiply(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() || other.is_zero() {
            return GfPoly::zero();
        }
        let mut product = vec![0u8; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in other.coeffs.iter().enumerate() {
                product[i + j] ^= Gf256::mul(a, b);
            }
        }
        GfPoly::new(&product)
    }

    /// The generator (x - alpha^0)(x - alpha^1)...(x - alpha^(degree-1)).
    pub fn generator(degree: usize) -> GfPoly {
        let mut result = GfPoly::new(&[1]);
        for i in 0..degree {
            result = result.multiply(&GfPoly::new(&[1, Gf256::exp(i)]));
        }
        result
    }

    /// Remainder of `self` divided by `divisor`, by repeated multiply-and-XOR
    /// until the dividend's degree drops below the divisor's.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is the zero polynomial.
    pub fn remainder(&self, divisor: &GfPoly) -> GfPoly {
        assert!(!divisor.is_zero(), "GF(256) arithmetic domain error: division by zero polynomial");
        let lead = divisor.coeffs[0];
        let mut rem = self.coeffs.clone();
        let mut start = 0;
        while rem.len() - start >= divisor.coeffs.len() {
            let factor = rem[start];
            if factor != 0 {
                let factor = Gf256::div(factor, lead);
                for (r, &d) in rem[start..].iter_mut().zip(&divisor.coeffs) {
                    *r ^= Gf256::mul(d, factor);
                }
            }
            start += 1;
        }
        GfPoly::new(&rem[start..])
    }
}

/// Computes EC codewords for one data block.
///
/// Holds the generator polynomial so blocks sharing an EC length reuse it.
pub struct ReedSolomonEncoder {
    generator: GfPoly,
    ec_count: usize,
}

impl ReedSolomonEncoder {
    pub fn new(ec_count: usize) -> Self {
        assert!(ec_count >= 1, "Degree out of range");
        Self {
            generator: GfPoly::generator(ec_count),
            ec_count,
        }
    }

    pub fn ec_count(&self) -> usize {
        self.ec_count
    }

    /// `(data * x^ec_count) mod generator`, left-padded with zeros to
    /// `ec_count` codewords.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut shifted = Vec::with_capacity(data.len() + self.ec_count);
        shifted.extend_from_slice(data);
        shifted.resize(data.len() + self.ec_count, 0);
        let rem = GfPoly::new(&shifted).remainder(&self.generator);
        let coeffs = rem.coefficients();
        let mut result = vec![0u8; self.ec_count - coeffs.len()];
        result.extend_from_slice(coeffs);
        result
    }
}

/// EC codewords for `data` with a fresh generator of degree `ec_count`.
pub fn ec_codewords(data: &[u8], ec_count: usize) -> Vec<u8> {
    ReedSolomonEncoder::new(ec_count).encode(data)
}
