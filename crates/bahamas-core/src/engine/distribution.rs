//! Parametric distributions used by the network.
//!
//! Each [`ConditionalDistribution`] has closed-form moments and density and
//! draws from an explicit random source. Constructors validate parameters so
//! sampling itself cannot fail.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Beta, Distribution, LogNormal, Uniform};

use super::errors::ExecError;
use super::numeric_kernels::SampleVector;
use super::special::{inv_norm_cdf, ln_beta, norm_cdf, norm_pdf, norm_sf};

/// Distribution families a builder may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    Beta,
    Norm,
    LogNorm,
    Uniform,
}

impl DistributionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionKind::Beta => "beta",
            DistributionKind::Norm => "norm",
            DistributionKind::LogNorm => "lognorm",
            DistributionKind::Uniform => "uniform",
        }
    }

    /// Fail with [`ExecError::Unsupported`] unless `self` is `expected`.
    pub fn require(self, expected: DistributionKind, builder: &str) -> Result<(), ExecError> {
        if self == expected {
            Ok(())
        } else {
            Err(ExecError::Unsupported(format!(
                "distribution '{}' is not supported by {}; expected '{}'",
                self, builder, expected
            )))
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beta" => Ok(DistributionKind::Beta),
            "norm" | "normal" => Ok(DistributionKind::Norm),
            "lognorm" | "lognormal" => Ok(DistributionKind::LogNorm),
            "uniform" => Ok(DistributionKind::Uniform),
            other => Err(ExecError::Unsupported(format!(
                "unknown distribution type '{}'",
                other
            ))),
        }
    }
}

/// Normal distribution truncated to `[loc + a·scale, loc + b·scale]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TruncatedNormal {
    pub loc: f64,
    pub scale: f64,
    /// Standardized lower bound.
    pub a: f64,
    /// Standardized upper bound.
    pub b: f64,
}

impl TruncatedNormal {
    /// Normal with the given mean and std truncated to `[0, 1]`.
    pub fn unit_interval(mean: f64, std: f64) -> Result<Self, ExecError> {
        if !(mean.is_finite() && std.is_finite()) || std <= 0.0 {
            return Err(ExecError::Numerical(format!(
                "truncated normal needs finite mean and positive std, got mean={} std={}",
                mean, std
            )));
        }
        let tn = Self {
            loc: mean,
            scale: std,
            a: (0.0 - mean) / std,
            b: (1.0 - mean) / std,
        };
        if tn.mass() <= 0.0 {
            return Err(ExecError::Numerical(format!(
                "normal(mean={}, std={}) has no mass on [0, 1]",
                mean, std
            )));
        }
        Ok(tn)
    }

    fn mass(&self) -> f64 {
        if self.a >= 0.0 {
            norm_sf(self.a) - norm_sf(self.b)
        } else {
            norm_cdf(self.b) - norm_cdf(self.a)
        }
    }

    pub fn mean(&self) -> f64 {
        let d = (norm_pdf(self.a) - norm_pdf(self.b)) / self.mass();
        self.loc + self.scale * d
    }

    pub fn variance(&self) -> f64 {
        let z = self.mass();
        let d = (norm_pdf(self.a) - norm_pdf(self.b)) / z;
        let t = (bound_term(self.a) - bound_term(self.b)) / z;
        self.scale * self.scale * (1.0 + t - d * d)
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.loc) / self.scale;
        if z < self.a || z > self.b {
            return 0.0;
        }
        norm_pdf(z) / (self.scale * self.mass())
    }

    /// Inverse-CDF draw. The upper tail is inverted through the survival
    /// function when the whole window lies above the mean.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        let z = if self.a >= 0.0 {
            let sa = norm_sf(self.a);
            let sb = norm_sf(self.b);
            -inv_norm_cdf(sa - u * (sa - sb))
        } else {
            let pa = norm_cdf(self.a);
            let pb = norm_cdf(self.b);
            inv_norm_cdf(pa + u * (pb - pa))
        };
        self.loc + self.scale * z.clamp(self.a, self.b)
    }
}

// z·φ(z), taken as 0 at infinite bounds.
fn bound_term(z: f64) -> f64 {
    if z.is_finite() {
        z * norm_pdf(z)
    } else {
        0.0
    }
}

/// A node-conditional distribution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConditionalDistribution {
    Beta { alpha: f64, beta: f64 },
    TruncatedNormal(TruncatedNormal),
    /// `exp(N(mu, sigma²))`.
    LogNormal { mu: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
}

impl ConditionalDistribution {
    pub fn beta(alpha: f64, beta: f64) -> Result<Self, ExecError> {
        if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
            return Err(ExecError::Numerical(format!(
                "beta parameters must be positive, got alpha={} beta={}",
                alpha, beta
            )));
        }
        Ok(Self::Beta { alpha, beta })
    }

    pub fn truncated_unit_normal(mean: f64, std: f64) -> Result<Self, ExecError> {
        TruncatedNormal::unit_interval(mean, std).map(Self::TruncatedNormal)
    }

    pub fn log_normal(mu: f64, sigma: f64) -> Result<Self, ExecError> {
        if !(mu.is_finite() && sigma.is_finite()) || sigma < 0.0 {
            return Err(ExecError::Numerical(format!(
                "log-normal needs finite mu and non-negative sigma, got mu={} sigma={}",
                mu, sigma
            )));
        }
        Ok(Self::LogNormal { mu, sigma })
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, ExecError> {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(ExecError::Numerical(format!(
                "uniform needs low < high, got [{}, {})",
                low, high
            )));
        }
        Ok(Self::Uniform { low, high })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::Beta { .. } => DistributionKind::Beta,
            Self::TruncatedNormal(_) => DistributionKind::Norm,
            Self::LogNormal { .. } => DistributionKind::LogNorm,
            Self::Uniform { .. } => DistributionKind::Uniform,
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Self::Beta { alpha, beta } => alpha / (alpha + beta),
            Self::TruncatedNormal(tn) => tn.mean(),
            Self::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
            Self::Uniform { low, high } => 0.5 * (low + high),
        }
    }

    pub fn variance(&self) -> f64 {
        match *self {
            Self::Beta { alpha, beta } => {
                let s = alpha + beta;
                alpha * beta / (s * s * (s + 1.0))
            }
            Self::TruncatedNormal(tn) => tn.variance(),
            Self::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
            Self::Uniform { low, high } => (high - low) * (high - low) / 12.0,
        }
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            Self::Beta { alpha, beta } => {
                if x <= 0.0 || x >= 1.0 {
                    return 0.0;
                }
                ((alpha - 1.0) * x.ln() + (beta - 1.0) * (-x).ln_1p() - ln_beta(alpha, beta)).exp()
            }
            Self::TruncatedNormal(tn) => tn.pdf(x),
            Self::LogNormal { mu, sigma } => {
                if x <= 0.0 {
                    return 0.0;
                }
                let z = (x.ln() - mu) / sigma;
                norm_pdf(z) / (x * sigma)
            }
            Self::Uniform { low, high } => {
                if x < low || x > high {
                    0.0
                } else {
                    1.0 / (high - low)
                }
            }
        }
    }

    /// One draw.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler().draw(rng)
    }

    /// `n` draws in sequence.
    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> SampleVector {
        let sampler = self.sampler();
        (0..n).map(|_| sampler.draw(rng)).collect()
    }

    fn sampler(&self) -> Sampler {
        // Constructors validate parameters; the constant fallbacks only
        // apply to hand-built variants.
        match *self {
            Self::Beta { alpha, beta } => match Beta::new(alpha, beta) {
                Ok(d) => Sampler::Beta(d),
                Err(_) => Sampler::Constant(self.mean()),
            },
            Self::TruncatedNormal(tn) => Sampler::TruncatedNormal(tn),
            Self::LogNormal { mu, sigma } => match LogNormal::new(mu, sigma) {
                Ok(d) => Sampler::LogNormal(d),
                Err(_) => Sampler::Constant(mu.exp()),
            },
            Self::Uniform { low, high } => Sampler::Uniform(Uniform::new(low, high)),
        }
    }
}

enum Sampler {
    Beta(Beta<f64>),
    TruncatedNormal(TruncatedNormal),
    LogNormal(LogNormal<f64>),
    Uniform(Uniform<f64>),
    Constant(f64),
}

impl Sampler {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Beta(d) => d.sample(rng),
            Sampler::TruncatedNormal(tn) => tn.sample(rng),
            Sampler::LogNormal(d) => d.sample(rng),
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Constant(v) => *v,
        }
    }
}
