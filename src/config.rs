//! The encoder's configuration surface (§4.13).

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, CheckResult};
use crate::rational::Rational;

/// Parameters governing scheduler and stutter encoding. Validated once at
/// construction so no downstream encoder needs to re-check bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// K, the stutter bound. 1 means no stuttering is possible.
    pub stutter_length: u32,

    /// Upper bound on non-degenerate scheduler probabilities; the lower
    /// bound is `1 - max_sched_prob`. Must lie strictly inside (1/2, 1).
    #[serde(with = "rational_as_pair")]
    pub max_sched_prob: Rational,

    /// Drop the equal-action-set scheduler tying, yielding a general
    /// probabilistic memoryless scheduler (§4.3, §11).
    pub dont_restrict_sched: bool,

    /// Reject a leading `forall` scheduler quantifier rather than attempt
    /// to encode it (§4.10, §11).
    pub reject_universal_scheduler: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            stutter_length: 1,
            max_sched_prob: Rational::new(99, 100),
            dont_restrict_sched: false,
            reject_universal_scheduler: true,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> CheckResult<()> {
        if self.stutter_length == 0 {
            return Err(CheckError::invalid_config("stutter_length must be >= 1"));
        }
        let half = Rational::new(1, 2);
        let one = Rational::ONE;
        if !half.lt(&self.max_sched_prob) || !self.max_sched_prob.lt(&one) {
            return Err(CheckError::invalid_config(
                "max_sched_prob must lie strictly between 1/2 and 1",
            ));
        }
        Ok(())
    }

    /// Construct, validating eagerly.
    pub fn new(
        stutter_length: u32,
        max_sched_prob: Rational,
        dont_restrict_sched: bool,
        reject_universal_scheduler: bool,
    ) -> CheckResult<Self> {
        let cfg = EncoderConfig {
            stutter_length,
            max_sched_prob,
            dont_restrict_sched,
            reject_universal_scheduler,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn min_sched_prob(&self) -> Rational {
        Rational::ONE.sub(self.max_sched_prob)
    }
}

mod rational_as_pair {
    use super::Rational;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(r: &Rational, s: S) -> Result<S::Ok, S::Error> {
        (r.numer(), r.denom()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Rational, D::Error> {
        let (n, den) = <(i64, i64)>::deserialize(d)?;
        Ok(Rational::new(n, den))
    }
}
