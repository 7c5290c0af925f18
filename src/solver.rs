//! Z3 session construction: the encoder's only solver glue (§5, §9).
//!
//! Grounded in the teacher's `Verifier`, which owns a `Config` and hands out
//! fresh `Context`s from it (`Verifier::context`). This crate has no use for
//! the teacher's direct `check_bool`/`check_int_*` convenience methods —
//! every assertion here is built by the encoder modules against one shared
//! `Solver` — so only the session-construction half of that type survives,
//! generalized to carry the one solver-level knob `ModelChecker` exposes: a
//! millisecond timeout (§5: cancellation is not supported mid-encoding, so a
//! timeout is the only lever an upstream caller has over how long the
//! blocking `solver.check()` call may run).

use z3::{Config, Context};

/// Owns a Z3 `Config` and constructs fresh `Context`s from it. Kept as its
/// own type, rather than inlined at the one call site, so a future second
/// solver invocation in the same process (re-checking after adjusting
/// `EncoderConfig`, say) can reuse the same timeout policy.
pub struct SolverSession {
    cfg: Config,
}

impl SolverSession {
    /// Build a session with the given solver timeout in milliseconds.
    pub fn new(timeout_ms: u32) -> Self {
        let mut cfg = Config::new();
        cfg.set_param_value("timeout", &timeout_ms.to_string());
        SolverSession { cfg }
    }

    /// Construct a fresh, independent context from this session's config.
    pub fn context(&self) -> Context {
        Context::new(&self.cfg)
    }
}
