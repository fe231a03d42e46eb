//! Guardrail counters for audits.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct GuardrailStats {
    redirects: AtomicU64,
    leaks_suppressed: AtomicU64,
    formula_dumps: AtomicU64,
    generator_fallbacks: AtomicU64,
    hints_granted: AtomicU64,
    hints_rejected: AtomicU64,
}

/// Point-in-time copy of [`GuardrailStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub redirects: u64,
    pub leaks_suppressed: u64,
    pub formula_dumps: u64,
    pub generator_fallbacks: u64,
    pub hints_granted: u64,
    pub hints_rejected: u64,
}

impl GuardrailStats {
    pub fn record_redirect(&self) {
        self.redirects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_leak(&self) {
        self.leaks_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_formula_dump(&self) {
        self.formula_dumps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.generator_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hint_granted(&self) {
        self.hints_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hint_rejected(&self) {
        self.hints_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            redirects: self.redirects.load(Ordering::Relaxed),
            leaks_suppressed: self.leaks_suppressed.load(Ordering::Relaxed),
            formula_dumps: self.formula_dumps.load(Ordering::Relaxed),
            generator_fallbacks: self.generator_fallbacks.load(Ordering::Relaxed),
            hints_granted: self.hints_granted.load(Ordering::Relaxed),
            hints_rejected: self.hints_rejected.load(Ordering::Relaxed),
        }
    }
}
