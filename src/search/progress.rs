use crate::operators::MutationStats;

/// Operator statistics accumulated over one GA run. Kept on the loop's
/// state so concurrent runs never share counters.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Crossover attempts that produced at least one offspring.
    pub crossover_ok: usize,
    /// All crossover attempts, including retries.
    pub crossover_total: usize,
    /// Per-kind mutation attempt/acceptance counters.
    pub mutations: MutationStats,
}
