//! Shared helper functions.

/// Resolve worker count: explicit values are clamped to `[1, n_cpu]`, the
/// default is `min(n_cpu, 8)`.
pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

#[cfg(test)]
mod tests {
    use super::calculate_worker_limit;

    #[test]
    fn test_worker_limit_is_at_least_one() {
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert!(calculate_worker_limit(None) >= 1);
        assert!(calculate_worker_limit(None) <= 8);
    }
}
