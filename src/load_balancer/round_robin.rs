//! Fair round-robin selection.
//!
//! Once a backend is chosen it is skipped until every backend has been
//! chosen once; reaching the last entry (used, or inactive) clears every
//! `in_use` flag and restarts the cycle at entry 0.

use crate::load_balancer::{backend::Backend, LoadBalancer, SelectError};

/// Round-robin selector with a per-cycle fairness window.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &mut [Backend]) -> Result<usize, SelectError> {
        match backends.len() {
            0 => return Err(SelectError::Empty),
            1 => {
                if !backends[0].active {
                    return Err(SelectError::NoActiveBackend);
                }
                backends[0].mark_selected();
                return Ok(0);
            }
            _ => {}
        }

        let last = backends.len() - 1;
        let mut selected = 0;
        for index in 0..backends.len() {
            let (active, in_use) = (backends[index].active, backends[index].in_use);
            // Wraparound does not look at entry 0's health.
            if index == last && (!active || in_use) {
                reset_in_use(backends);
                backends[0].mark_selected();
                return Ok(0);
            }
            if in_use {
                continue;
            }
            selected = index;
            break;
        }

        backends[selected].mark_selected();
        Ok(selected)
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

/// Clear the selection window. Leaves `active` and `hit_count` untouched.
pub fn reset_in_use(backends: &mut [Backend]) {
    for backend in backends.iter_mut() {
        backend.in_use = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: u16) -> Vec<Backend> {
        (0..n)
            .map(|i| Backend::new(format!("Host {}", i + 1), "http://localhost", 9000 + i))
            .collect()
    }

    fn hits(backends: &[Backend]) -> Vec<u64> {
        backends.iter().map(|b| b.hit_count).collect()
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let mut backends = pool(3);

        let picks: Vec<usize> = (0..4).map(|_| lb.next_server(&mut backends).unwrap()).collect();

        assert_eq!(picks, vec![0, 1, 2, 0]);
        assert_eq!(hits(&backends), vec![2, 1, 1]);
        assert!(backends[0].in_use);
        assert!(!backends[1].in_use);
        assert!(!backends[2].in_use);
    }

    #[test]
    fn long_run_is_evenly_spread() {
        let lb = RoundRobin::new();
        let mut backends = pool(3);
        for _ in 0..9 {
            lb.next_server(&mut backends).unwrap();
        }
        assert_eq!(hits(&backends), vec![3, 3, 3]);
    }

    #[test]
    fn single_active_backend_is_returned() {
        let lb = RoundRobin::new();
        let mut backends = pool(1);
        assert_eq!(lb.next_server(&mut backends), Ok(0));
        assert_eq!(lb.next_server(&mut backends), Ok(0));
        assert_eq!(backends[0].hit_count, 2);
    }

    #[test]
    fn single_inactive_backend_fails() {
        let lb = RoundRobin::new();
        let mut backends = pool(1);
        backends[0].active = false;
        assert_eq!(lb.next_server(&mut backends), Err(SelectError::NoActiveBackend));
        assert_eq!(backends[0].hit_count, 0);
    }

    #[test]
    fn empty_pool_fails() {
        let lb = RoundRobin::new();
        assert_eq!(lb.next_server(&mut []), Err(SelectError::Empty));
    }

    #[test]
    fn inactive_last_backend_wraps_to_first() {
        let lb = RoundRobin::new();
        let mut backends = pool(3);
        backends[2].active = false;

        let picks: Vec<usize> = (0..4).map(|_| lb.next_server(&mut backends).unwrap()).collect();

        // The inactive last entry forces a reset as soon as 0 and 1 are used.
        assert_eq!(picks, vec![0, 1, 0, 1]);
        assert_eq!(backends[2].hit_count, 0);
    }

    #[test]
    fn wraparound_ignores_first_entry_health() {
        let lb = RoundRobin::new();
        let mut backends = pool(2);
        backends[0].active = false;
        backends[1].active = false;

        assert_eq!(lb.next_server(&mut backends), Ok(0));
        assert_eq!(backends[0].hit_count, 1);
    }

    #[test]
    fn inactive_middle_entry_is_still_selectable() {
        let lb = RoundRobin::new();
        let mut backends = pool(3);
        backends[1].active = false;

        let picks: Vec<usize> = (0..3).map(|_| lb.next_server(&mut backends).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2]);
    }

    #[test]
    fn reset_only_touches_in_use() {
        let lb = RoundRobin::new();
        let mut backends = pool(3);
        backends[1].active = false;
        lb.next_server(&mut backends).unwrap();
        lb.next_server(&mut backends).unwrap();
        let before = backends.clone();

        reset_in_use(&mut backends);

        for (after, before) in backends.iter().zip(before.iter()) {
            assert!(!after.in_use);
            assert_eq!(after.host, before.host);
            assert_eq!(after.port, before.port);
            assert_eq!(after.name, before.name);
            assert_eq!(after.active, before.active);
            assert_eq!(after.hit_count, before.hit_count);
        }
    }
}
