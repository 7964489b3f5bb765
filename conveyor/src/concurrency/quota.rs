use config::shared::QuotaRole;
use tokio::sync::Mutex;
use tracing::debug;

/// Proof that a worker claimed one unit of a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimTicket {
    ordinal: u64,
}

impl ClaimTicket {
    /// Zero-based position of this claim among all claims of the counter.
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// One-based position of this claim, used as an item sequence number.
    pub fn sequence(&self) -> u64 {
        self.ordinal + 1
    }
}

/// Outcome of [`QuotaCounter::try_claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Claimed(ClaimTicket),
    Exhausted,
}

/// Shared budget of operations for one role.
///
/// Claims are atomic: checking the remaining budget and decrementing it happen under one lock,
/// so a counter created with `n` grants exactly `n` claims no matter how many workers race for
/// it. A worker that sees [`Claim::Exhausted`] must stop.
#[derive(Debug)]
pub struct QuotaCounter {
    role: QuotaRole,
    initial: u64,
    remaining: Mutex<u64>,
}

impl QuotaCounter {
    pub fn new(role: QuotaRole, initial: u64) -> Self {
        Self {
            role,
            initial,
            remaining: Mutex::new(initial),
        }
    }

    pub async fn try_claim(&self) -> Claim {
        let mut remaining = self.remaining.lock().await;
        if *remaining == 0 {
            debug!(role = %self.role, initial = self.initial, "quota exhausted");
            return Claim::Exhausted;
        }

        *remaining -= 1;
        let ordinal = self.initial - *remaining - 1;

        Claim::Claimed(ClaimTicket { ordinal })
    }

    pub async fn remaining(&self) -> u64 {
        *self.remaining.lock().await
    }

    pub async fn claimed(&self) -> u64 {
        self.initial - self.remaining().await
    }

}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn zero_quota_is_exhausted_immediately() {
        let counter = QuotaCounter::new(QuotaRole::Produce, 0);
        assert_eq!(counter.try_claim().await, Claim::Exhausted);
        assert_eq!(counter.claimed().await, 0);
    }

    #[tokio::test]
    async fn claims_are_numbered_in_order() {
        let counter = QuotaCounter::new(QuotaRole::Relabel, 2);

        let Claim::Claimed(first) = counter.try_claim().await else {
            panic!("expected a claim");
        };
        let Claim::Claimed(second) = counter.try_claim().await else {
            panic!("expected a claim");
        };

        assert_eq!((first.ordinal(), first.sequence()), (0, 1));
        assert_eq!((second.ordinal(), second.sequence()), (1, 2));
        assert_eq!(counter.try_claim().await, Claim::Exhausted);
        assert_eq!(counter.remaining().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_workers_claim_exactly_the_quota() {
        let counter = Arc::new(QuotaCounter::new(QuotaRole::Consume, 100));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let mut ordinals = Vec::new();
                while let Claim::Claimed(ticket) = counter.try_claim().await {
                    ordinals.push(ticket.ordinal());
                    tokio::task::yield_now().await;
                }
                ordinals
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        assert_eq!(all.len(), 100);
        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique, (0..100).collect());
        assert_eq!(counter.claimed().await, 100);
    }
}
