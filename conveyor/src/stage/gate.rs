use tokio::sync::{Mutex, Semaphore};
use tracing::trace;

use crate::bail;
use crate::error::{ConveyorResult, ErrorKind};
use crate::stage::queue::BoundedQueue;

#[derive(Debug)]
struct StageState<T> {
    queue: BoundedQueue<T>,
    high_water_mark: usize,
}

/// Point-in-time view of a stage's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSnapshot {
    pub capacity: usize,
    pub free_slots: usize,
    pub filled_slots: usize,
    pub occupancy: usize,
    pub high_water_mark: usize,
}

impl StageSnapshot {
    /// Returns `true` when the stage is empty and both counters are back to their initial values.
    pub fn is_at_rest(&self) -> bool {
        self.occupancy == 0 && self.filled_slots == 0 && self.free_slots == self.capacity
    }
}

/// A [`BoundedQueue`] guarded by a pair of counting semaphores and a lock.
///
/// `free_slots` starts at the capacity and `filled_slots` at zero. A push waits on a free slot,
/// inserts under the lock and then signals a filled slot; a pop does the reverse. Outside of an
/// in-flight operation, `free_slots + filled_slots` equals the capacity and `filled_slots`
/// equals the occupancy.
///
/// Closing the gate wakes every waiter with [`ErrorKind::StageClosed`].
#[derive(Debug)]
pub struct StageGate<T> {
    name: &'static str,
    capacity: usize,
    free_slots: Semaphore,
    filled_slots: Semaphore,
    state: Mutex<StageState<T>>,
}

impl<T> StageGate<T> {
    /// Creates an empty gate with room for `capacity` elements.
    pub fn new(name: &'static str, capacity: usize) -> ConveyorResult<Self> {
        if capacity == 0 {
            bail!(
                ErrorKind::ConfigError,
                "Stage capacity must be positive",
                format!("stage '{name}' was configured with capacity 0")
            );
        }

        if capacity > Semaphore::MAX_PERMITS {
            bail!(
                ErrorKind::ConfigError,
                "Stage capacity is too large",
                format!(
                    "stage '{name}' was configured with capacity {capacity}, the maximum is {}",
                    Semaphore::MAX_PERMITS
                )
            );
        }

        Ok(Self {
            name,
            capacity,
            free_slots: Semaphore::new(capacity),
            filled_slots: Semaphore::new(0),
            state: Mutex::new(StageState {
                queue: BoundedQueue::new(capacity),
                high_water_mark: 0,
            }),
        })
    }

    /// Inserts `value`, waiting while the stage is full.
    pub async fn push(&self, value: T) -> ConveyorResult<()> {
        match self.free_slots.acquire().await {
            Ok(permit) => permit.forget(),
            Err(err) => {
                bail!(
                    ErrorKind::StageClosed,
                    "Stage was closed while waiting for a free slot",
                    self.name,
                    source: err
                );
            }
        }

        {
            let mut state = self.state.lock().await;
            state.queue.put(value);

            let occupancy = state.queue.len();
            state.high_water_mark = state.high_water_mark.max(occupancy);

            trace!(stage = self.name, occupancy, "pushed into stage");
        }

        self.filled_slots.add_permits(1);

        Ok(())
    }

    /// Removes the oldest value, waiting while the stage is empty.
    pub async fn pop(&self) -> ConveyorResult<T> {
        match self.filled_slots.acquire().await {
            Ok(permit) => permit.forget(),
            Err(err) => {
                bail!(
                    ErrorKind::StageClosed,
                    "Stage was closed while waiting for a filled slot",
                    self.name,
                    source: err
                );
            }
        }

        let value = {
            let mut state = self.state.lock().await;
            let Some(value) = state.queue.take() else {
                bail!(
                    ErrorKind::InvalidState,
                    "Stage signalled a filled slot but its queue is empty",
                    self.name
                );
            };

            trace!(stage = self.name, occupancy = state.queue.len(), "popped from stage");

            value
        };

        self.free_slots.add_permits(1);

        Ok(value)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots a push could claim right now.
    pub fn free_slots(&self) -> usize {
        self.free_slots.available_permits()
    }

    /// Number of elements a pop could claim right now.
    pub fn filled_slots(&self) -> usize {
        self.filled_slots.available_permits()
    }

    /// Largest occupancy observed since the gate was created.
    pub async fn high_water_mark(&self) -> usize {
        self.state.lock().await.high_water_mark
    }

    pub async fn snapshot(&self) -> StageSnapshot {
        let state = self.state.lock().await;

        StageSnapshot {
            capacity: self.capacity,
            free_slots: self.free_slots(),
            filled_slots: self.filled_slots(),
            occupancy: state.queue.len(),
            high_water_mark: state.high_water_mark,
        }
    }

    pub async fn is_at_rest(&self) -> bool {
        self.snapshot().await.is_at_rest()
    }

    /// Closes both semaphores, failing current and future waiters.
    pub fn close(&self) {
        self.free_slots.close();
        self.filled_slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.free_slots.is_closed()
    }
}
