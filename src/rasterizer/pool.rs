//! Model instances and their fixed-capacity pool
//!
//! Instances live in a contiguous slot array with an index-linked free
//! list, so acquire/release are O(1), nothing is ever moved, and handles
//! stay valid across other instances' lifetimes. Iterating live instances
//! has to skip free slots, since pools are not compacted.

use std::fmt;
use std::rc::Rc;

use super::fixed::{Angle, Fixed};
use super::math::Vec3;
use super::types::{Model, ShadingMode};

/// A transformable reference to a shared [`Model`]: position, yaw/pitch/roll
/// orientation, uniform scale and a shading mode. Mutated in place by scene
/// logic between frames.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub model: Rc<Model>,
    pub pos: Vec3,
    pub yaw: Angle,
    pub pitch: Angle,
    pub roll: Angle,
    pub scale: Fixed,
    pub shading: ShadingMode,
}

/// Stable reference to a pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(usize);

impl InstanceHandle {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Pool misuse. These are programming errors or mis-sized scene budgets;
/// callers should halt loudly rather than try to recover.
#[derive(Debug, PartialEq, Eq)]
pub enum PoolError {
    /// Acquire on a full pool.
    Exhausted,
    /// Release on a pool with no live instances.
    Empty,
    /// Release of a slot that is not live (double free or bad handle).
    NotLive(usize),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Exhausted => write!(f, "instance pool exhausted"),
            PoolError::Empty => write!(f, "release on an empty instance pool"),
            PoolError::NotLive(idx) => write!(f, "slot {} is not live", idx),
        }
    }
}

impl std::error::Error for PoolError {}

#[derive(Debug)]
enum Slot {
    /// Empty slot carrying the index of the next free slot.
    Free { next: Option<usize> },
    Live(ModelInstance),
}

/// Fixed-capacity object pool for [`ModelInstance`].
#[derive(Debug)]
pub struct InstancePool {
    slots: Vec<Slot>,
    first_free: Option<usize>,
    live_count: usize,
}

impl InstancePool {
    pub fn new(capacity: usize) -> InstancePool {
        let mut pool = InstancePool {
            slots: Vec::with_capacity(capacity),
            first_free: None,
            live_count: 0,
        };
        for i in 0..capacity {
            pool.slots.push(Slot::Free {
                next: if i + 1 < capacity { Some(i + 1) } else { None },
            });
        }
        pool.first_free = if capacity > 0 { Some(0) } else { None };
        pool
    }

    /// Free every slot and rebuild the free list front-to-back.
    pub fn reset(&mut self) {
        let capacity = self.slots.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = Slot::Free {
                next: if i + 1 < capacity { Some(i + 1) } else { None },
            };
        }
        self.first_free = if capacity > 0 { Some(0) } else { None };
        self.live_count = 0;
    }

    /// Pop the free-list head and initialize it. O(1), allocation-free.
    #[allow(clippy::too_many_arguments)]
    pub fn acquire(
        &mut self,
        model: Rc<Model>,
        pos: Vec3,
        scale: Fixed,
        yaw: Angle,
        pitch: Angle,
        roll: Angle,
        shading: ShadingMode,
    ) -> Result<InstanceHandle, PoolError> {
        let idx = self.first_free.ok_or(PoolError::Exhausted)?;
        let next = match self.slots[idx] {
            Slot::Free { next } => next,
            Slot::Live(_) => unreachable!("free list points at a live slot"),
        };
        self.slots[idx] = Slot::Live(ModelInstance {
            model,
            pos,
            yaw,
            pitch,
            roll,
            scale,
            shading,
        });
        self.first_free = next;
        self.live_count += 1;
        Ok(InstanceHandle(idx))
    }

    /// Return a slot to the pool, prepending it to the free list. O(1).
    pub fn release(&mut self, handle: InstanceHandle) -> Result<(), PoolError> {
        if self.live_count == 0 {
            return Err(PoolError::Empty);
        }
        let idx = handle.0;
        match self.slots.get(idx) {
            Some(Slot::Live(_)) => {}
            _ => return Err(PoolError::NotLive(idx)),
        }
        self.slots[idx] = Slot::Free {
            next: self.first_free,
        };
        self.first_free = Some(idx);
        self.live_count -= 1;
        Ok(())
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<&ModelInstance> {
        match self.slots.get(handle.0) {
            Some(Slot::Live(instance)) => Some(instance),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut ModelInstance> {
        match self.slots.get_mut(handle.0) {
            Some(Slot::Live(instance)) => Some(instance),
            _ => None,
        }
    }

    /// All live instances, skipping free slots.
    pub fn iter_live(&self) -> impl Iterator<Item = &ModelInstance> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(instance) => Some(instance),
            Slot::Free { .. } => None,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }
}
