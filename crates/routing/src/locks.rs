use std::hash::{BuildHasher, Hash, RandomState};

use tokio::sync::{Mutex, MutexGuard};

/// Fixed pool of async locks shared by hashing keys onto stripes.
///
/// Two keys on the same stripe serialise against each other, which is
/// harmless; one key always lands on one stripe, so its holders run one at
/// a time. Memory stays constant no matter how many keys are seen.
pub struct StripedLocks {
    stripes: Box<[Mutex<()>]>,
    hasher: RandomState,
}

impl StripedLocks {
    pub const DEFAULT_STRIPES: usize = 64;

    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
            hasher: RandomState::new(),
        }
    }

    pub fn stripe_of<K: Hash + ?Sized>(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.stripes.len() as u64) as usize
    }

    pub async fn lock<K: Hash + ?Sized>(&self, key: &K) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_of(key)].lock().await
    }

    pub fn len(&self) -> usize {
        self.stripes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }
}

impl Default for StripedLocks {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STRIPES)
    }
}
