use std::fmt;

use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HealthChanged {
    pub current: f32,
    pub max: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(&HealthChanged, &mut Notifier) + Send + Sync>;

#[derive(Debug, Default)]
pub struct Notifier {
    current: SubscriptionId,
    cancelled: SmallVec<[SubscriptionId; 2]>,
}

#[derive(Default)]
pub struct Subscribers {
    entries: Vec<Subscriber>,
}

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        SubscriptionId(id)
    }
}

impl Notifier {
    pub fn subscription(&self) -> SubscriptionId {
        self.current
    }

    // Takes effect once the current fan-out has finished.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        if !self.is_cancelled(id) {
            self.cancelled.push(id);
        }
    }

    pub fn unsubscribe_self(&mut self) {
        self.unsubscribe(self.current);
    }

    pub fn is_cancelled(&self, id: SubscriptionId) -> bool {
        self.cancelled.contains(&id)
    }
}

impl Subscribers {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.iter().any(|subscriber| subscriber.id == id)
    }

    pub fn insert(&mut self, id: SubscriptionId, callback: Callback) {
        self.entries.push(Subscriber { id, callback });
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|subscriber| subscriber.id != id);
        self.entries.len() != len
    }

    pub fn notify(&mut self, change: &HealthChanged, notifier: &mut Notifier) {
        for subscriber in &mut self.entries {
            if notifier.is_cancelled(subscriber.id) {
                continue;
            }

            notifier.current = subscriber.id;
            (subscriber.callback)(change, notifier);
        }
    }

    pub fn retain(&mut self, notifier: &Notifier) {
        if !notifier.cancelled.is_empty() {
            self.entries
                .retain(|subscriber| !notifier.is_cancelled(subscriber.id));
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|subscriber| subscriber.id))
            .finish()
    }
}
