use log::*;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Change notifications published by `ArticleStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
  LoadingChanged(bool),
  Loaded { total: usize },
  QueryChanged,
  Viewed { id: i32, views: u64 },
  Liked { id: i32, likes: u64 },
  Created { id: i32 },
  Updated { id: i32 },
  Deleted { id: i32 },
  FocusCleared,
}

/// Registered observers.  Senders whose receiver was dropped are pruned on
/// the next notify.
#[derive(Debug, Default)]
pub struct Observers {
  senders: Vec<Sender<StoreEvent>>,
}

impl Observers {
  pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
    let (tx, rx) = unbounded();
    self.senders.push(tx);
    rx
  }

  pub fn notify(&mut self, event: StoreEvent) {
    if self.senders.is_empty() {
      return;
    }
    trace!("notify {} observers: {:?}", self.senders.len(), event);
    self.senders.retain(|tx| tx.send(event.clone()).is_ok());
  }

  pub fn len(&self) -> usize {
    self.senders.len()
  }
}
