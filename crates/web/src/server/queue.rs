use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A multi-producer, multi-consumer FIFO queue.
///
/// Pushing never blocks. Popping waits until an item is available; each item
/// is handed to exactly one consumer.
#[derive(Debug)]
pub struct WorkQueue<T> {
    sender: UnboundedSender<T>,
    receiver: Arc<Mutex<UnboundedReceiver<T>>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone(), receiver: Arc::clone(&self.receiver) }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self { sender, receiver: Arc::new(Mutex::new(receiver)) }
    }

    pub fn push(&self, item: T) {
        // the receiver lives as long as any clone of the queue, including self
        let _ = self.sender.send(item);
    }

    pub async fn pop(&self) -> Option<T> {
        self.receiver.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn pops_in_push_order() {
        let queue = WorkQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.pop().await, Some(1));
        assert_eq!(queue.pop().await, Some(2));
        assert_eq!(queue.pop().await, Some(3));
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let queue = WorkQueue::new();
        let consumer = queue.clone();
        let popped = tokio::spawn(async move { consumer.pop().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!popped.is_finished());

        queue.push("job");
        assert_eq!(timeout(Duration::from_secs(1), popped).await.unwrap().unwrap(), Some("job"));
    }

    #[tokio::test]
    async fn each_item_goes_to_one_consumer() {
        let queue = WorkQueue::new();
        let consumers = (0..4)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.pop().await })
            })
            .collect::<Vec<_>>();

        for i in 0..4 {
            queue.push(i);
        }

        let mut popped = futures::future::join_all(consumers)
            .await
            .into_iter()
            .map(|result| result.unwrap().unwrap())
            .collect::<Vec<_>>();
        popped.sort_unstable();
        assert_eq!(popped, [0, 1, 2, 3]);
    }
}
