//! Per-topic actor: single-writer append-only log with bounded retention
//! and live fan-out to subscribers.
//!
//! One actor task owns one topic's state exclusively; `append` and
//! `subscribe` both travel through the same command channel, which is what
//! gives "no subscriber ever sees a seq not yet recorded" without a lock.

use std::collections::VecDeque;

use tokio::sync::{mpsc, oneshot};

/// A message delivered to a subscriber: either a log entry or the one-time
/// marker separating replay from live push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicEvent {
    Op { seq: u64, op: Vec<u8> },
    Ready { head: u64 },
}

pub enum TopicCommand {
    Append {
        op: Vec<u8>,
        reply: oneshot::Sender<u64>,
    },
    Subscribe {
        since: u64,
        reply: oneshot::Sender<mpsc::Receiver<TopicEvent>>,
    },
}

/// Headroom added to `buffer_size` when sizing a subscriber's channel, so a
/// full replay plus a handful of live appends never blocks the actor.
const SUBSCRIBER_CHANNEL_HEADROOM: usize = 64;

struct TopicActor {
    buffer_size: usize,
    head: u64,
    entries: VecDeque<(u64, Vec<u8>)>,
    subscribers: Vec<mpsc::Sender<TopicEvent>>,
}

impl TopicActor {
    fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            head: 0,
            entries: VecDeque::new(),
            subscribers: Vec::new(),
        }
    }

    fn append(&mut self, op: Vec<u8>) -> u64 {
        self.head += 1;
        self.entries.push_back((self.head, op.clone()));
        if self.entries.len() > self.buffer_size {
            self.entries.pop_front();
        }

        let seq = self.head;
        self.subscribers
            .retain(|tx| tx.try_send(TopicEvent::Op { seq, op: op.clone() }).is_ok());
        seq
    }

    fn subscribe(&mut self, since: u64) -> mpsc::Receiver<TopicEvent> {
        let (tx, rx) = mpsc::channel(self.buffer_size + SUBSCRIBER_CHANNEL_HEADROOM);

        for (seq, op) in self.entries.iter() {
            if *seq > since {
                // Channel is sized to hold the whole replay; a failed send
                // here means the subscriber is already gone.
                if tx.try_send(TopicEvent::Op { seq: *seq, op: op.clone() }).is_err() {
                    return rx;
                }
            }
        }
        let _ = tx.try_send(TopicEvent::Ready { head: self.head });
        self.subscribers.push(tx);
        rx
    }
}

/// Spawn the actor task for one topic and return the handle used to send it
/// commands.
pub fn spawn_topic_actor(buffer_size: usize) -> mpsc::Sender<TopicCommand> {
    let (tx, mut rx) = mpsc::channel::<TopicCommand>(256);
    tokio::spawn(async move {
        let mut actor = TopicActor::new(buffer_size);
        while let Some(cmd) = rx.recv().await {
            match cmd {
                TopicCommand::Append { op, reply } => {
                    let seq = actor.append(op);
                    let _ = reply.send(seq);
                }
                TopicCommand::Subscribe { since, reply } => {
                    let rx = actor.subscribe(since);
                    let _ = reply.send(rx);
                }
            }
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn append(tx: &mpsc::Sender<TopicCommand>, op: &[u8]) -> u64 {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(TopicCommand::Append {
            op: op.to_vec(),
            reply: reply_tx,
        })
        .await
        .unwrap();
        reply_rx.await.unwrap()
    }

    async fn subscribe(tx: &mpsc::Sender<TopicCommand>, since: u64) -> mpsc::Receiver<TopicEvent> {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(TopicCommand::Subscribe {
            since,
            reply: reply_tx,
        })
        .await
        .unwrap();
        reply_rx.await.unwrap()
    }

    /// Invariant 7 — log density: after k appends, head == k and entries
    /// cover exactly [max(1, k-BUFFER_SIZE+1), k].
    #[tokio::test]
    async fn log_density_within_window() {
        let tx = spawn_topic_actor(10);
        for i in 0..5u8 {
            assert_eq!(append(&tx, &[i]).await, (i + 1) as u64);
        }
        let mut sub = subscribe(&tx, 0).await;
        let mut seqs = vec![];
        loop {
            match sub.recv().await.unwrap() {
                TopicEvent::Op { seq, .. } => seqs.push(seq),
                TopicEvent::Ready { head } => {
                    assert_eq!(head, 5);
                    break;
                }
            }
        }
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    /// Invariant 9 — eviction: after BUFFER_SIZE + 1 appends, seq=1 is gone
    /// and seq=BUFFER_SIZE+1 is present.
    #[tokio::test]
    async fn eviction_drops_oldest_entry() {
        let tx = spawn_topic_actor(3);
        for i in 0..4u8 {
            append(&tx, &[i]).await;
        }
        let mut sub = subscribe(&tx, 0).await;
        let mut seqs = vec![];
        loop {
            match sub.recv().await.unwrap() {
                TopicEvent::Op { seq, .. } => seqs.push(seq),
                TopicEvent::Ready { .. } => break,
            }
        }
        assert_eq!(seqs, vec![2, 3, 4]);
        assert!(!seqs.contains(&1));
    }

    /// S4 — subscribe after eviction: BUFFER_SIZE=1000, 1500 appends,
    /// since=0 replays exactly seq 501..=1500 then ready{head:1500}.
    #[tokio::test]
    async fn s4_subscribe_after_eviction() {
        let tx = spawn_topic_actor(1000);
        for i in 0..1500u32 {
            append(&tx, &[(i % 256) as u8]).await;
        }
        let mut sub = subscribe(&tx, 0).await;
        let mut seqs = vec![];
        loop {
            match sub.recv().await.unwrap() {
                TopicEvent::Op { seq, .. } => seqs.push(seq),
                TopicEvent::Ready { head } => {
                    assert_eq!(head, 1500);
                    break;
                }
            }
        }
        assert_eq!(seqs.len(), 1000);
        assert_eq!(seqs.first(), Some(&501));
        assert_eq!(seqs.last(), Some(&1500));
        for (idx, seq) in seqs.iter().enumerate() {
            assert_eq!(*seq, 501 + idx as u64);
        }
    }

    /// Invariant 8 / S5 — a subscriber sees replay (if any) strictly before
    /// `ready`, and live appends after `ready` strictly increase.
    #[tokio::test]
    async fn s5_live_appends_follow_ready_in_order() {
        let tx = spawn_topic_actor(100);
        let mut sub = subscribe(&tx, 0).await;

        // No history yet, so the only initial event is `ready{head:0}`.
        match sub.recv().await.unwrap() {
            TopicEvent::Ready { head } => assert_eq!(head, 0),
            other => panic!("expected ready first, got {other:?}"),
        }

        append(&tx, b"a").await;
        append(&tx, b"b").await;
        append(&tx, b"c").await;

        let mut seqs = vec![];
        for _ in 0..3 {
            match sub.recv().await.unwrap() {
                TopicEvent::Op { seq, .. } => seqs.push(seq),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_op_is_stored_and_replayed() {
        let tx = spawn_topic_actor(10);
        let seq = append(&tx, b"").await;
        assert_eq!(seq, 1);
        let mut sub = subscribe(&tx, 0).await;
        match sub.recv().await.unwrap() {
            TopicEvent::Op { seq, op } => {
                assert_eq!(seq, 1);
                assert!(op.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribe_since_head_skips_replay() {
        let tx = spawn_topic_actor(10);
        append(&tx, b"x").await;
        append(&tx, b"y").await;
        let mut sub = subscribe(&tx, 2).await;
        match sub.recv().await.unwrap() {
            TopicEvent::Ready { head } => assert_eq!(head, 2),
            other => panic!("expected immediate ready, got {other:?}"),
        }
    }
}
