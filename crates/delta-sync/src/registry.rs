//! Lazily-spawning map from topic id to its actor handle. Exactly one actor
//! per topic, spawned on first use, never torn down.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::topic::{spawn_topic_actor, TopicCommand};

pub struct TopicRegistry {
    buffer_size: usize,
    topics: Mutex<HashMap<[u8; 32], mpsc::Sender<TopicCommand>>>,
}

impl TopicRegistry {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            topics: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_spawn(&self, topic_id: [u8; 32]) -> mpsc::Sender<TopicCommand> {
        let mut topics = self.topics.lock().expect("topic registry lock poisoned");
        topics
            .entry(topic_id)
            .or_insert_with(|| spawn_topic_actor(self.buffer_size))
            .clone()
    }
}
