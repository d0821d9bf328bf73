mod inline;
mod jobs;
mod redis_queue;

pub use inline::InlineDispatcher;
pub use jobs::queues;
pub use redis_queue::{create_pool, QueueError, RedisJobQueue, RedisPool};
