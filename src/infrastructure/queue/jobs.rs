pub mod queues {
    /// Redis list holding serialized job envelopes; LPUSH in, BRPOP out.
    pub const BACKGROUND_QUEUE: &str = "jobs:background";
}
