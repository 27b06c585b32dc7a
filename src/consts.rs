pub mod poller {
    /// Queue size for presentation events. Chosen to be comfortably larger
    /// than the number of events a single job produces between reads.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    /// Default period between status queries, in milliseconds.
    pub const POLL_INTERVAL_MS: u64 = 2000;

    /// How many consecutive failed status queries are tolerated before the
    /// poll loop gives up on the job. A single flaky poll is never surfaced;
    /// this bound keeps a dead server from spinning the loop forever.
    pub const MAX_CONSECUTIVE_TRANSPORT_FAILURES: u32 = 5;
}

pub mod submit {
    /// Overall timeout for the submission request. Uploads carry file bytes,
    /// so this is longer than the per-poll timeout.
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Timeout for a single status query.
    pub const POLL_TIMEOUT_SECS: u64 = 10;
}
