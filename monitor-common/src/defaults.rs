//! serde defaults shared by config sections

pub const fn default_task_workers() -> usize {
    4
}

pub const fn default_task_queue_capacity() -> usize {
    128
}

pub const fn default_shutdown_grace_secs() -> u64 {
    5
}

#[inline]
pub fn default_tracing_filter() -> String {
    "info".to_owned()
}
