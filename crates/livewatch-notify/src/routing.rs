use livewatch_common::types::AlertLevel;

pub struct ChannelRoute {
    pub min_level: AlertLevel,
    pub channel_index: usize,
}

impl ChannelRoute {
    pub fn new(min_level: AlertLevel, channel_index: usize) -> Self {
        Self {
            min_level,
            channel_index,
        }
    }

    pub fn should_send(&self, level: AlertLevel) -> bool {
        level >= self.min_level
    }
}
