use crate::sample::{Channel, Sample};
use std::collections::{BTreeMap, VecDeque};

/// Default number of points kept per channel.
pub const DEFAULT_CAPACITY: usize = 100;

/// Rolling history of one channel, feeding a scrolling plot.
///
/// Every value carries the tick it was recorded at; ticks only ever increase
/// and the oldest value is evicted once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values:    VecDeque<f64>,
    ticks:     VecDeque<u64>,
    capacity:  usize,
    next_tick: u64,
}

/// Read-only copy of a [`HistoryBuffer`], ready for plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySnapshot {
    /// x-axis: tick of each value.
    pub ticks:  Vec<u64>,
    /// y-axis: the values, oldest first.
    pub values: Vec<f64>,
}

impl HistorySnapshot {
    /// Smallest and largest value in the window.
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut values = self.values.iter().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            values:    VecDeque::with_capacity(capacity),
            ticks:     VecDeque::with_capacity(capacity),
            capacity,
            next_tick: 0,
        }
    }

    /// Push a new value stamped with the buffer's own next tick.
    pub fn append(&mut self, value: f64) {
        self.append_at(self.next_tick, value);
    }

    /// Push a new value stamped with `tick`, evicting the oldest while over
    /// capacity.  `tick` must not be lower than the previous one.
    pub fn append_at(&mut self, tick: u64, value: f64) {
        self.values.push_back(value);
        self.ticks.push_back(tick);
        self.next_tick = tick + 1;

        while self.values.len() > self.capacity {
            self.values.pop_front();
            self.ticks.pop_front();
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            ticks:  self.ticks.iter().copied().collect(),
            values: self.values.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One [`HistoryBuffer`] per channel that has ever reported a value, sharing
/// a single tick counter so every channel plots against the same x-axis.
#[derive(Debug, Clone)]
pub struct History {
    capacity:  usize,
    next_tick: u64,
    channels:  BTreeMap<Channel, HistoryBuffer>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_tick: 0,
            channels: BTreeMap::new(),
        }
    }

    /// Stamp `sample` with the next tick and append each reading to its
    /// channel buffer.  Returns the tick used.
    pub fn record(&mut self, sample: &Sample) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;

        let capacity = self.capacity;
        for (channel, value) in sample.readings() {
            self.channels
                .entry(channel)
                .or_insert_with(|| HistoryBuffer::new(capacity))
                .append_at(tick, value);
        }
        tick
    }

    /// Tick of the most recently recorded sample.
    pub fn last_tick(&self) -> Option<u64> {
        self.next_tick.checked_sub(1)
    }

    pub fn snapshot(&self, channel: Channel) -> HistorySnapshot {
        self.channels
            .get(&channel)
            .map(HistoryBuffer::snapshot)
            .unwrap_or_default()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_values_in_append_order() {
        let mut buf = HistoryBuffer::new(100);
        for v in 1..=150 {
            buf.append(f64::from(v));
        }

        let snap = buf.snapshot();
        let expected: Vec<f64> = (51..=150).map(f64::from).collect();
        assert_eq!(snap.values, expected);
        assert_eq!(buf.len(), 100);
    }

    #[test]
    fn ticks_stay_parallel_to_values() {
        let mut buf = HistoryBuffer::new(3);
        for v in [10.0, 20.0, 30.0, 40.0, 50.0] {
            buf.append(v);
        }

        let snap = buf.snapshot();
        assert_eq!(snap.ticks, vec![2, 3, 4]);
        assert_eq!(snap.values, vec![30.0, 40.0, 50.0]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut buf = HistoryBuffer::new(5);
        for v in 0..20 {
            buf.append(f64::from(v));
            assert!(buf.len() <= buf.capacity());
        }
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut buf = HistoryBuffer::new(0);
        buf.append(1.0);
        assert!(buf.is_empty());
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut buf = HistoryBuffer::new(4);
        buf.append(1.5);
        let first = buf.snapshot();
        let second = buf.snapshot();
        assert_eq!(first, second);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn range_of_window() {
        let mut buf = HistoryBuffer::new(2);
        assert_eq!(buf.snapshot().range(), None);
        buf.append(1.0);
        buf.append(5.0);
        buf.append(3.0);
        assert_eq!(buf.snapshot().range(), Some((3.0, 5.0)));
    }

    #[test]
    fn history_only_tracks_reported_channels() {
        let mut history = History::new(10);
        history.record(&Sample::from_readings([
            (Channel::Temperature, 23.5),
            (Channel::Light, 512.0),
        ]));

        assert_eq!(history.snapshot(Channel::Temperature).values, vec![23.5]);
        assert_eq!(history.snapshot(Channel::Light).values, vec![512.0]);
        assert!(history.snapshot(Channel::Humidity).values.is_empty());
    }

    #[test]
    fn channels_share_one_tick_counter() {
        let mut history = History::new(10);
        assert_eq!(history.last_tick(), None);

        // Three-channel format for a while, then a fourth channel appears.
        for v in 0..5 {
            history.record(&Sample::from_readings([
                (Channel::Temperature, f64::from(v)),
                (Channel::Humidity, 50.0),
                (Channel::Power, 5.0),
            ]));
        }
        let tick = history.record(&Sample::from_readings([
            (Channel::Temperature, 25.0),
            (Channel::Light, 512.0),
        ]));

        assert_eq!(tick, 5);
        assert_eq!(history.last_tick(), Some(5));
        assert_eq!(history.snapshot(Channel::Temperature).ticks, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(history.snapshot(Channel::Light).ticks, vec![5]);
        assert_eq!(history.snapshot(Channel::Humidity).ticks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn eviction_keeps_shared_ticks_aligned() {
        let mut history = History::new(2);
        for v in 0..4 {
            history.record(&Sample::from_readings([(Channel::Power, f64::from(v))]));
        }
        let snap = history.snapshot(Channel::Power);
        assert_eq!(snap.ticks, vec![2, 3]);
        assert_eq!(snap.values, vec![2.0, 3.0]);
    }
}
