// ============================================
// src/timer.rs
// 一回だけ発火する遅延イベント
// ============================================

use std::time::{Duration, Instant};

/// 予約された一回きりのイベント。
/// 現在時刻は呼び出し側が渡すので、テストでは時間を自由に進められる
#[derive(Debug, Clone)]
pub struct Deferred<E> {
    pending: Option<(Instant, E)>,
}

impl<E> Default for Deferred<E> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<E> Deferred<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `now + delay` に発火するよう予約する。既存の予約は置き換える
    pub fn schedule(&mut self, now: Instant, delay: Duration, event: E) {
        self.pending = Some((now + delay, event));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<E> {
        self.pending.take().map(|(_, event)| event)
    }

    /// 期限が来ていればイベントを取り出す（取り出したら予約は消える）
    pub fn fire_due(&mut self, now: Instant) -> Option<E> {
        match &self.pending {
            Some((due, _)) if now >= *due => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut timer = Deferred::new();
        timer.schedule(start, Duration::from_millis(600), "advance");

        assert_eq!(timer.fire_due(start + Duration::from_millis(599)), None);
        assert_eq!(timer.fire_due(start + Duration::from_millis(600)), Some("advance"));
        assert_eq!(timer.fire_due(start + Duration::from_secs(10)), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn cancel_drops_the_event() {
        let start = Instant::now();
        let mut timer = Deferred::new();
        timer.schedule(start, Duration::ZERO, 1);
        assert_eq!(timer.cancel(), Some(1));
        assert_eq!(timer.fire_due(start), None);
    }
}
