//! # Clock（時刻プロバイダ）
//!
//! 採番ユースケースは 1 リクエストにつき 1 回だけ現在時刻を読み、
//! その値を集計期間・番号の年月・`created_at` のすべてに使い回す。
//! テストで月末・年末の境界時刻を注入できるよう、時刻の取得をトレイトで抽象化する。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
///
/// [`set`](FixedClock::set) で時刻を進められるため、
/// 「月末に 1 件、翌日に 1 件」のような月替わりのシナリオを 1 つの
/// ユースケースインスタンスで再現できる。
pub struct FixedClock {
    now: std::sync::RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::RwLock::new(now),
        }
    }

    /// 返す時刻を差し替える
    pub fn set(&self, now: DateTime<Utc>) {
        // ロックが poison されていても保持中の値は有効なので取り出して上書きする
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_system_clock_は現在時刻を返す() {
        let before = Utc::now();
        let result = SystemClock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_は複数回呼んでも同じ時刻を返す() {
        let fixed = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let clock = FixedClock::new(fixed);

        assert_eq!(clock.now(), fixed);
        assert_eq!(clock.now(), fixed);
    }

    #[test]
    fn test_fixed_clock_はsetで時刻を進められる() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap());
        let next_day = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        clock.set(next_day);

        assert_eq!(clock.now(), next_day);
    }
}
