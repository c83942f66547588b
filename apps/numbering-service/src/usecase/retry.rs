//! 競合時の再試行ポリシー
//!
//! 待機時間は `base * 2^retry` を上限 `max` で打ち切った値（exponential backoff）に、
//! 同時に失敗した呼び出し同士が同じタイミングで再衝突しないよう
//! `[backoff / 2, backoff]` の範囲でランダムなジッターをかけたもの。

use std::time::Duration;

use rand::Rng;

use crate::config::AllocationConfig;

/// 再試行ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base:         Duration,
    max:          Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base,
            max,
        }
    }

    /// 初回を含む最大試行回数
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `retry` 回目（0 始まり）の再試行前に待つ時間の上限
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// `retry` 回目の再試行前に実際に待つ時間（ジッター込み）
    pub fn backoff_with_jitter(&self, retry: u32) -> Duration {
        let backoff = self.backoff(retry);
        let half = backoff / 2;
        if half.is_zero() {
            return backoff;
        }
        rand::rng().random_range(half..=backoff)
    }
}

impl From<&AllocationConfig> for RetryPolicy {
    fn from(config: &AllocationConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_base, config.backoff_max)
    }
}
