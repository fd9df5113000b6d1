//! Context - handler に渡すキャンセル・deadline 情報
//!
//! # 学習ポイント
//! - `tokio::sync::watch` による協調的キャンセル（送信側 1 つ、受信側は clone 可能）
//! - `tokio::select!` でキャンセルと deadline を同時に待つ
//!
//! demux は Context の中身を見ずに、そのまま handler に渡します。
//! deadline はホストランタイムが報告する壁時計時刻（`DateTime<Utc>`）です。

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use ulid::Ulid;

#[derive(Debug, Clone)]
pub struct Context {
    invocation_id: Ulid,
    deadline: Option<DateTime<Utc>>,
    cancel_rx: watch::Receiver<bool>,
}

/// 一緒に作られた `Context`（とその clone すべて）をキャンセルする
///
/// drop してもキャンセルにはならない（以後キャンセルできなくなるだけ）。
#[derive(Debug)]
pub struct CancelHandle {
    cancel_tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // 受信側が全部 drop 済みでもよい
        let _ = self.cancel_tx.send(true);
    }
}

impl Context {
    /// キャンセル可能な Context と、そのハンドルを作る
    ///
    /// # 使用例
    /// ```ignore
    /// let (ctx, cancel) = Context::new();
    /// let ctx = ctx.with_deadline(Utc::now() + TimeDelta::seconds(3));
    /// cancel.cancel();
    /// assert!(ctx.is_cancelled());
    /// ```
    pub fn new() -> (Self, CancelHandle) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let ctx = Self {
            invocation_id: Ulid::new(),
            deadline: None,
            cancel_rx,
        };
        (ctx, CancelHandle { cancel_tx })
    }

    /// キャンセルされず、deadline もない Context
    pub fn background() -> Self {
        let (ctx, _handle) = Self::new();
        ctx
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_invocation_id(mut self, invocation_id: Ulid) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    pub fn invocation_id(&self) -> Ulid {
        self.invocation_id
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// deadline までの残り時間（過ぎていれば 0）
    pub fn remaining(&self) -> Option<std::time::Duration> {
        self.deadline
            .map(|deadline| (deadline - Utc::now()).to_std().unwrap_or_default())
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() || self.remaining().is_some_and(|left| left.is_zero())
    }

    /// キャンセルされるか deadline を過ぎると完了する
    ///
    /// background の Context では完了しない。
    pub async fn cancelled(&self) {
        let mut rx = self.cancel_rx.clone();
        let cancelled = async move {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // ハンドルが drop された: もうキャンセルされない
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.remaining() {
            Some(left) => {
                tokio::select! {
                    _ = cancelled => {}
                    _ = tokio::time::sleep(left) => {}
                }
            }
            None => cancelled.await,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn background_is_never_cancelled() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn cancel_is_visible_to_clones() {
        let (ctx, handle) = Context::new();
        let cloned = ctx.clone();
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(cloned.is_cancelled());
        assert_eq!(ctx.invocation_id(), cloned.invocation_id());
    }

    #[test]
    fn past_deadline_counts_as_cancelled() {
        let ctx = Context::background().with_deadline(Utc::now() - chrono::Duration::seconds(1));
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (ctx, handle) = Context::new();
        let waiter = tokio::spawn(async move { ctx.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_resolves_at_deadline() {
        let ctx = Context::background()
            .with_deadline(Utc::now() + chrono::Duration::milliseconds(20));
        tokio::time::timeout(Duration::from_millis(500), ctx.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn background_cancelled_stays_pending() {
        let ctx = Context::background();
        let res = tokio::time::timeout(Duration::from_millis(20), ctx.cancelled()).await;
        assert!(res.is_err());
    }
}
