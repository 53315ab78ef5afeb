use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// 分批并发执行: 每批 batch_size 个并发, 批与批之间固定暂停
///
/// 结果顺序与输入一致
pub async fn run_batched<I, T, F, Fut>(
    items: &[I],
    batch_size: usize,
    pause: Duration,
    f: F,
) -> Vec<T>
where
    I: Clone,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    let batch_size = batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(items.len());

    for (idx, chunk) in items.chunks(batch_size).enumerate() {
        let batch = join_all(chunk.iter().cloned().map(&f)).await;
        results.extend(batch);

        if idx + 1 < total_batches && !pause.is_zero() {
            tracing::debug!("批次 {}/{} 完成, 暂停 {:?}", idx + 1, total_batches, pause);
            tokio::time::sleep(pause).await;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn preserves_input_order() {
        let items: Vec<u32> = (1..=7).collect();
        let out = run_batched(&items, 3, Duration::ZERO, |x| async move { x * 10 }).await;
        assert_eq!(out, vec![10, 20, 30, 40, 50, 60, 70]);
    }

    #[tokio::test]
    async fn never_exceeds_batch_size_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let items: Vec<u32> = (0..6).collect();

        run_batched(&items, 2, Duration::from_millis(1), |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_batch_size_is_treated_as_one() {
        let items = vec!["a", "b"];
        let out = run_batched(&items, 0, Duration::ZERO, |s| async move { s.len() }).await;
        assert_eq!(out, vec![1, 1]);
    }
}
