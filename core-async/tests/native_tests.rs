//! Integration tests for core-async on native platforms.
//!
//! These cover the primitives the font engine leans on: sleeping between
//! windows, timeouts around downloads, async locks and broadcast channels.

use core_async::{io, sync, task, time};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[core_async::test]
async fn test_sleep() {
    let start = time::Instant::now();
    time::sleep(time::Duration::from_millis(50)).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= time::Duration::from_millis(50));
}

#[core_async::test]
async fn test_timeout_success() {
    let result = time::timeout(time::Duration::from_millis(100), async {
        time::sleep(time::Duration::from_millis(10)).await;
        42
    })
    .await;

    assert_eq!(result.unwrap(), 42);
}

#[core_async::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_mutex() {
    let mutex = Arc::new(sync::Mutex::new(0));
    let mutex_clone = mutex.clone();

    let handle = task::spawn(async move {
        let mut guard = mutex_clone.lock().await;
        *guard += 1;
    });

    handle.await.unwrap();

    let guard = mutex.lock().await;
    assert_eq!(*guard, 1);
}

#[core_async::test]
async fn test_semaphore_limits_permits() {
    let semaphore = sync::Semaphore::new(2);

    let first = semaphore.acquire().await.unwrap();
    let _second = semaphore.acquire().await.unwrap();
    assert!(semaphore.try_acquire().is_err());

    drop(first);
    assert!(semaphore.try_acquire().is_ok());
}

#[core_async::test]
async fn test_yield_now() {
    task::yield_now().await;
}

#[core_async::test]
async fn test_broadcast_channel() {
    let (tx, mut rx1) = sync::broadcast::channel(10);
    let mut rx2 = tx.subscribe();

    task::spawn(async move {
        for i in 0..5 {
            tx.send(i).unwrap();
        }
    });

    let mut values1 = vec![];
    let mut values2 = vec![];

    for _ in 0..5 {
        values1.push(rx1.recv().await.unwrap());
        values2.push(rx2.recv().await.unwrap());
    }

    assert_eq!(values1, vec![0, 1, 2, 3, 4]);
    assert_eq!(values2, vec![0, 1, 2, 3, 4]);
}

#[core_async::test]
async fn test_stream_copy() {
    let mut reader: &[u8] = b"\x00\x01\x00\x00font-bytes";
    let mut sink: Vec<u8> = Vec::new();

    let copied = io::copy(&mut reader, &mut sink).await.unwrap();

    assert_eq!(copied, 14);
    assert_eq!(&sink[..4], b"\x00\x01\x00\x00");
}

#[test]
fn test_block_on() {
    let value = core_async::runtime::block_on(async {
        time::sleep(time::Duration::from_millis(1)).await;
        7
    });
    assert_eq!(value, 7);
}
