/// 边界情况测试模块
/// 测试调试构建下的角色检查、计数器策略、Debug 输出以及大量回绕

use crate::{Ordered, SpscRing};
use std::sync::Arc;
use std::thread;

/// 测试1: 调试构建中，从第二个线程调用 enqueue 会 panic
#[cfg(debug_assertions)]
#[test]
fn test_role_check_detects_second_producer() {
    let ring = Arc::new(SpscRing::<u32>::new(4));

    unsafe { ring.enqueue(1).unwrap() };

    let other = {
        let ring = ring.clone();
        thread::spawn(move || unsafe {
            let _ = ring.enqueue(2);
        })
    };

    let err = other.join().unwrap_err();
    let msg = err
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(msg.contains("BUG: SpscRing Producer"), "unexpected panic: {msg}");

    // 失败的调用没有改变环
    assert_eq!(ring.len(), 1);
}

/// 测试2: 生产者和消费者可以是不同的线程
#[test]
fn test_role_check_allows_distinct_threads() {
    let ring = Arc::new(SpscRing::<u32>::new(4));

    let producer = {
        let ring = ring.clone();
        thread::spawn(move || {
            for i in 0..4 {
                unsafe { ring.enqueue(i).unwrap() };
            }
        })
    };
    producer.join().unwrap();

    let consumer = {
        let ring = ring.clone();
        thread::spawn(move || {
            for i in 0..4 {
                assert_eq!(unsafe { ring.dequeue() }, Ok(i));
            }
        })
    };
    consumer.join().unwrap();
}

/// 测试3: 关闭角色检查后，生产端可以在线程之间移交
#[test]
fn test_role_check_disabled() {
    let ring = Arc::new(SpscRing::<u32>::builder().capacity(4).role_check(false).build());

    unsafe { ring.enqueue(1).unwrap() };
    {
        let ring = ring.clone();
        thread::spawn(move || unsafe { ring.enqueue(2).unwrap() })
            .join()
            .unwrap();
    }

    assert_eq!(unsafe { ring.dequeue() }, Ok(1));
    assert_eq!(unsafe { ring.dequeue() }, Ok(2));
}

/// 测试4: 拆分后的句柄可以被移动到其他线程
#[test]
fn test_handles_move_between_threads() {
    let (mut tx, rx) = SpscRing::new(2).split();
    tx.try_enqueue(1u8).unwrap();

    // 句柄是 Send 的，可以交给另一个线程继续使用
    let mut tx = thread::spawn(move || {
        tx.try_enqueue(2).unwrap();
        tx
    })
    .join()
    .unwrap();
    assert!(tx.try_enqueue(3).is_err());

    let mut rx = thread::spawn(move || rx).join().unwrap();
    assert_eq!(rx.try_dequeue(), Ok(1));
    assert_eq!(rx.try_dequeue(), Ok(2));
}

/// 测试5: 显式指定 Ordered 计数器
#[test]
fn test_explicit_ordered_counters() {
    let ring = unsafe { SpscRing::<u64, Ordered>::with_counters(2) };
    assert_eq!(ring.counters(), "ordered");

    let (mut tx, mut rx) = ring.split();
    tx.try_enqueue(9).unwrap();
    assert_eq!(rx.try_dequeue(), Ok(9));
}

/// 测试6: Debug 输出
#[test]
fn test_debug_output() {
    let (mut tx, rx) = SpscRing::new(3).split();
    tx.try_enqueue("x").unwrap();

    let text = format!("{:?}", rx);
    assert!(text.contains("Consumer"));
    assert!(text.contains("capacity: 3"));
    assert!(text.contains("len: 1"));
    assert!(text.contains("\"ordered\""));

    let builder = format!("{:?}", SpscRing::<u8>::builder().capacity(7));
    assert!(builder.contains("capacity: 7"));
}

/// 测试7: 大量回绕后计数器仍然一致
/// 计数器以 2 * 4 = 8 为模，循环中会跨过回绕点上万次
#[test]
fn test_many_wraparounds() {
    let (mut tx, mut rx) = SpscRing::new(4).split();

    for i in 0..100_000u32 {
        tx.try_enqueue(i).unwrap();
        if i % 3 == 0 {
            tx.try_enqueue(i + 1_000_000).unwrap();
            assert_eq!(rx.try_dequeue(), Ok(i));
            assert_eq!(rx.try_dequeue(), Ok(i + 1_000_000));
        } else {
            assert_eq!(rx.try_dequeue(), Ok(i));
        }
        assert!(rx.is_empty());
    }
}

/// 测试8: 不健全的计数器策略在单线程下行为与 Ordered 一致
#[cfg(feature = "racy-counters")]
#[test]
fn test_racy_counters_single_thread() {
    use crate::{Plain, Volatile};

    fn exercise<C: crate::Counter>(name: &str) {
        let ring = unsafe { SpscRing::<u32>::builder().capacity(4).build_with::<C>() };
        assert_eq!(ring.counters(), name);
        assert!(!ring.is_sound());
        assert!(format!("{:?}", ring).contains("sound: false"));

        let (mut tx, mut rx) = ring.split();
        for round in 0..10 {
            for i in 0..4 {
                tx.try_enqueue(round * 4 + i).unwrap();
            }
            assert!(tx.try_enqueue(99).is_err());
            for i in 0..4 {
                assert_eq!(rx.try_dequeue(), Ok(round * 4 + i));
            }
            assert!(rx.try_dequeue().is_err());
        }
    }

    exercise::<Volatile>("volatile");
    exercise::<Plain>("plain");
}
