//! Concurrency behavior of the event bus registry.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use event_bus::{BusEvent, EventBus, EventPublisher};

#[derive(Debug, Clone)]
enum StockEvent {
    Adjusted(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StockEventKind {
    Adjusted,
}

impl BusEvent for StockEvent {
    type Kind = StockEventKind;

    fn kind(&self) -> StockEventKind {
        match self {
            StockEvent::Adjusted(_) => StockEventKind::Adjusted,
        }
    }
}

#[test]
fn concurrent_subscribes_lose_no_registrations() {
    let bus = Arc::new(EventBus::<StockEvent>::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for _ in 0..50 {
                    bus.subscribe_fn(StockEventKind::Adjusted, |_| Ok(()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(bus.handler_count(StockEventKind::Adjusted), 8 * 50);
}

#[test]
fn concurrent_publishes_deliver_to_all_handlers() {
    let bus = Arc::new(EventBus::<StockEvent>::new());
    let deliveries = Arc::new(AtomicU32::new(0));

    for _ in 0..4 {
        let deliveries = Arc::clone(&deliveries);
        bus.subscribe_fn(StockEventKind::Adjusted, move |_| {
            deliveries.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for _ in 0..25 {
                    bus.publish(&StockEvent::Adjusted(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // 8 publishers x 25 events x 4 handlers each.
    assert_eq!(deliveries.load(Ordering::Relaxed), 8 * 25 * 4);
}

#[test]
fn subscribe_races_publish_without_corruption() {
    let bus = Arc::new(EventBus::<StockEvent>::new());

    let publisher_bus = Arc::clone(&bus);
    let publisher = thread::spawn(move || {
        for i in 0..200 {
            publisher_bus.publish(&StockEvent::Adjusted(i));
        }
    });

    let subscriber_bus = Arc::clone(&bus);
    let subscriber = thread::spawn(move || {
        for _ in 0..200 {
            subscriber_bus.subscribe_fn(StockEventKind::Adjusted, |_| Ok(()));
        }
    });

    publisher.join().unwrap();
    subscriber.join().unwrap();

    // No guarantee which publishes saw which handlers, but every
    // registration must have landed.
    assert_eq!(bus.handler_count(StockEventKind::Adjusted), 200);
}

#[test]
fn publisher_shared_across_threads() {
    let bus = Arc::new(EventBus::<StockEvent>::new());
    let deliveries = Arc::new(AtomicU32::new(0));
    let deliveries_inner = Arc::clone(&deliveries);
    bus.subscribe_fn(StockEventKind::Adjusted, move |_| {
        deliveries_inner.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });

    let publisher = EventPublisher::bound(bus);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let publisher = publisher.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    publisher.publish(&StockEvent::Adjusted(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(deliveries.load(Ordering::Relaxed), 40);
}
