use std::thread;
use std::time::Duration;
use wakelat::channel::wake_channel;
use wakelat::pool::Cancel;
use wakelat_common::WakeError;

#[test]
fn test_signal_and_ack_round_trip() {
    let (link, endpoint) = wake_channel();
    let worker = thread::spawn(move || endpoint.serve());

    for _ in 0..100 {
        link.signal().unwrap();
        let elapsed = link.await_ack().unwrap();
        assert!(elapsed < Duration::from_secs(5), "implausible wakeup latency {elapsed:?}");
        assert_eq!(link.last_elapsed(), elapsed);
    }

    let mut link = link;
    link.cancel();
    assert!(worker.join().unwrap().is_ok());
}

#[test]
fn test_cancel_unblocks_idle_worker() {
    // The worker is parked in its first receive and is never woken.
    let (mut link, endpoint) = wake_channel();
    let worker = thread::spawn(move || endpoint.serve());
    thread::sleep(Duration::from_millis(20));

    link.cancel();
    assert!(link.is_cancelled());
    assert_eq!(worker.join().unwrap(), Ok(()));
}

#[test]
fn test_signal_after_cancel_fails() {
    let (mut link, _endpoint) = wake_channel();
    link.cancel();
    assert_eq!(link.signal(), Err(WakeError::ChannelClosed("start")));
}

#[test]
fn test_signal_to_departed_worker_fails() {
    let (link, endpoint) = wake_channel();
    drop(endpoint);
    assert_eq!(link.signal(), Err(WakeError::ChannelClosed("start")));
    assert_eq!(link.await_ack(), Err(WakeError::ChannelClosed("ack")));
}

#[test]
fn test_worker_reports_lost_driver() {
    let (link, endpoint) = wake_channel();
    let worker = thread::spawn(move || endpoint.serve());

    // Start is buffered, then the driver disappears before reading the ack.
    link.signal().unwrap();
    drop(link);

    // Either the ack send fails or the ack lands in the buffer and the next
    // receive sees the hang-up; both end the worker without hanging.
    let outcome = worker.join().unwrap();
    assert!(outcome.is_ok() || outcome == Err(WakeError::ChannelClosed("ack")));
}
