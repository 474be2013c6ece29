//! Bounds the wait for a slow producer with a 100ms limit.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pollex::{Executor, Pending, PollingExecutor};

fn get_value_slowly(value: i32) -> Pending<i32> {
    let (promise, pending) = pollex::pair();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(10));
        promise.fulfill(value);
    });
    pending
}

fn main() {
    let executor: Arc<dyn Executor> =
        Arc::new(PollingExecutor::new(Duration::from_millis(10)));
    let _guard = pollex::set_default(Arc::clone(&executor));

    let f = pollex::then_within(Duration::from_millis(100), get_value_slowly(1821), |x| {
        Ok(x.take()?.to_string())
    });

    match f.take() {
        Ok(value) => println!("Got result: {value}"),
        Err(err) if err.is_timeout() => println!("Timed out waiting for the result"),
        Err(err) => println!("Failed: {err}"),
    }

    executor.stop();
}
