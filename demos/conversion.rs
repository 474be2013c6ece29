//! Converts an asynchronously produced integer into a string.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pollex::{Executor, PollingExecutor};

fn get_value_async(value: i32) -> pollex::Pending<i32> {
    let (promise, pending) = pollex::pair();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(1));
        promise.fulfill(value);
    });
    pending
}

fn main() {
    let executor: Arc<dyn Executor> =
        Arc::new(PollingExecutor::new(Duration::from_millis(10)));
    let _guard = pollex::set_default(Arc::clone(&executor));

    let f = pollex::then(get_value_async(1821), |x| Ok(x.take()?.to_string()));

    println!("Got result: {}", f.take().expect("conversion failed"));

    executor.stop();
}
