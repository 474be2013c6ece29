//! Sums 1821 asynchronously produced values through a single `all`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pollex::{Executor, Pending, PollingExecutor};

fn get_value_async(value: i64) -> Pending<i64> {
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

    let futures: Vec<Pending<i64>> = (0..1821).map(get_value_async).collect();

    let f = pollex::then(pollex::all(futures), |xs| {
        let futures = xs.take()?;
        futures.iter().map(|f| f.take()).sum::<Result<i64, _>>()
    });

    println!("Got result: {}", f.take().expect("sum failed"));

    executor.stop();
}
