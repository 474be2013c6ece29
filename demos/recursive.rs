//! Two mutually recursive functions counting up through the executor.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pollex::{Executor, Pending, PollingExecutor};

fn sleep_async(d: Duration) -> Pending<()> {
    let (promise, pending) = pollex::pair();
    thread::spawn(move || {
        thread::sleep(d);
        promise.fulfill(());
    });
    pending
}

fn rec_func1(count: i32) -> Pending<i32> {
    println!("{}Func1", " ".repeat(count as usize));

    let h = pollex::then(sleep_async(Duration::from_millis(1)), move |g| {
        g.take()?;
        Ok(count + 1)
    });

    pollex::chain(h, |g| Ok(rec_func2(g)))
}

fn rec_func2(f: Pending<i32>) -> Pending<i32> {
    let count = match f.take() {
        Ok(count) => count,
        Err(err) => return pollex::from_error(err),
    };

    println!("{}Func2", " ".repeat(count as usize));

    if count == 100 {
        return pollex::from_value(1821);
    }

    pollex::chain(sleep_async(Duration::from_millis(1)), move |g| {
        g.take()?;
        Ok(rec_func1(count))
    })
}

fn main() {
    // Small quantum: this use case creates a long chain of dependent
    // results.
    let executor: Arc<dyn Executor> =
        Arc::new(PollingExecutor::new(Duration::from_millis(1)));
    let _guard = pollex::set_default(Arc::clone(&executor));

    let f = rec_func1(0);

    println!("Got result: {}", f.take().expect("recursion failed"));

    executor.stop();
}
