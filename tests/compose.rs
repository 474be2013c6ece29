//! End-to-end composition scenarios.

mod common;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{delayed_value, executor, registry_scope};
use pollex::{from_value, pair, Executor, ExecutorExt, Pending};

#[test]
fn chained_conversion() {
    let executor = executor(Duration::from_millis(10));

    let f = executor.then(from_value(1821), |x| Ok(x.take()?.to_string()));

    assert_eq!(f.take().expect("converted"), "1821");
    executor.stop();
}

#[test]
fn three_level_chaining() {
    let executor = executor(Duration::from_millis(1));

    let outer = Arc::clone(&executor);
    let f = executor.chain(delayed_value(Duration::from_millis(1), 1821), move |x| {
        let a = x.take()?;
        let mid = Arc::clone(&outer);
        Ok(outer.chain(
            delayed_value(Duration::from_millis(1), a + 1),
            move |y| {
                let b = y.take()?;
                let inner = Arc::clone(&mid);
                Ok(inner.then(
                    delayed_value(Duration::from_millis(1), b + 1),
                    move |z| {
                        let c = z.take()?;
                        Ok(format!("{a}_{b}_{c}"))
                    },
                ))
            },
        ))
    });

    assert_eq!(f.take().expect("chained"), "1821_1822_1823");
    executor.stop();
}

#[test]
fn sum_of_all() {
    let executor = executor(Duration::from_millis(10));

    let futures: Vec<Pending<i64>> = (0..1821)
        .map(|i| {
            if i % 7 == 0 {
                delayed_value(Duration::from_millis(1), i)
            } else {
                from_value(i)
            }
        })
        .collect();

    let f = executor.then(executor.all(futures), |xs| {
        let futures = xs.take()?;
        let sum: Result<i64, pollex::Error> = futures.iter().map(|f| f.take()).sum();
        sum
    });

    // Arithmetic series 0..=1820.
    assert_eq!(f.take().expect("sum"), 1_656_810);
    executor.stop();
}

#[test]
fn tuple_of_mixed_types() {
    let executor = executor(Duration::from_millis(1));

    let f = executor.all_tuple((
        from_value(1821),
        delayed_value(Duration::from_millis(5), "1822".to_string()),
        from_value(true),
    ));

    let (a, b, c) = f.take().expect("tuple");
    assert_eq!(a.take().expect("int"), 1821);
    assert_eq!(b.take().expect("string"), "1822");
    assert!(c.take().expect("bool"));
    executor.stop();
}

#[test]
fn range_over_shared_sequence() {
    let executor = executor(Duration::from_millis(1));

    let futures: Arc<[Pending<i32>]> = (0..6).map(from_value).collect::<Vec<_>>().into();
    let f = executor.all_range(Arc::clone(&futures), 2..5);

    let (delivered, range) = f.take().expect("range ready");
    let values: Vec<i32> = delivered[range]
        .iter()
        .map(|f| f.take().expect("value"))
        .collect();
    assert_eq!(values, vec![2, 3, 4]);
    executor.stop();
}

#[test]
fn wait_limit_raises_timeout() {
    let executor = executor(Duration::from_millis(10));

    // The producer never fulfills within the test's lifetime.
    let (_keep, input) = pair::<i32>();
    let f = executor.then_within(Duration::from_millis(100), input, |x| Ok(x.take()? + 1));

    let err = f.take().expect_err("timed out");
    assert!(err.is_timeout());
    executor.stop();
}

#[test]
fn chain_timeout_spans_the_inner_result() {
    let executor = executor(Duration::from_millis(10));

    // The outer input is ready at once; the inner result never is. The
    // single wait limit must cover both.
    let f: Pending<i32> = executor.chain_within(
        Duration::from_millis(100),
        from_value(1),
        move |x| {
            x.take()?;
            let (keep, inner) = pair::<i32>();
            // Keep the inner producer alive past the deadline.
            thread::spawn(move || {
                thread::sleep(Duration::from_secs(2));
                drop(keep);
            });
            Ok(inner)
        },
    );

    let err = f.take().expect_err("timed out");
    assert!(err.is_timeout());
    executor.stop();
}

#[test]
fn observe_sees_the_value_on_another_thread() {
    let executor = executor(Duration::from_millis(1));
    let (tx, rx) = mpsc::channel();
    let caller = thread::current().id();

    executor.observe(from_value(1821), move |x| {
        assert!(x.is_ready());
        let _ = tx.send((thread::current().id(), x.take().expect("value")));
    });

    let (observer, value) = rx.recv_timeout(Duration::from_secs(2)).expect("observed");
    assert_eq!(value, 1821);
    assert_ne!(observer, caller);
    executor.stop();
}

#[test]
fn continuations_never_run_before_their_input_is_ready() {
    let executor = executor(Duration::from_millis(1));

    let f = executor.then(
        delayed_value(Duration::from_millis(30), 7),
        |x: Pending<i32>| {
            assert!(x.is_ready(), "dispatched before input readiness");
            Ok(x.take()? * 2)
        },
    );

    assert_eq!(f.take().expect("value"), 14);
    executor.stop();
}

// === Default-registry forms ===

fn rec_func1(count: i32, terminator: i32) -> Pending<i32> {
    let h = delayed_value(Duration::from_millis(1), count + 1);
    pollex::chain(h, move |g| Ok(rec_func2(g, terminator)))
}

fn rec_func2(f: Pending<i32>, terminator: i32) -> Pending<i32> {
    let count = match f.take() {
        Ok(count) => count,
        Err(err) => return pollex::from_error(err),
    };

    if count == terminator {
        return from_value(1821);
    }

    let h = delayed_value(Duration::from_millis(1), ());
    pollex::chain(h, move |g| {
        g.take()?;
        Ok(rec_func1(count, terminator))
    })
}

#[test]
fn mutual_recursion_reaches_a_fixed_point() {
    let _scope = registry_scope();
    // Small quantum: the use case creates a long chain of dependent
    // results.
    let executor = executor(Duration::from_millis(1));
    let _guard = pollex::set_default(Arc::clone(&executor));

    assert_eq!(rec_func1(0, 10).take().expect("terminated"), 1821);
    assert_eq!(rec_func1(0, 100).take().expect("terminated"), 1821);

    executor.stop();
}

#[test]
fn default_registry_forms_compose() {
    let _scope = registry_scope();
    let executor = executor(Duration::from_millis(1));
    let _guard = pollex::set_default(Arc::clone(&executor));

    let f = pollex::then(from_value(20), |x| Ok(x.take()? + 1));
    let g = pollex::chain(f, |x| Ok(from_value(x.take()? * 2)));
    assert_eq!(g.take().expect("value"), 42);

    let all = pollex::all(vec![from_value(1), from_value(2)]);
    let sum: i32 = all
        .take()
        .expect("container")
        .iter()
        .map(|f| f.take().expect("value"))
        .sum();
    assert_eq!(sum, 3);

    let (tx, rx) = mpsc::channel();
    pollex::observe(from_value(5), move |x| {
        let _ = tx.send(x.take().expect("value"));
    });
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).expect("observed"), 5);

    executor.stop();
}
