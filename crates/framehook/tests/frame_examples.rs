//! End-to-end frames driving `use_event` through the facade.

use std::cell::RefCell;
use std::rc::Rc;

use framehook::prelude::*;
use framehook::{clear_hooks, configure, hooks_debug_info, Callback, RuntimeConfig};

fn key_handler(source: &Signal<(&'static str,)>) -> Vec<(usize, &'static str)> {
    use_event("keyHandler", source)
        .map(|(index, (key,))| (index, key))
        .collect()
}

fn counter(source: &Signal<(u32,)>) -> Vec<(usize, u32)> {
    use_event("counter", source)
        .map(|(index, (value,))| (index, value))
        .collect()
}

#[test]
fn key_handler_example() {
    clear_hooks();
    let key_pressed = Signal::new();

    assert!(run_frame(|| key_handler(&key_pressed)).unwrap().is_empty());

    key_pressed.fire(("A",));
    key_pressed.fire(("B",));
    assert_eq!(
        run_frame(|| key_handler(&key_pressed)).unwrap(),
        vec![(0, "A"), (1, "B")]
    );

    key_pressed.fire(("C",));
    assert_eq!(
        run_frame(|| key_handler(&key_pressed)).unwrap(),
        vec![(0, "C")]
    );
}

#[test]
fn n_events_give_n_records_in_order() {
    clear_hooks();
    let source = Signal::new();
    run_frame(|| counter(&source)).unwrap();

    for n in [0u32, 1, 5, 32] {
        for value in 0..n {
            source.fire((value * 10,));
        }

        let records = run_frame(|| counter(&source)).unwrap();
        let expected: Vec<(usize, u32)> = (0..n).map(|i| (i as usize, i * 10)).collect();
        assert_eq!(records, expected);
    }
}

#[test]
fn reads_within_a_frame_are_idempotent() {
    clear_hooks();
    let source = Signal::new();
    run_frame(|| counter(&source)).unwrap();

    source.fire((1,));
    source.fire((2,));

    let (first, second) = run_frame(|| (counter(&source), counter(&source))).unwrap();
    assert_eq!(first, vec![(0, 1), (1, 2)]);
    assert_eq!(first, second);
}

#[test]
fn changing_the_source_resubscribes() {
    clear_hooks();
    let old = Signal::new();
    let new = Signal::new();

    run_frame(|| counter(&old)).unwrap();
    assert_eq!(old.listener_count(), 1);

    run_frame(|| counter(&new)).unwrap();
    assert_eq!(old.listener_count(), 0);
    assert_eq!(new.listener_count(), 1);

    old.fire((1,));
    new.fire((2,));
    assert_eq!(run_frame(|| counter(&new)).unwrap(), vec![(0, 2)]);
}

#[test]
fn silent_source_is_empty() {
    clear_hooks();
    let source = Signal::new();

    for _ in 0..3 {
        assert!(run_frame(|| counter(&source)).unwrap().is_empty());
    }
    assert_eq!(hooks_debug_info().len(), 1);
}

#[test]
fn callback_style_source() {
    clear_hooks();
    let callbacks: Rc<RefCell<Vec<Callback<(String, u8)>>>> = Rc::default();
    let disposed = Rc::new(RefCell::new(false));

    let registry = callbacks.clone();
    let flag = disposed.clone();
    let source = SignalLike::from_fn(move |callback| {
        registry.borrow_mut().push(callback);
        let flag = flag.clone();
        ConnectionLike::disposer(move || *flag.borrow_mut() = true)
    });

    let scores = |source: &SignalLike<(String, u8)>| -> Vec<(String, u8)> {
        use_event("scores", source).map(|(_, score)| score).collect()
    };

    run_frame(|| scores(&source)).unwrap();
    assert_eq!(callbacks.borrow().len(), 1);

    for callback in callbacks.borrow().iter() {
        callback(("ada".to_string(), 9));
    }
    assert_eq!(
        run_frame(|| scores(&source)).unwrap(),
        vec![("ada".to_string(), 9)]
    );

    run_frame(|| ()).unwrap();
    assert!(*disposed.borrow());
}

#[test]
fn bounded_buffer_keeps_the_newest_events() {
    clear_hooks();
    configure(RuntimeConfig::default().with_buffer_capacity(2));
    let source = Signal::new();
    run_frame(|| counter(&source)).unwrap();

    for value in 1..=4 {
        source.fire((value,));
    }

    let records = run_frame(|| counter(&source)).unwrap();
    configure(RuntimeConfig::default());
    assert_eq!(
        records.iter().map(|(_, value)| *value).collect::<Vec<_>>(),
        vec![3, 4]
    );
}
