// In demos/throughput.rs
// Heap-backed round trip: one producer thread, one consumer thread, timed by
// the background-updated clock.
use ringpipe::Core::clock::{ClockKind, MonotonicClock};
use ringpipe::SPSC::ChannelBuilder;
use ringpipe::SPSC::Structs::Signal;
use std::env;
use std::thread;

const BUFFSIZE: usize = 100;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let send_count: i64 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000_000);
    let runs: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let clock = MonotonicClock::new(ClockKind::System)?;

    for run in 0..runs {
        let (mut tx, mut rx) = ChannelBuilder::new()
            .with_capacity(BUFFSIZE)
            .build_heap::<i64>()?;

        let clock_ref = &clock;
        let (start, (last, sum, end)) = thread::scope(|s| {
            let producer = s.spawn(move || {
                let start = clock_ref.read();
                for value in 1..=send_count {
                    let slot = tx.allocate();
                    *slot = value;
                    tx.push(if value == send_count {
                        Signal::Eof
                    } else {
                        Signal::None
                    });
                }
                start
            });
            let consumer = s.spawn(move || {
                let mut value: i64 = 0;
                let mut signal = Signal::None;
                let mut sum: i128 = 0;
                while signal != Signal::Eof {
                    rx.pop(&mut value, Some(&mut signal));
                    sum += value as i128;
                }
                (value, sum, clock_ref.read())
            });
            (
                producer.join().expect("producer thread panicked"),
                consumer.join().expect("consumer thread panicked"),
            )
        });

        assert_eq!(last, send_count);
        let expected: i128 = send_count as i128 * (send_count as i128 + 1) / 2;
        assert_eq!(sum, expected);

        let total_seconds = end - start;
        let megabytes = (send_count as f64 * std::mem::size_of::<i64>() as f64) / f64::from(1u32 << 20);
        println!("Run {run}: Time: {total_seconds:.6}s");
        println!("Run {run}: Rate: {:.2} MB/s", megabytes / total_seconds);
        println!();
    }

    Ok(())
}
