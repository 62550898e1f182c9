// In demos/shm_producer.rs
use ringpipe::Core::clock::{ClockKind, MonotonicClock};
use ringpipe::SPSC::ChannelBuilder;
use ringpipe::SPSC::Structs::Signal;
use std::env;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <region_name> [count] [capacity]", args[0]);
        std::process::exit(1);
    }
    let name = &args[1];
    let count: i64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1_000_000);
    let capacity: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(64);

    let mut producer = ChannelBuilder::new()
        .with_capacity(capacity)
        .build_shared_producer::<i64>(name)?;
    println!("Producer: created region {name} with {capacity} slots");

    let clock = MonotonicClock::new(ClockKind::System)?;
    let start = clock.read();

    for value in 1..=count {
        let slot = producer.allocate();
        *slot = value;
        producer.push(if value == count {
            Signal::Eof
        } else {
            Signal::None
        });
    }

    let total_seconds = clock.read() - start;
    let megabytes = (count as f64 * std::mem::size_of::<i64>() as f64) / f64::from(1u32 << 20);
    println!("Producer: sent {count} items in {total_seconds:.3}s");
    println!("Producer: Rate: {:.2} MB/s", megabytes / total_seconds);

    Ok(())
}
