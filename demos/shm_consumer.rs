// In demos/shm_consumer.rs
use ringpipe::SPSC::ChannelBuilder;
use ringpipe::SPSC::Structs::Signal;
use std::env;
use std::time::{Duration, Instant};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <region_name> [count] [capacity]", args[0]);
        std::process::exit(1);
    }
    let name = &args[1];
    let count: i64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1_000_000);
    let capacity: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(64);

    // The producer process may not have initialized the region yet
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut consumer = loop {
        match ChannelBuilder::new()
            .with_capacity(capacity)
            .build_shared_consumer::<i64>(name)
        {
            Ok(consumer) => break consumer,
            Err(_) if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(e),
        }
    };
    println!("Consumer: attached to region {name}");

    let mut value: i64 = 0;
    let mut signal = Signal::None;
    let mut sum: i128 = 0;
    let mut received: i64 = 0;
    while signal != Signal::Eof {
        consumer.pop(&mut value, Some(&mut signal));
        sum += value as i128;
        received += 1;
    }

    let expected: i128 = count as i128 * (count as i128 + 1) / 2;
    if received == count && value == count && sum == expected {
        println!("Consumer: received {received} items, sum ok");
        Ok(())
    } else {
        eprintln!("Consumer: sequence mismatch (received {received}, last value {value})");
        std::process::exit(1);
    }
}
