// Cross-process transfer: a producer process and a consumer process attach to
// the same named region and move a numbered sequence plus its end-of-stream
// tag through it.

#[cfg(target_os = "linux")]
mod linux_integration {
    use std::io;
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::Duration;

    // Test lock to prevent parallel test execution
    static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    const COUNT: usize = 200_000;
    const CAPACITY: usize = 64;

    #[test]
    fn cross_process_transfer() -> io::Result<()> {
        let _guard = TEST_LOCK.lock();

        let region = format!("ringpipe-itest-{}", std::process::id());
        let count = COUNT.to_string();
        let capacity = CAPACITY.to_string();

        // Start the producer process FIRST (it creates the region)
        let producer = Command::new("cargo")
            .args(["run", "--example", "shm_producer", "--"])
            .arg(&region)
            .arg(&count)
            .arg(&capacity)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Give the producer time to create the region; the consumer also
        // retries attachment on its own
        thread::sleep(Duration::from_millis(500));

        let consumer = Command::new("cargo")
            .args(["run", "--example", "shm_consumer", "--"])
            .arg(&region)
            .arg(&count)
            .arg(&capacity)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The consumer finishes once it has seen the full sequence
        let consumer_output = consumer.wait_with_output()?;
        let producer_output = producer.wait_with_output()?;

        assert!(
            producer_output.status.success(),
            "producer failed:\n{}",
            String::from_utf8_lossy(&producer_output.stderr)
        );
        assert!(
            consumer_output.status.success(),
            "consumer failed:\n{}",
            String::from_utf8_lossy(&consumer_output.stderr)
        );

        let stdout = String::from_utf8_lossy(&consumer_output.stdout);
        assert!(
            stdout.contains("sum ok"),
            "consumer did not verify the sequence:\n{stdout}"
        );
        Ok(())
    }
}
