// Shared memory backend tests for Linux
// Run with: cargo test --test shared_memory -- --nocapture

#[cfg(target_os = "linux")]
mod linux_tests {
    use ringpipe::Core::{attach_shared_memory, create_shared_memory, gen_shm_name, RawHandle};
    use ringpipe::SPSC::ChannelBuilder;
    use ringpipe::SPSC::Structs::Signal;
    use serial_test::serial;
    use std::thread;

    #[test]
    #[serial]
    fn create_and_attach_share_the_same_bytes() {
        let name = gen_shm_name("ringpipe-rw");
        let size = 4096;
        let created = create_shared_memory(&name, size).unwrap();
        assert_eq!(created.size(), size);
        assert!(!created.as_ptr().is_null());

        unsafe {
            let slice = std::slice::from_raw_parts_mut(created.as_ptr(), size);
            for i in 0..100 {
                slice[i] = (i % 256) as u8;
            }
        }

        let attached = attach_shared_memory(&name, size).unwrap();
        unsafe {
            let slice = std::slice::from_raw_parts(attached.as_ptr(), size);
            for i in 0..100 {
                assert_eq!(slice[i], (i % 256) as u8);
            }
        }
    }

    #[test]
    #[serial]
    fn regions_are_zero_initialized() {
        let name = gen_shm_name("ringpipe-zero");
        let size = 1024;
        let shm = create_shared_memory(&name, size).unwrap();
        unsafe {
            let slice = std::slice::from_raw_parts(shm.as_ptr(), size);
            assert!(slice.iter().all(|&b| b == 0));
        }
    }

    #[test]
    #[serial]
    fn raw_handle_is_a_file_descriptor() {
        let name = gen_shm_name("ringpipe-fd");
        let shm = create_shared_memory(&name, 4096).unwrap();
        match shm.raw_handle() {
            RawHandle::Fd(fd) => assert!(fd > 0, "file descriptor should be positive"),
            RawHandle::Anon => panic!("shared region reported a heap handle"),
        }
    }

    #[test]
    #[serial]
    fn creating_a_taken_name_is_a_collision() {
        let name = gen_shm_name("ringpipe-dup");
        let _first = create_shared_memory(&name, 4096).unwrap();

        let second = create_shared_memory(&name, 4096);
        assert_eq!(
            second.unwrap_err().kind(),
            std::io::ErrorKind::AlreadyExists
        );
    }

    #[test]
    #[serial]
    fn attaching_with_a_different_size_is_rejected() {
        let name = gen_shm_name("ringpipe-size");
        let _created = create_shared_memory(&name, 4096).unwrap();

        let attached = attach_shared_memory(&name, 8192);
        assert_eq!(attached.unwrap_err().kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    #[serial]
    fn attaching_a_missing_name_fails() {
        let attached = attach_shared_memory(&gen_shm_name("ringpipe-missing"), 4096);
        assert_eq!(attached.unwrap_err().kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    #[serial]
    fn attaching_an_uninitialized_region_is_not_a_ring() {
        // Raw bytes without a producer-written header must be rejected by the
        // consumer-side constructor.
        let name = gen_shm_name("ringpipe-garbage");
        let size = ringpipe::SPSC::Buffer::layout::region_size::<i64>(16);
        let _raw = create_shared_memory(&name, size).unwrap();

        let consumer = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_consumer::<i64>(&name);
        assert_eq!(consumer.unwrap_err().kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    #[serial]
    fn second_consumer_attachment_is_rejected() {
        let name = gen_shm_name("ringpipe-twoconsumers");
        let _producer = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_producer::<i64>(&name)
            .unwrap();

        let first = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_consumer::<i64>(&name);
        assert!(first.is_ok());

        let second = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_consumer::<i64>(&name);
        assert!(second.is_err());
    }

    #[test]
    #[serial]
    fn capacity_mismatch_between_attachers_is_rejected() {
        let name = gen_shm_name("ringpipe-capmismatch");
        let _producer = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_producer::<i64>(&name)
            .unwrap();

        let consumer = ChannelBuilder::new()
            .with_capacity(32)
            .build_shared_consumer::<i64>(&name);
        assert_eq!(consumer.unwrap_err().kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    #[serial]
    fn ring_round_trip_across_two_mappings() {
        // Same process, two independent mappings of the same named object -
        // the single-process analog of the two-process transfer.
        let name = gen_shm_name("ringpipe-roundtrip");
        let mut producer = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_producer::<i64>(&name)
            .unwrap();
        let mut consumer = ChannelBuilder::new()
            .with_capacity(16)
            .build_shared_consumer::<i64>(&name)
            .unwrap();

        const COUNT: i64 = 10_000;
        let producer_thread = thread::spawn(move || {
            for value in 1..=COUNT {
                producer.push_item(
                    value,
                    if value == COUNT { Signal::Eof } else { Signal::None },
                );
            }
        });

        let mut value = 0i64;
        let mut signal = Signal::None;
        let mut expected = 1i64;
        while signal != Signal::Eof {
            consumer.pop(&mut value, Some(&mut signal));
            assert_eq!(value, expected);
            expected += 1;
        }
        assert_eq!(value, COUNT);
        assert!(consumer.write_finished());

        producer_thread.join().unwrap();
    }
}

#[cfg(not(target_os = "linux"))]
mod non_linux_tests {
    use ringpipe::Core::{attach_shared_memory, create_shared_memory};

    #[test]
    fn create_is_unsupported_off_linux() {
        let result = create_shared_memory("ringpipe-test", 4096);
        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::Unsupported);
    }

    #[test]
    fn attach_is_unsupported_off_linux() {
        let result = attach_shared_memory("ringpipe-test", 4096);
        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::Unsupported);
    }
}
