//! Concurrency scenario: allocations made on one set of threads, freed on a
//! different set, in whatever interleaving the scheduler produces. The
//! registry must end where it started and no untracked-pointer warning may
//! appear.

use std::sync::mpsc;
use std::sync::{Mutex, Once};
use std::thread;

use allocgate_core::diag::{self, WarnKind};
use allocgate_core::{entry, registry, system};

static INIT: Once = Once::new();
// Both scenarios assert on process-global registry totals; run them one at a
// time.
static SERIAL: Mutex<()> = Mutex::new(());

fn ensure_init() {
    INIT.call_once(|| {
        system::init().expect("first init");
    });
}

#[test]
fn cross_thread_allocate_free_leaves_registry_empty() {
    ensure_init();
    let _serial = SERIAL.lock().unwrap();

    const THREADS: usize = 4;
    const SIZE: usize = 128;
    const ALIGN: usize = 32;

    let untracked_before = diag::warn_count(WarnKind::UntrackedFree);
    let live_before = registry::live_count();

    let (tx, rx) = mpsc::channel::<usize>();
    let mut producers = Vec::new();
    for _ in 0..THREADS {
        let tx = tx.clone();
        producers.push(thread::spawn(move || {
            let ptr = entry::try_allocate_aligned(SIZE, ALIGN).expect("allocation");
            assert_eq!(ptr.as_ptr() as usize % ALIGN, 0);
            tx.send(ptr.as_ptr() as usize).expect("send");
        }));
    }
    drop(tx);

    let addresses: Vec<usize> = rx.iter().collect();
    assert_eq!(addresses.len(), THREADS);
    for handle in producers {
        handle.join().expect("producer thread");
    }

    let mut consumers = Vec::new();
    for addr in addresses {
        consumers.push(thread::spawn(move || {
            entry::release_sized_aligned(addr as *mut u8, SIZE, ALIGN);
        }));
    }
    for handle in consumers {
        handle.join().expect("consumer thread");
    }

    assert_eq!(registry::live_count(), live_before);
    assert_eq!(diag::warn_count(WarnKind::UntrackedFree), untracked_before);
}

#[test]
fn parallel_churn_keeps_per_pointer_bookkeeping_exact() {
    ensure_init();
    let _serial = SERIAL.lock().unwrap();

    const THREADS: usize = 4;
    const ITERATIONS: usize = 500;

    let live_before = registry::live_count();
    let mut workers = Vec::new();
    for seed in 0..THREADS {
        workers.push(thread::spawn(move || {
            let mut state = (seed as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
            for _ in 0..ITERATIONS {
                // xorshift64 for a cheap deterministic size mix.
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let size = 1 + (state as usize % 1024);
                let align = 1usize << ((state >> 60) as u32 % 8);
                let ptr = entry::try_allocate_aligned(size, align).expect("allocation");
                entry::release_sized_aligned(ptr.as_ptr(), size, align);
            }
        }));
    }
    for handle in workers {
        handle.join().expect("worker thread");
    }

    assert_eq!(registry::live_count(), live_before);
}
