//! Fixed-size worker thread pool: each worker owns a bounded (but growable-on-overflow) ring
//! buffer of jobs, and waits on its own condition variable when idle. The dispatcher load-balances
//! by queue depth and notifies a worker when its queue transitions from empty to non-empty.

use crate::arena::Arena;
use crate::strview::StringBuilder;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const INITIAL_QUEUE_CAPACITY: usize = 32;

/// A unit of work a worker runs with exclusive access to its own arena and string builder. The
/// third argument is the index of the worker running it, for callers (tests, metrics) that need
/// to attribute a job to the worker that actually executed it.
pub type Job = Box<dyn FnOnce(&mut Arena, &mut StringBuilder, usize) + Send + 'static>;

struct RingQueue {
    buf: Vec<Option<Job>>,
    read: usize,
    write: usize,
    size: usize,
}

impl RingQueue {
    fn with_capacity(cap: usize) -> Self {
        Self {
            buf: (0..cap).map(|_| None).collect(),
            read: 0,
            write: 0,
            size: 0,
        }
    }

    fn cap(&self) -> usize {
        self.buf.len()
    }

    fn len(&self) -> usize {
        self.size
    }

    fn push(&mut self, job: Job) {
        if self.size == self.cap() {
            self.grow();
        }
        self.buf[self.write] = Some(job);
        self.write = (self.write + 1) % self.cap();
        self.size += 1;
    }

    fn pop(&mut self) -> Option<Job> {
        if self.size == 0 {
            return None;
        }
        let job = self.buf[self.read].take();
        self.read = (self.read + 1) % self.cap();
        self.size -= 1;
        job
    }

    /// Doubles capacity, preserving FIFO order. See SPEC_FULL.md §9 on resolving the spec's
    /// contradictory "block on full" vs. "double cap on full" descriptions in favor of growth.
    fn grow(&mut self) {
        let old_cap = self.cap();
        let new_cap = old_cap * 2;
        let mut new_buf: Vec<Option<Job>> = (0..new_cap).map(|_| None).collect();
        for (i, slot) in new_buf.iter_mut().enumerate().take(self.size) {
            *slot = self.buf[(self.read + i) % old_cap].take();
        }
        self.buf = new_buf;
        self.read = 0;
        self.write = self.size;
    }
}

struct WorkerHandle {
    queue: Arc<Mutex<RingQueue>>,
    cv_mutex: Arc<Mutex<()>>,
    condvar: Arc<Condvar>,
    // Held only so the worker thread is detached (kept running) for the process's lifetime;
    // there is no shutdown path, matching SPEC_FULL.md §4.3 ("Cancellation: None").
    _thread: JoinHandle<()>,
}

impl WorkerHandle {
    fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }
}

/// A fixed, ordered sequence of workers, immutable after construction.
pub struct ThreadPool {
    workers: Vec<WorkerHandle>,
}

impl ThreadPool {
    pub fn new(count: usize) -> Self {
        assert!(count > 0, "thread pool must have at least one worker");
        let workers = (0..count).map(spawn_worker).collect();
        Self { workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Picks the least-loaded worker (ties broken by lowest index — an approximate,
    /// intentionally-unlocked scan; see SPEC_FULL.md §9, "Load balancer race"), enqueues the job,
    /// and notifies that worker if its queue just went from empty to non-empty.
    pub fn schedule(&self, job: Job) {
        let target = self
            .workers
            .iter()
            .enumerate()
            .min_by_key(|(_, w)| w.queue_len())
            .map(|(i, _)| i)
            .expect("pool always has at least one worker");

        let worker = &self.workers[target];
        let became_nonempty = {
            let mut queue = worker.queue.lock();
            let was_empty = queue.len() == 0;
            queue.push(job);
            was_empty
        };

        if became_nonempty {
            let _guard = worker.cv_mutex.lock();
            worker.condvar.notify_one();
        }
    }

    #[cfg(test)]
    pub fn queue_lengths(&self) -> Vec<usize> {
        self.workers.iter().map(|w| w.queue_len()).collect()
    }
}

fn spawn_worker(index: usize) -> WorkerHandle {
    let queue = Arc::new(Mutex::new(RingQueue::with_capacity(INITIAL_QUEUE_CAPACITY)));
    let cv_mutex = Arc::new(Mutex::new(()));
    let condvar = Arc::new(Condvar::new());

    let thread_queue = Arc::clone(&queue);
    let thread_cv_mutex = Arc::clone(&cv_mutex);
    let thread_condvar = Arc::clone(&condvar);

    let handle =
        thread::spawn(move || worker_loop(index, thread_queue, thread_cv_mutex, thread_condvar));

    WorkerHandle {
        queue,
        cv_mutex,
        condvar,
        _thread: handle,
    }
}

fn worker_loop(index: usize, queue: Arc<Mutex<RingQueue>>, cv_mutex: Arc<Mutex<()>>, condvar: Arc<Condvar>) {
    let mut arena = Arena::new();
    let mut builder = StringBuilder::with_capacity(1024);

    loop {
        {
            let mut guard = cv_mutex.lock();
            while queue.lock().len() == 0 {
                condvar.wait(&mut guard);
            }
        }

        loop {
            let job = queue.lock().pop();
            match job {
                Some(job) => {
                    job(&mut arena, &mut builder, index);
                    arena.reset();
                    builder.clear();
                }
                None => break,
            }
        }
    }
}
