//! Hands phase-one output from worker threads to the thread owning the
//! texture backend.
//!
//! Workers encode with the `*_any_thread` functions and send the result as an
//! [`EncodeJob`]. The owner thread drains its [`OwnerThreadQueue`] once per
//! frame, realizing each job and getting it back as a [`RealizedJob`].

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::realize::{Realize, TextureBackend};

#[remain::sorted]
#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("The other end of the owner thread channel was dropped")]
    Disconnected,
}

/// Phase-one output waiting to be realized, tagged with a caller-chosen id.
#[derive(Debug)]
pub struct EncodeJob<T> {
    pub id: u64,
    pub payload: T,
}

#[derive(Debug)]
pub struct RealizedJob<T> {
    pub id: u64,
    pub payload: T,
    /// False if at least one texture of the payload failed to realize.
    pub success: bool,
}

/// Worker side of the channel. Clone it for each worker.
#[derive(Debug)]
pub struct JobSender<T> {
    sender: Sender<EncodeJob<T>>,
}

impl<T> Clone for JobSender<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Send> JobSender<T> {
    pub fn send(&self, id: u64, payload: T) -> Result<(), Err> {
        self.sender.send(EncodeJob { id, payload }).map_err(|_| Err::Disconnected)
    }
}

/// Owner-thread side of the channel.
#[derive(Debug)]
pub struct OwnerThreadQueue<T> {
    receiver: Receiver<EncodeJob<T>>,
}

/// Creates a connected sender/queue pair.
pub fn owner_thread_channel<T: Realize + Send>() -> (JobSender<T>, OwnerThreadQueue<T>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (JobSender { sender }, OwnerThreadQueue { receiver })
}

impl<T: Realize + Send> OwnerThreadQueue<T> {
    fn realize_job<B: TextureBackend + ?Sized>(job: EncodeJob<T>, backend: &mut B) -> RealizedJob<T> {
        let EncodeJob { id, mut payload } = job;
        let success = payload.realize(backend);
        if !success {
            tracing::warn!("Job {} realized with failures", id);
        }
        RealizedJob { id, payload, success }
    }

    /// Realizes every job already queued, without blocking.
    pub fn realize_pending<B: TextureBackend + ?Sized>(&self, backend: &mut B) -> Vec<RealizedJob<T>> {
        let mut realized = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(job) => realized.push(Self::realize_job(job, backend)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if !realized.is_empty() {
            tracing::debug!("Realized {} queued jobs", realized.len());
        }
        realized
    }

    /// Waits for the next job and realizes it. Fails once every sender is
    /// dropped and the queue is empty.
    pub fn realize_next<B: TextureBackend + ?Sized>(&self, backend: &mut B) -> Result<RealizedJob<T>, Err> {
        let job = self.receiver.recv().map_err(|_| Err::Disconnected)?;
        Ok(Self::realize_job(job, backend))
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
