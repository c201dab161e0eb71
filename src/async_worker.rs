use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;

use suggest_core::composer::Composer;
use suggest_core::suggest::Suggest;
use tracing::debug;

use crate::api::SuggestionResponse;

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

pub(crate) struct SuggestWork {
    pub composer: Composer,
    pub previous_word: Option<String>,
    pub generation: u64,
}

pub(crate) struct SuggestResult {
    pub generation: u64,
    pub response: SuggestionResponse,
}

// ---------------------------------------------------------------------------
// AsyncWorker
// ---------------------------------------------------------------------------

/// Runs suggestion queries off the caller's thread. Only the most recent
/// submission is answered; anything older is dropped.
pub(crate) struct AsyncWorker {
    work_tx: mpsc::Sender<SuggestWork>,
    result_rx: Mutex<mpsc::Receiver<SuggestResult>>,
    generation: Arc<AtomicU64>,
}

impl AsyncWorker {
    pub fn new(suggest: Arc<Mutex<Suggest>>) -> io::Result<Self> {
        let generation = Arc::new(AtomicU64::new(0));
        let (work_tx, work_rx) = mpsc::channel::<SuggestWork>();
        let (result_tx, result_rx) = mpsc::channel::<SuggestResult>();
        {
            let gen = Arc::clone(&generation);
            thread::Builder::new()
                .name("keysuggest-suggestions".into())
                .spawn(move || suggestion_worker(work_rx, result_tx, gen, suggest))?;
        }
        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
            generation,
        })
    }

    /// Queue a query and return its generation.
    pub fn submit(&self, composer: Composer, previous_word: Option<String>) -> u64 {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.work_tx.send(SuggestWork {
            composer,
            previous_word,
            generation: gen,
        });
        gen
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn try_recv(&self) -> Option<SuggestResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn suggestion_worker(
    rx: mpsc::Receiver<SuggestWork>,
    tx: mpsc::Sender<SuggestResult>,
    gen: Arc<AtomicU64>,
    suggest: Arc<Mutex<Suggest>>,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple work items queued, skip to latest
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        if latest.generation != gen.load(Ordering::SeqCst) {
            continue;
        }

        let response = {
            let mut suggest = suggest.lock().unwrap_or_else(PoisonError::into_inner);
            let words =
                suggest.get_suggestions(&latest.composer, false, latest.previous_word.as_deref());
            SuggestionResponse {
                words,
                has_correction: suggest.has_minimal_correction(),
            }
        };

        if latest.generation != gen.load(Ordering::SeqCst) {
            debug!(generation = latest.generation, "dropping stale suggestions");
            continue;
        }

        let _ = tx.send(SuggestResult {
            generation: latest.generation,
            response,
        });
    }
}
