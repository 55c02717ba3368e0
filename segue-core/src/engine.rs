use std::thread::{self, JoinHandle};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};

use crate::commands::{QueueCommand, QueueResponse};
use crate::queue::PlaybackQueue;
use crate::track::Track;
use crate::track_list::TrackList;

/// Owns the play queue on a dedicated thread. All sequencing goes through
/// its command channel, so only one thread ever moves the playback position.
pub struct QueueEngine {
    queue: PlaybackQueue,
    cmd_rx: Receiver<QueueCommand>,
    resp_tx: Sender<QueueResponse>,
}

/// Front end side of a [`QueueEngine`]
#[derive(Clone)]
pub struct QueueEngineHandle {
    pub cmd_tx: Sender<QueueCommand>,
    pub resp_rx: Receiver<QueueResponse>,
    /// Shared with the engine, for reads and metadata updates from other
    /// threads
    pub tracks: TrackList,
}

impl QueueEngineHandle {
    pub fn send(&self, command: QueueCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(command)
            .context("Queue engine is no longer running")
    }
}

impl QueueEngine {
    pub fn new() -> (Self, QueueEngineHandle) {
        Self::with_queue(PlaybackQueue::new())
    }

    pub fn with_queue(queue: PlaybackQueue) -> (Self, QueueEngineHandle) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded();

        let handle = QueueEngineHandle {
            cmd_tx,
            resp_rx,
            tracks: queue.track_list().clone(),
        };
        let engine = QueueEngine {
            queue,
            cmd_rx,
            resp_tx,
        };

        (engine, handle)
    }

    /// Run the engine on its own thread until `Quit` or until every handle
    /// is dropped
    pub fn spawn(self) -> anyhow::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("queue-engine".to_string())
            .spawn(move || self.run())
            .context("Failed to spawn queue engine thread")
    }

    pub fn run(mut self) {
        log::info!("Queue engine started");

        while let Ok(command) = self.cmd_rx.recv() {
            if let QueueCommand::Quit = command {
                break;
            }

            log::debug!("Queue engine received {:?}", command);
            let response = self.handle_command(command);
            if self.resp_tx.send(response).is_err() {
                log::warn!("Front end disconnected, stopping queue engine");
                return;
            }
        }

        log::info!("Queue engine shutting down");
        let _ = self.resp_tx.send(QueueResponse::Shutdown);
    }

    fn handle_command(&mut self, command: QueueCommand) -> QueueResponse {
        match command {
            QueueCommand::Add(tracks) => {
                self.queue.add_tracks(tracks);
                self.queue_updated()
            }
            QueueCommand::Insert { tracks, at } => {
                self.queue.insert_tracks(tracks, at);
                self.queue_updated()
            }
            QueueCommand::Remove(indices) => {
                self.queue.remove_tracks(&indices);
                self.queue_updated()
            }
            QueueCommand::Clear => {
                self.queue.remove_all_tracks();
                self.queue_updated()
            }
            QueueCommand::MoveUp(indices) => {
                self.queue.move_tracks_up(&indices);
                self.queue_updated()
            }
            QueueCommand::MoveDown(indices) => {
                self.queue.move_tracks_down(&indices);
                self.queue_updated()
            }
            QueueCommand::MoveToTop(indices) => {
                self.queue.move_tracks_to_top(&indices);
                self.queue_updated()
            }
            QueueCommand::MoveToBottom(indices) => {
                self.queue.move_tracks_to_bottom(&indices);
                self.queue_updated()
            }
            QueueCommand::Move { indices, drop_index } => {
                self.queue.move_tracks(&indices, drop_index);
                self.queue_updated()
            }
            QueueCommand::MoveToPlayNext(indices) => {
                self.queue.move_tracks_to_play_next(&indices);
                self.queue_updated()
            }
            QueueCommand::EnqueueNext(tracks) => {
                self.queue.enqueue_tracks_after_current_track(tracks);
                self.queue_updated()
            }
            QueueCommand::Sort(sort) => {
                self.queue.sort(sort);
                self.queue_updated()
            }
            QueueCommand::Start => {
                let track = self.queue.start();
                self.track_changed(track)
            }
            QueueCommand::Stop => {
                self.queue.stop();
                QueueResponse::Stopped
            }
            QueueCommand::Select(index) => match self.queue.select(index) {
                Some(track) => self.track_changed(Some(track)),
                None => QueueResponse::Error(format!("No track at index {}", index)),
            },
            QueueCommand::SelectTrack(key) => match self.queue.select_track(&key) {
                Some(track) => self.track_changed(Some(track)),
                None => QueueResponse::Error(format!("{} is not in the queue", key)),
            },
            QueueCommand::SelectGroup(group) => {
                let track = self.queue.select_group(group);
                self.track_changed(track)
            }
            QueueCommand::SetScope(scope) => {
                self.queue.set_scope(scope);
                self.queue_updated()
            }
            QueueCommand::Subsequent => {
                let track = self.queue.subsequent();
                self.track_changed(track)
            }
            QueueCommand::Next => {
                let track = self.queue.next();
                self.track_changed(track)
            }
            QueueCommand::Previous => {
                let track = self.queue.previous();
                self.track_changed(track)
            }
            QueueCommand::Peek => QueueResponse::Peeked {
                subsequent: self.queue.peek_subsequent(),
                next: self.queue.peek_next(),
                previous: self.queue.peek_previous(),
            },
            QueueCommand::SetRepeatMode(mode) => QueueResponse::ModesChanged(self.queue.set_repeat_mode(mode)),
            QueueCommand::SetShuffleMode(mode) => QueueResponse::ModesChanged(self.queue.set_shuffle_mode(mode)),
            QueueCommand::ToggleRepeatMode => QueueResponse::ModesChanged(self.queue.toggle_repeat_mode()),
            QueueCommand::ToggleShuffleMode => QueueResponse::ModesChanged(self.queue.toggle_shuffle_mode()),
            QueueCommand::Search(query) => QueueResponse::SearchResults(self.queue.search(&query)),
            QueueCommand::PrepareGapless => match self.queue.prepare_for_gapless_playback() {
                Ok(()) => QueueResponse::GaplessReady(self.queue.repeat_and_shuffle_modes()),
                Err(err) => QueueResponse::Error(err.to_string()),
            },
            // handled by the run loop
            QueueCommand::Quit => QueueResponse::Shutdown,
        }
    }

    fn queue_updated(&self) -> QueueResponse {
        QueueResponse::QueueUpdated {
            size: self.queue.size(),
            current_index: self.queue.current_index(),
        }
    }

    /// `None` from navigation means either the sequence ended (stopped) or
    /// there was nowhere to go (still playing)
    fn track_changed(&self, track: Option<Track>) -> QueueResponse {
        match (track, self.queue.current_index()) {
            (Some(track), Some(index)) => QueueResponse::TrackChanged { index, track },
            (_, None) => QueueResponse::Stopped,
            (None, Some(_)) => QueueResponse::Unchanged,
        }
    }
}
