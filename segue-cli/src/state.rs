use segue_core::{RepeatAndShuffleModes, Track, commands::QueueResponse};

/// What the front end knows about the engine, built purely from responses
#[derive(Debug, Default)]
pub struct AppState {
    /// Index and track currently playing
    pub now_playing: Option<(usize, Track)>,
    pub queue_size: usize,
    pub modes: RepeatAndShuffleModes,
    /// Status message to display
    pub status_message: String,
    /// Error message if any
    pub error_message: Option<String>,
    pub shutdown: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_response(&mut self, response: QueueResponse) {
        self.error_message = None;

        match response {
            QueueResponse::TrackChanged { index, track } => {
                self.status_message = format!("Playing {}/{}: {}", index + 1, self.queue_size, track);
                self.now_playing = Some((index, track));
            }
            QueueResponse::Stopped => {
                self.now_playing = None;
                self.status_message = "Stopped".to_string();
            }
            QueueResponse::Unchanged => {
                self.status_message = "No track to skip to".to_string();
            }
            QueueResponse::QueueUpdated { size, current_index } => {
                self.queue_size = size;
                match (current_index, self.now_playing.take()) {
                    (Some(index), Some((_, track))) => self.now_playing = Some((index, track)),
                    _ => self.now_playing = None,
                }
                self.status_message = format!("{} tracks queued", size);
            }
            QueueResponse::ModesChanged(modes) => {
                self.modes = modes;
                self.status_message = modes.to_string();
            }
            QueueResponse::Peeked {
                subsequent,
                next,
                previous,
            } => {
                self.status_message = format!(
                    "subsequent: {}, next: {}, previous: {}",
                    describe(subsequent.as_ref()),
                    describe(next.as_ref()),
                    describe(previous.as_ref())
                );
            }
            QueueResponse::SearchResults(results) => {
                if results.is_empty() {
                    self.status_message = "No matching tracks".to_string();
                } else {
                    let lines: Vec<String> = results
                        .iter()
                        .map(|result| format!("{:>5}  {} ({})", result.index, result.track, result.matched_field))
                        .collect();
                    self.status_message = format!("{} matches\n{}", results.len(), lines.join("\n"));
                }
            }
            QueueResponse::GaplessReady(modes) => {
                self.modes = modes;
                self.status_message = format!("Ready for gapless playback ({})", modes);
            }
            QueueResponse::Error(msg) => {
                self.status_message = format!("Error: {}", msg);
                self.error_message = Some(msg);
            }
            QueueResponse::Shutdown => {
                self.shutdown = true;
                self.status_message = "Engine shutdown".to_string();
            }
        }
    }
}

fn describe(track: Option<&Track>) -> String {
    track.map_or_else(|| "-".to_string(), |track| track.to_string())
}
