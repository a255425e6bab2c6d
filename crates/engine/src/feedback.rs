//! Renderer-facing feedback queue.
//!
//! Actions request show-state changes (currently: target highlighting) by
//! id; the renderer drains the queue each frame and owns every render
//! resource itself.

use bevy::prelude::*;

use crate::oracle::HighlightKind;

/// One request toward the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackRequest {
    Highlight { sid: String, kind: HighlightKind },
    Unhighlight { sid: String },
}

/// Queue of pending requests, drained by the render layer.
#[derive(Resource, Default)]
pub struct SceneFeedback {
    requests: Vec<FeedbackRequest>,
}

impl SceneFeedback {
    pub fn highlight(&mut self, sid: &str, kind: HighlightKind) {
        self.requests.push(FeedbackRequest::Highlight {
            sid: sid.to_string(),
            kind,
        });
    }

    pub fn unhighlight(&mut self, sid: &str) {
        self.requests.push(FeedbackRequest::Unhighlight {
            sid: sid.to_string(),
        });
    }

    pub fn drain(&mut self) -> Vec<FeedbackRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
