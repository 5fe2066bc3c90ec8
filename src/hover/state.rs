//! Hover request bookkeeping
//!
//! Tracks the location of the most recent hover and where its generation
//! stands. All transitions are synchronous; the provider serializes access.

use lsp_types::Position;

use super::content::HoverContent;

/// Document and position a hover was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverLocation {
    pub uri: String,
    pub position: Position,
}

impl HoverLocation {
    pub fn new(uri: impl Into<String>, line: u32, character: u32) -> Self {
        Self {
            uri: uri.into(),
            position: Position::new(line, character),
        }
    }

    /// Same document, same line, and at most one column apart.
    ///
    /// Editors report the hover position on either side of a token boundary,
    /// so a one column shift still refers to the same hover.
    pub fn is_same_hover(&self, other: &HoverLocation) -> bool {
        self.uri == other.uri
            && self.position.line == other.position.line
            && self.position.character.abs_diff(other.position.character) <= 1
    }
}

/// Where the current hover's generation stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HoverPhase {
    #[default]
    Idle,
    /// Generation was requested and has not completed
    Waiting,
    /// Generated description is available
    Ready { content: String },
    /// A generation was superseded while waiting; its result must be
    /// dropped once it arrives
    CancelledPendingAck { location: HoverLocation },
}

#[derive(Debug, Default)]
pub struct HoverState {
    target: Option<HoverLocation>,
    phase: HoverPhase,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&HoverLocation> {
        self.target.as_ref()
    }

    pub fn phase(&self) -> &HoverPhase {
        &self.phase
    }

    /// Answer a hover at `location`.
    ///
    /// A repeat of the current hover shows the description or the loading
    /// indicator; anything else starts over at `location` and offers the
    /// generate prompt.
    pub fn request(&mut self, location: HoverLocation) -> HoverContent {
        if self
            .target
            .as_ref()
            .is_some_and(|target| target.is_same_hover(&location))
        {
            match &self.phase {
                HoverPhase::Ready { content } => return HoverContent::Description(content.clone()),
                HoverPhase::Waiting => return HoverContent::Loading,
                HoverPhase::Idle | HoverPhase::CancelledPendingAck { .. } => {}
            }
        }

        self.reset();
        self.target = Some(location);
        HoverContent::GeneratePrompt
    }

    pub fn mark_waiting(&mut self) {
        self.phase = HoverPhase::Waiting;
    }

    pub fn deliver(&mut self, content: String) {
        self.phase = HoverPhase::Ready { content };
    }

    /// True once for a superseded generation at exactly `location`.
    pub fn acknowledge_cancellation(&mut self, location: &HoverLocation) -> bool {
        match &self.phase {
            HoverPhase::CancelledPendingAck { location: cancelled } if cancelled == location => {
                self.phase = HoverPhase::Idle;
                true
            }
            _ => false,
        }
    }

    // A waiting generation becomes a pending cancellation; an unacknowledged
    // cancellation survives further resets.
    fn reset(&mut self) {
        self.phase = match std::mem::take(&mut self.phase) {
            HoverPhase::Waiting => match self.target.clone() {
                Some(location) => HoverPhase::CancelledPendingAck { location },
                None => HoverPhase::Idle,
            },
            pending @ HoverPhase::CancelledPendingAck { .. } => pending,
            HoverPhase::Idle | HoverPhase::Ready { .. } => HoverPhase::Idle,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "file:///work/widget.cpp";

    #[test]
    fn test_column_tolerance() {
        let base = HoverLocation::new(URI, 10, 5);
        assert!(base.is_same_hover(&HoverLocation::new(URI, 10, 5)));
        assert!(base.is_same_hover(&HoverLocation::new(URI, 10, 6)));
        assert!(base.is_same_hover(&HoverLocation::new(URI, 10, 4)));
        assert!(!base.is_same_hover(&HoverLocation::new(URI, 10, 7)));
        assert!(!base.is_same_hover(&HoverLocation::new(URI, 11, 5)));
        assert!(!base.is_same_hover(&HoverLocation::new("file:///work/other.cpp", 10, 5)));
    }

    #[test]
    fn test_fresh_request_offers_prompt() {
        let mut state = HoverState::new();
        let location = HoverLocation::new(URI, 3, 8);

        assert_eq!(state.request(location.clone()), HoverContent::GeneratePrompt);
        assert_eq!(state.target(), Some(&location));
        assert_eq!(state.phase(), &HoverPhase::Idle);
    }

    #[test]
    fn test_ready_content_is_idempotent() {
        let mut state = HoverState::new();
        state.request(HoverLocation::new(URI, 3, 8));
        state.mark_waiting();
        state.deliver("Computes the checksum.".to_string());

        for character in [8, 9, 8] {
            assert_eq!(
                state.request(HoverLocation::new(URI, 3, character)),
                HoverContent::Description("Computes the checksum.".to_string())
            );
        }
    }

    #[test]
    fn test_waiting_shows_loading() {
        let mut state = HoverState::new();
        state.request(HoverLocation::new(URI, 3, 8));
        state.mark_waiting();

        assert_eq!(state.request(HoverLocation::new(URI, 3, 9)), HoverContent::Loading);
        assert_eq!(state.phase(), &HoverPhase::Waiting);
    }

    #[test]
    fn test_moving_away_while_waiting_records_cancellation() {
        let mut state = HoverState::new();
        let first = HoverLocation::new(URI, 3, 8);
        state.request(first.clone());
        state.mark_waiting();

        assert_eq!(
            state.request(HoverLocation::new(URI, 3, 10)),
            HoverContent::GeneratePrompt
        );
        assert_eq!(
            state.phase(),
            &HoverPhase::CancelledPendingAck { location: first }
        );
    }

    #[test]
    fn test_cancellation_ack_is_single_use() {
        let mut state = HoverState::new();
        let first = HoverLocation::new(URI, 3, 8);
        state.request(first.clone());
        state.mark_waiting();
        state.request(HoverLocation::new(URI, 20, 0));

        assert!(state.acknowledge_cancellation(&first));
        assert!(!state.acknowledge_cancellation(&first));
        assert_eq!(state.phase(), &HoverPhase::Idle);
    }

    #[test]
    fn test_cancellation_ack_requires_exact_location() {
        let mut state = HoverState::new();
        let first = HoverLocation::new(URI, 3, 8);
        state.request(first.clone());
        state.mark_waiting();
        state.request(HoverLocation::new(URI, 20, 0));

        assert!(!state.acknowledge_cancellation(&HoverLocation::new(URI, 3, 9)));
        assert!(state.acknowledge_cancellation(&first));
    }

    #[test]
    fn test_pending_cancellation_survives_new_request() {
        let mut state = HoverState::new();
        let first = HoverLocation::new(URI, 3, 8);
        state.request(first.clone());
        state.mark_waiting();
        state.request(HoverLocation::new(URI, 20, 0));
        state.request(HoverLocation::new(URI, 30, 0));

        assert!(state.acknowledge_cancellation(&first));
    }

    #[test]
    fn test_ready_is_cleared_by_new_hover() {
        let mut state = HoverState::new();
        state.request(HoverLocation::new(URI, 3, 8));
        state.deliver("old".to_string());

        assert_eq!(
            state.request(HoverLocation::new(URI, 4, 8)),
            HoverContent::GeneratePrompt
        );
        assert_eq!(state.phase(), &HoverPhase::Idle);
    }
}
