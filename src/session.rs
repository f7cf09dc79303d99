//! The mutable state of one running assistant.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingTask {
    Reminder,
    News,
    Call,
}

/// Where the conversation stands. Waiting for a follow-up always carries the
/// task the answer is for, so the two can never disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingFollowUp(PendingTask),
}

impl ConversationState {
    #[must_use]
    pub fn awaiting_follow_up(self) -> bool {
        matches!(self, Self::AwaitingFollowUp(_))
    }

    #[must_use]
    pub fn pending_task(self) -> Option<PendingTask> {
        match self {
            Self::Idle => None,
            Self::AwaitingFollowUp(task) => Some(task),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub listening: bool,
    pub last_transcript: String,
    pub last_response: String,
    pub conversation: ConversationState,
}

impl SessionState {
    #[must_use]
    pub fn awaiting_follow_up(&self) -> bool {
        self.conversation.awaiting_follow_up()
    }

    #[must_use]
    pub fn pending_task(&self) -> Option<PendingTask> {
        self.conversation.pending_task()
    }
}
