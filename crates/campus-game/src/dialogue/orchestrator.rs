//! Model-driven conversation with one NPC at a time

use campus_core::ActionKind;
use campus_integration::{ChatFailure, ChatMessage, ChatOutcome, ChatRole, ChatService};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::canned::{opening_line, FALLBACK_NOTICE, THINKING};
use super::directive::{parse_reply, Directive};

/// Where the conversation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialoguePhase {
    /// No conversation
    Idle,
    /// Waiting for the player to type
    AwaitingInput,
    /// A request is in flight
    AwaitingModel,
    /// A reply is being revealed; the player may already type
    Revealing,
}

/// Conversation tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Most recent turns sent with each request
    pub history_window: usize,
    /// Ticks per revealed character
    pub reveal_ticks_per_char: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            history_window: 20,
            reveal_ticks_per_char: 2,
        }
    }
}

/// An action the model agreed to, waiting for the conversation to close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub target_npc: String,
}

#[derive(Debug)]
struct Conversation {
    participant: String,
    persona: String,
    capabilities: Vec<ActionKind>,
    history: Vec<ChatMessage>,
    draft: String,
    reply: String,
    revealed: usize,
    reveal_timer: u32,
}

impl Conversation {
    fn show(&mut self, reply: impl Into<String>) {
        self.reply = reply.into();
        self.revealed = 0;
        self.reveal_timer = 0;
    }

    fn reveal_done(&self) -> bool {
        self.revealed >= self.reply.chars().count()
    }
}

/// What a renderer needs to draw the conversation box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub participant: String,
    /// Revealed prefix of the current reply
    pub reply: String,
    pub draft: String,
    pub thinking: bool,
    pub phase: DialoguePhase,
}

/// Drives one conversation through a [`ChatService`].
///
/// Requests never overlap: a submit is refused while the service still holds
/// an unclaimed call, including one left over from a conversation that was
/// closed early. Such a stale result is polled and dropped.
#[derive(Debug)]
pub struct DialogueOrchestrator {
    config: DialogueConfig,
    phase: DialoguePhase,
    active: Option<Conversation>,
    pending_action: Option<PendingAction>,
    failure: Option<String>,
    last_error: Option<ChatFailure>,
}

impl Default for DialogueOrchestrator {
    fn default() -> Self {
        Self::new(DialogueConfig::default())
    }
}

impl DialogueOrchestrator {
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            config,
            phase: DialoguePhase::Idle,
            active: None,
            pending_action: None,
            failure: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn participant(&self) -> Option<&str> {
        self.active.as_ref().map(|c| c.participant.as_str())
    }

    /// Turns exchanged so far in the active conversation
    pub fn history(&self) -> &[ChatMessage] {
        self.active.as_ref().map(|c| c.history.as_slice()).unwrap_or(&[])
    }

    /// The failure that ended the last conversation, if any
    pub fn last_error(&self) -> Option<&ChatFailure> {
        self.last_error.as_ref()
    }

    /// Open a conversation with a canned greeting. Refused while one is open.
    pub fn start_dialogue<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        persona: &str,
        capabilities: &[ActionKind],
        rng: &mut R,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }

        let mut conversation = Conversation {
            participant: name.to_string(),
            persona: persona.to_string(),
            capabilities: capabilities.to_vec(),
            history: Vec::new(),
            draft: String::new(),
            reply: String::new(),
            revealed: 0,
            reveal_timer: 0,
        };
        conversation.show(opening_line(name, rng));

        self.active = Some(conversation);
        self.phase = DialoguePhase::AwaitingInput;
        self.failure = None;
        self.last_error = None;
        info!("AI dialogue started with {}", name);
        true
    }

    /// Close the conversation and drop its history. A pending action survives.
    pub fn end_dialogue(&mut self) {
        if let Some(conversation) = self.active.take() {
            info!("AI dialogue with {} ended", conversation.participant);
        }
        self.phase = DialoguePhase::Idle;
    }

    /// Append typed characters to the draft
    pub fn push_text(&mut self, text: &str) {
        if self.phase == DialoguePhase::AwaitingModel {
            return;
        }
        if let Some(conversation) = self.active.as_mut() {
            conversation.draft.push_str(text);
        }
    }

    /// Delete the last draft character
    pub fn delete_char(&mut self) {
        if let Some(conversation) = self.active.as_mut() {
            conversation.draft.pop();
        }
    }

    /// Send the current draft
    pub fn submit_draft(&mut self, client: &mut dyn ChatService) -> bool {
        let draft = match self.active.as_ref() {
            Some(conversation) => conversation.draft.clone(),
            None => return false,
        };
        let sent = self.submit(&draft, client);
        if sent {
            if let Some(conversation) = self.active.as_mut() {
                conversation.draft.clear();
            }
        }
        sent
    }

    /// Send a player message. Refused when blank, with no open conversation,
    /// while waiting for the model, or while the service still holds a call.
    pub fn submit(&mut self, text: &str, client: &mut dyn ChatService) -> bool {
        let text = text.trim();
        if text.is_empty() || self.phase == DialoguePhase::AwaitingModel || client.is_in_flight() {
            return false;
        }
        let Some(conversation) = self.active.as_mut() else {
            return false;
        };

        conversation.history.push(ChatMessage::user(text));
        let messages = build_messages(conversation, self.config.history_window);

        if let Err(e) = client.chat_async(messages) {
            warn!("Chat request refused: {}", e);
            conversation.history.pop();
            return false;
        }

        conversation.show(String::new());
        self.phase = DialoguePhase::AwaitingModel;
        debug!("Sent message to {}", conversation.participant);

        // A disabled service answers at once
        self.poll(client);
        true
    }

    /// Per-tick update: claim model results and advance the reveal
    pub fn update(&mut self, client: &mut dyn ChatService) {
        self.poll(client);

        let Some(conversation) = self.active.as_mut() else {
            return;
        };
        if self.phase == DialoguePhase::AwaitingModel || conversation.reveal_done() {
            return;
        }

        conversation.reveal_timer += 1;
        if conversation.reveal_timer >= self.config.reveal_ticks_per_char {
            conversation.reveal_timer = 0;
            conversation.revealed += 1;
        }
        if conversation.reveal_done() && self.phase == DialoguePhase::Revealing {
            self.phase = DialoguePhase::AwaitingInput;
        }
    }

    /// Show the whole reply at once
    pub fn skip_reveal(&mut self) {
        if self.phase == DialoguePhase::AwaitingModel {
            return;
        }
        if let Some(conversation) = self.active.as_mut() {
            conversation.revealed = conversation.reply.chars().count();
            if self.phase == DialoguePhase::Revealing {
                self.phase = DialoguePhase::AwaitingInput;
            }
        }
    }

    fn poll(&mut self, client: &mut dyn ChatService) {
        if !client.is_in_flight() {
            return;
        }
        let Some(outcome) = client.poll_result() else {
            return;
        };

        if self.phase != DialoguePhase::AwaitingModel {
            debug!("Discarding stale chat result");
            return;
        }
        self.handle_outcome(outcome);
    }

    fn handle_outcome(&mut self, outcome: ChatOutcome) {
        let Some(conversation) = self.active.as_mut() else {
            return;
        };

        match outcome {
            Ok(raw) => {
                let parsed = parse_reply(&raw, &conversation.capabilities);
                if let Directive::Action(kind) = parsed.directive {
                    info!("{} agreed to {}", conversation.participant, kind);
                    self.pending_action = Some(PendingAction {
                        kind,
                        target_npc: conversation.participant.clone(),
                    });
                }
                conversation.history.push(ChatMessage::assistant(parsed.text.clone()));
                conversation.show(parsed.text);
                self.phase = DialoguePhase::Revealing;
            }
            Err(failure) => {
                warn!("AI dialogue with {} failed: {}", conversation.participant, failure);
                self.failure = Some(FALLBACK_NOTICE.to_string());
                self.last_error = Some(failure);
                self.end_dialogue();
            }
        }
    }

    /// Take the action the model promised, once the conversation has closed
    pub fn take_pending_action(&mut self) -> Option<PendingAction> {
        if self.active.is_some() {
            return None;
        }
        self.pending_action.take()
    }

    /// Forget a promised action without running it
    pub fn discard_pending_action(&mut self) {
        self.pending_action = None;
    }

    /// One-shot notice that the last conversation failed
    pub fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }

    pub fn view(&self) -> Option<ConversationView> {
        let conversation = self.active.as_ref()?;
        Some(ConversationView {
            participant: conversation.participant.clone(),
            reply: if self.phase == DialoguePhase::AwaitingModel {
                THINKING.to_string()
            } else {
                conversation.reply.chars().take(conversation.revealed).collect()
            },
            draft: conversation.draft.clone(),
            thinking: self.phase == DialoguePhase::AwaitingModel,
            phase: self.phase,
        })
    }
}

fn system_prompt(conversation: &Conversation) -> String {
    let mut prompt = format!(
        "You are \"{}\", a character in a campus exploration game.\n{}\n\n\
         Conversation rules:\n\
         1. Always stay in character and speak in the first person.\n\
         2. Keep replies short and natural, under 50 words.\n\
         3. Show emotion and personality.\n\
         4. Never break character or mention being an AI.",
        conversation.participant, conversation.persona
    );

    if !conversation.capabilities.is_empty() {
        prompt.push_str("\n\nActions you can perform:");
        for kind in &conversation.capabilities {
            prompt.push('\n');
            prompt.push_str(&kind.prompt_grammar());
        }
        prompt.push_str("\n- Only use an action tag when the player clearly asks for it.");
        prompt.push_str("\n- Put the action tag at the very end of your reply.");
    }
    prompt
}

fn build_messages(conversation: &Conversation, window: usize) -> Vec<ChatMessage> {
    let skip = conversation.history.len().saturating_sub(window);
    let mut messages = Vec::with_capacity(window + 1);
    messages.push(ChatMessage::system(system_prompt(conversation)));
    messages.extend(
        conversation.history[skip..]
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .cloned(),
    );
    messages
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use campus_integration::IntegrationError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Scripted chat service: answers are released one at a time by the test
    #[derive(Default)]
    struct FakeChat {
        available: bool,
        in_flight: bool,
        ready: VecDeque<ChatOutcome>,
        sent: Vec<Vec<ChatMessage>>,
    }

    impl FakeChat {
        fn online() -> Self {
            Self {
                available: true,
                ..Self::default()
            }
        }

        fn resolve(&mut self, outcome: ChatOutcome) {
            self.ready.push_back(outcome);
        }
    }

    impl ChatService for FakeChat {
        fn is_available(&self) -> bool {
            self.available
        }

        fn is_in_flight(&self) -> bool {
            self.in_flight
        }

        fn chat_async(&mut self, messages: Vec<ChatMessage>) -> Result<(), IntegrationError> {
            if self.in_flight {
                return Err(IntegrationError::Busy);
            }
            self.sent.push(messages);
            self.in_flight = true;
            if !self.available {
                self.ready.push_back(Err(ChatFailure::Unavailable));
            }
            Ok(())
        }

        fn poll_result(&mut self) -> Option<ChatOutcome> {
            if !self.in_flight {
                return None;
            }
            let outcome = self.ready.pop_front()?;
            self.in_flight = false;
            Some(outcome)
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn started() -> DialogueOrchestrator {
        let mut dialogue = DialogueOrchestrator::default();
        assert!(dialogue.start_dialogue("Prof", "A cheerful professor.", &[ActionKind::Exercise], &mut rng()));
        dialogue
    }

    fn reveal_all(dialogue: &mut DialogueOrchestrator, client: &mut FakeChat) {
        for _ in 0..1000 {
            dialogue.update(client);
        }
    }

    #[test]
    fn test_start_shows_greeting_without_network() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingInput);
        assert!(dialogue.history().is_empty());
        assert!(client.sent.is_empty());

        reveal_all(&mut dialogue, &mut client);
        let view = dialogue.view().unwrap();
        assert!(crate::dialogue::canned::greetings_for("Prof").contains(&view.reply.as_str()));
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingInput);
    }

    #[test]
    fn test_start_refused_while_open() {
        let mut dialogue = started();
        assert!(!dialogue.start_dialogue("Other", "", &[], &mut rng()));
        assert_eq!(dialogue.participant(), Some("Prof"));
    }

    #[test]
    fn test_reply_with_directive() {
        let mut client = FakeChat::online();
        let mut dialogue = started();

        assert!(dialogue.submit("let's play", &mut client));
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingModel);
        assert!(dialogue.view().unwrap().thinking);
        assert_eq!(dialogue.view().unwrap().reply, THINKING);

        client.resolve(Ok("Sure! [ACTION:Exercise]".into()));
        dialogue.update(&mut client);
        assert_eq!(dialogue.phase(), DialoguePhase::Revealing);

        reveal_all(&mut dialogue, &mut client);
        assert_eq!(dialogue.view().unwrap().reply, "Sure!");
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingInput);

        let history = dialogue.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ChatMessage::user("let's play"));
        assert_eq!(history[1], ChatMessage::assistant("Sure!"));

        // Held until the conversation closes, then handed out once
        assert_eq!(dialogue.take_pending_action(), None);
        dialogue.end_dialogue();
        assert_eq!(
            dialogue.take_pending_action(),
            Some(PendingAction {
                kind: ActionKind::Exercise,
                target_npc: "Prof".into(),
            })
        );
        assert_eq!(dialogue.take_pending_action(), None);
    }

    #[test]
    fn test_disabled_service_fails_once() {
        let mut client = FakeChat::default();
        let mut dialogue = started();

        assert!(dialogue.submit("hi", &mut client));
        assert!(!dialogue.is_active());
        assert_eq!(dialogue.phase(), DialoguePhase::Idle);
        assert_eq!(dialogue.last_error(), Some(&ChatFailure::Unavailable));
        assert_eq!(dialogue.take_failure().as_deref(), Some(FALLBACK_NOTICE));
        assert_eq!(dialogue.take_failure(), None);
        assert_eq!(dialogue.take_pending_action(), None);
    }

    #[test]
    fn test_error_sentinel_is_not_parsed() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        dialogue.submit("hi", &mut client);
        client.resolve(Err(ChatFailure::Error("[ACTION:Exercise] timed out".into())));
        dialogue.update(&mut client);

        assert!(!dialogue.is_active());
        assert!(dialogue.take_failure().is_some());
        assert_eq!(dialogue.take_pending_action(), None);
    }

    #[test]
    fn test_submit_rejected_while_awaiting_model() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        assert!(dialogue.submit("one", &mut client));
        assert!(!dialogue.submit("two", &mut client));
        assert_eq!(client.sent.len(), 1);
        assert_eq!(dialogue.history().len(), 1);
    }

    #[test]
    fn test_submit_allowed_while_revealing() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        dialogue.submit("one", &mut client);
        client.resolve(Ok("A rather long answer to reveal slowly.".into()));
        dialogue.update(&mut client);
        assert_eq!(dialogue.phase(), DialoguePhase::Revealing);

        assert!(dialogue.submit("two", &mut client));
        assert_eq!(dialogue.history().len(), 3);
    }

    #[test]
    fn test_blank_and_inactive_submits_are_noops() {
        let mut client = FakeChat::online();
        let mut dialogue = DialogueOrchestrator::default();
        assert!(!dialogue.submit("hello", &mut client));

        dialogue.start_dialogue("Prof", "", &[], &mut rng());
        assert!(!dialogue.submit("   ", &mut client));
        assert!(client.sent.is_empty());
    }

    #[test]
    fn test_one_action_per_turn() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        for _ in 0..2 {
            dialogue.submit("play?", &mut client);
            client.resolve(Ok("Yes! [ACTION:Exercise]".into()));
            dialogue.update(&mut client);
        }
        dialogue.end_dialogue();
        assert!(dialogue.take_pending_action().is_some());
        assert!(dialogue.take_pending_action().is_none());
    }

    #[test]
    fn test_stale_result_after_end_is_discarded() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        dialogue.submit("let's play", &mut client);
        dialogue.end_dialogue();

        // Still in flight: a new conversation cannot send yet
        assert!(dialogue.start_dialogue("Prof", "persona", &[ActionKind::Exercise], &mut rng()));
        assert!(!dialogue.submit("hello?", &mut client));

        client.resolve(Ok("Sure! [ACTION:Exercise]".into()));
        dialogue.update(&mut client);
        assert!(dialogue.is_active());
        assert!(dialogue.history().is_empty());
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingInput);
        dialogue.end_dialogue();
        assert_eq!(dialogue.take_pending_action(), None);
        assert_eq!(dialogue.take_failure(), None);

        // And the service is free again
        dialogue.start_dialogue("Prof", "persona", &[], &mut rng());
        assert!(dialogue.submit("hello?", &mut client));
    }

    #[test]
    fn test_request_shape_and_window() {
        let mut client = FakeChat::online();
        let mut dialogue = DialogueOrchestrator::new(DialogueConfig {
            history_window: 4,
            reveal_ticks_per_char: 1,
        });
        dialogue.start_dialogue("Prof", "Teaches physics.", &[ActionKind::Exercise], &mut rng());

        for i in 0..3 {
            dialogue.submit(&format!("q{}", i), &mut client);
            client.resolve(Ok(format!("a{}", i)));
            dialogue.update(&mut client);
        }
        dialogue.submit("q3", &mut client);

        let last = client.sent.last().unwrap();
        assert_eq!(last.len(), 5);
        assert_eq!(last[0].role, ChatRole::System);
        assert!(last[0].content.contains("Teaches physics."));
        assert!(last[0].content.contains("[ACTION:Exercise]"));
        assert_eq!(last[1], ChatMessage::assistant("a1"));
        assert_eq!(last[4], ChatMessage::user("q3"));
    }

    #[test]
    fn test_prompt_without_capabilities_has_no_grammar() {
        let mut client = FakeChat::online();
        let mut dialogue = DialogueOrchestrator::default();
        dialogue.start_dialogue("Xiao Ming", "A student.", &[], &mut rng());
        dialogue.submit("hi", &mut client);
        assert!(!client.sent[0][0].content.contains("[ACTION:"));
    }

    #[test]
    fn test_draft_editing() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        dialogue.push_text("hey");
        dialogue.delete_char();
        dialogue.push_text("llo");
        assert_eq!(dialogue.view().unwrap().draft, "hello");
        assert!(dialogue.submit_draft(&mut client));
        assert_eq!(dialogue.view().unwrap().draft, "");
        assert_eq!(dialogue.history()[0], ChatMessage::user("hello"));
    }

    #[test]
    fn test_reveal_cadence() {
        let mut client = FakeChat::online();
        let mut dialogue = started();
        dialogue.submit("hi", &mut client);
        client.resolve(Ok("Hello".into()));
        dialogue.update(&mut client);
        assert_eq!(dialogue.view().unwrap().reply, "");

        // Two ticks per character
        dialogue.update(&mut client);
        dialogue.update(&mut client);
        assert_eq!(dialogue.view().unwrap().reply, "H");

        dialogue.skip_reveal();
        assert_eq!(dialogue.view().unwrap().reply, "Hello");
        assert_eq!(dialogue.phase(), DialoguePhase::AwaitingInput);
    }
}
