//! Scripted dialogue: linear preset lines, advanced with confirm

use tracing::debug;

/// Active scripted conversation
#[derive(Debug, Clone)]
struct ActiveScript {
    speaker: String,
    lines: Vec<String>,
    current: usize,
}

/// Plays an NPC's preset lines one after another
#[derive(Debug, Default)]
pub struct ScriptedDialogue {
    active: Option<ActiveScript>,
}

impl ScriptedDialogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start on the first line. An empty script shows a single ellipsis.
    pub fn start(&mut self, speaker: &str, lines: &[String]) {
        let lines = if lines.is_empty() {
            vec!["...".to_string()]
        } else {
            lines.to_vec()
        };
        debug!("Scripted dialogue with {}", speaker);
        self.active = Some(ActiveScript {
            speaker: speaker.to_string(),
            lines,
            current: 0,
        });
    }

    /// Start with `notice` shown before the regular lines
    pub fn start_with_notice(&mut self, speaker: &str, notice: &str, lines: &[String]) {
        let mut all = Vec::with_capacity(lines.len() + 1);
        all.push(notice.to_string());
        all.extend_from_slice(lines);
        self.start(speaker, &all);
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn speaker(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.speaker.as_str())
    }

    pub fn current_line(&self) -> Option<&str> {
        let active = self.active.as_ref()?;
        active.lines.get(active.current).map(String::as_str)
    }

    /// Move to the next line. Past the last one the conversation closes;
    /// returns whether it is still open.
    pub fn advance(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.current += 1;
        if active.current >= active.lines.len() {
            self.end();
            return false;
        }
        true
    }

    pub fn end(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_run_then_close() {
        let mut dialogue = ScriptedDialogue::new();
        dialogue.start("Tanaka", &lines(&["One", "Two"]));
        assert_eq!(dialogue.speaker(), Some("Tanaka"));
        assert_eq!(dialogue.current_line(), Some("One"));
        assert!(dialogue.advance());
        assert_eq!(dialogue.current_line(), Some("Two"));
        assert!(!dialogue.advance());
        assert!(!dialogue.is_active());

        // Starts over next time
        dialogue.start("Tanaka", &lines(&["One", "Two"]));
        assert_eq!(dialogue.current_line(), Some("One"));
    }

    #[test]
    fn test_notice_comes_first() {
        let mut dialogue = ScriptedDialogue::new();
        dialogue.start_with_notice("Prof", "Offline.", &lines(&["Hello."]));
        assert_eq!(dialogue.current_line(), Some("Offline."));
        dialogue.advance();
        assert_eq!(dialogue.current_line(), Some("Hello."));
    }

    #[test]
    fn test_empty_script() {
        let mut dialogue = ScriptedDialogue::new();
        dialogue.start("Cat", &[]);
        assert_eq!(dialogue.current_line(), Some("..."));
        assert!(!dialogue.advance());
    }
}
