//! Action directives embedded in model replies

use campus_core::ActionKind;

/// What a reply asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    None,
    Action(ActionKind),
}

/// A model reply split into visible text and directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub text: String,
    pub directive: Directive,
}

/// Split a raw reply. Only tokens for `capabilities` are recognised; the first
/// capability whose token appears wins, and every recognised token is removed
/// from the visible text. Anything else, including tokens for undeclared
/// actions, stays as literal text.
pub fn parse_reply(raw: &str, capabilities: &[ActionKind]) -> ParsedReply {
    let mut directive = Directive::None;
    let mut text = raw.to_string();

    for kind in capabilities {
        let token = kind.token();
        if text.contains(&token) {
            if directive == Directive::None {
                directive = Directive::Action(*kind);
            }
            text = text.replace(&token, "");
        }
    }

    ParsedReply {
        text: text.trim().to_string(),
        directive,
    }
}
