//! Canned lines used without a network round trip

use rand::seq::SliceRandom;
use rand::Rng;

/// Shown while waiting for the model
pub const THINKING: &str = "Thinking...";

/// Shown once when a model conversation fails and scripted lines take over
pub const FALLBACK_NOTICE: &str = "AI chat failed, switching to preset lines.";

const DEFAULT_GREETINGS: &[&str] = &[
    "Hi, what's up?",
    "Oh, it's you!",
    "Anything I can help you with?",
    "Nice weather today, isn't it?",
    "Hello!",
];

const GREETINGS: &[(&str, &[&str])] = &[
    (
        "Xiao Ming",
        &[
            "Hi there! Need something?",
            "Welcome to campus! I'm in the English department.",
            "Hey! Are you a freshman?",
            "There's an English corner today, want to come?",
            "Nice to meet you!",
        ],
    ),
    (
        "Xiao Hong",
        &[
            "Bonjour! Hello~",
            "Hi! The weather is lovely today!",
            "Do you like walking around here too?",
            "Oops, you caught me slacking off~",
            "Salut! What's up?",
        ],
    ),
    (
        "Xiao Li",
        &[
            "Konnichiwa! Oh, hello!",
            "Just came out of the library, my eyes are so tired...",
            "Are you here to borrow books too?",
            "I'm reading Murakami today~",
            "Oh, hi hi!",
        ],
    ),
    (
        "Professor Wang",
        &[
            "Ah, hello there.",
            "Any academic questions to discuss?",
            "Young people should read more.",
            "Today's weather is good for a walk.",
            "Hm? Looking for me?",
        ],
    ),
    (
        "Teacher Li",
        &[
            "Marhaba! Ah, hello!",
            "Arabic is fun, want to learn?",
            "Hello! You look energetic today.",
            "Did you join the event at the little plaza?",
            "Anything I can help with?",
        ],
    ),
    (
        "Auntie Zhang",
        &[
            "Oh my, a student!",
            "Have you eaten? Great dishes today!",
            "Come, come, I'll give you an extra scoop!",
            "Studying is hard work, eat well!",
            "What would you like today?",
        ],
    ),
    (
        "Tanaka",
        &[
            "Ah, konnichiwa!",
            "Hello! My Chinese isn't very good...",
            "The campus is really beautiful!",
            "I've been studying abroad here for a year~",
            "Etto... hello, hello!",
        ],
    ),
    ("Big Orange", &["Meow~", "Meow meow?", "Purr purr...", "Meow! (stretches)", "...zzZ"]),
    ("Tangerine", &["Meow meow meow!", "Meow~ meow~", "(rubs against you)", "Meow! (hops around)", "Meow meow!"]),
    ("Huahua", &["Meow?", "Meow... (staring at the pond)", "(licks paw)", "Meow~ (watching the fish)", "Purr..."]),
    ("Shadow", &["Meow...", "... (watches you warily)", "Meow.", "(narrows eyes)", "...meow"]),
    ("Patches", &["Meow~", "Meow meow?", "(sunbathing)", "Meow~ (yawns)", "(rolls over)"]),
    ("Chubby", &["Meow meow!", "Meow~ (wags tail)", "Meow! Meow!", "(looks at you expectantly)", "Meow meow meow~"]),
];

/// Greeting pool for an NPC, falling back to generic lines
pub fn greetings_for(name: &str) -> &'static [&'static str] {
    GREETINGS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, lines)| *lines)
        .unwrap_or(DEFAULT_GREETINGS)
}

/// Pick an opening line for `name`
pub fn opening_line<R: Rng + ?Sized>(name: &str, rng: &mut R) -> &'static str {
    greetings_for(name).choose(rng).copied().unwrap_or("Hello!")
}
