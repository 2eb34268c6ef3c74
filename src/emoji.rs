//! Random emoji for demo message bodies.

use crate::config::ResolvedSettings;
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

/// Emoji picked for demo bodies, sorted by name.
///
/// Skin-tone, flag, clock and people variants are left out so every entry renders as a
/// single glyph on common handsets.
pub const EMOJI: &[(&str, &str)] = &[
    ("alien", "👽"),
    ("avocado", "🥑"),
    ("balloon", "🎈"),
    ("banana", "🍌"),
    ("bee", "🐝"),
    ("bell", "🔔"),
    ("bicycle", "🚲"),
    ("birthday_cake", "🎂"),
    ("books", "📚"),
    ("butterfly", "🦋"),
    ("cactus", "🌵"),
    ("camera", "📷"),
    ("carrot", "🥕"),
    ("cat", "🐈"),
    ("cherries", "🍒"),
    ("cookie", "🍪"),
    ("crab", "🦀"),
    ("crystal_ball", "🔮"),
    ("dolphin", "🐬"),
    ("doughnut", "🍩"),
    ("dragon", "🐉"),
    ("fire", "🔥"),
    ("four_leaf_clover", "🍀"),
    ("gem_stone", "💎"),
    ("ghost", "👻"),
    ("gift", "🎁"),
    ("guitar", "🎸"),
    ("hamburger", "🍔"),
    ("honey_pot", "🍯"),
    ("hot_pepper", "🌶"),
    ("key", "🔑"),
    ("koala", "🐨"),
    ("light_bulb", "💡"),
    ("lollipop", "🍭"),
    ("mushroom", "🍄"),
    ("octopus", "🐙"),
    ("owl", "🦉"),
    ("palm_tree", "🌴"),
    ("panda", "🐼"),
    ("party_popper", "🎉"),
    ("penguin", "🐧"),
    ("pineapple", "🍍"),
    ("pizza", "🍕"),
    ("rainbow", "🌈"),
    ("robot", "🤖"),
    ("rocket", "🚀"),
    ("rose", "🌹"),
    ("snail", "🐌"),
    ("snowflake", "❄"),
    ("sparkles", "✨"),
    ("sunflower", "🌻"),
    ("taco", "🌮"),
    ("tiger", "🐅"),
    ("trophy", "🏆"),
    ("turtle", "🐢"),
    ("unicorn", "🦄"),
    ("volcano", "🌋"),
    ("watermelon", "🍉"),
    ("zap", "⚡"),
];

/// Number of emoji appended to a demo body.
pub const DEMO_EMOJI_COUNT: usize = 6;

/// `size` distinct emoji in random order. Asking for more than the table holds returns
/// the whole table.
pub fn random_emoji<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<&'static str> {
    EMOJI
        .choose_multiple(rng, size)
        .map(|(_, icon)| *icon)
        .collect()
}

/// `"<project> (<ENV>) <8-char id> <emoji…>"`, used by `send --random`.
pub fn demo_body<R: Rng + ?Sized>(settings: &ResolvedSettings, rng: &mut R) -> String {
    let uid = Uuid::new_v4().simple().to_string();
    format!(
        "{} ({}) {} {}",
        settings.project_name(),
        settings.environment(),
        &uid[..8],
        random_emoji(rng, DEMO_EMOJI_COUNT).join(" ")
    )
}
