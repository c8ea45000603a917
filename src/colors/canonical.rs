//! Maps colour names from the naming service onto a small set of searchable words.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Basic colour words, in tie-break order for the substring scan.
pub const BASIC_COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "brown", "black", "white",
    "gray", "grey", "cream",
];

lazy_static! {
    static ref SPECIFIC_COLORS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for (name, basic) in [
            // reds and pinks
            ("crimson", "red"),
            ("scarlet", "red"),
            ("burgundy", "red"),
            ("maroon", "red"),
            ("wine", "red"),
            ("cherry", "red"),
            ("ruby", "red"),
            ("wine berry", "red"),
            ("rose", "pink"),
            ("salmon", "pink"),
            ("coral", "pink"),
            ("blush", "pink"),
            ("fuchsia", "pink"),
            ("magenta", "pink"),
            // blues
            ("navy", "blue"),
            ("royal blue", "blue"),
            ("sky blue", "blue"),
            ("azure", "blue"),
            ("cerulean", "blue"),
            ("cobalt", "blue"),
            ("indigo", "blue"),
            ("sapphire", "blue"),
            ("teal", "blue"),
            ("turquoise", "blue"),
            ("cyan", "blue"),
            ("aqua", "blue"),
            ("schooner", "blue"),
            // greens
            ("forest green", "green"),
            ("lime", "green"),
            ("olive", "green"),
            ("sage", "green"),
            ("mint", "green"),
            ("emerald", "green"),
            ("jade", "green"),
            ("pine", "green"),
            ("martini", "green"),
            // yellows
            ("gold", "yellow"),
            ("amber", "yellow"),
            ("lemon", "yellow"),
            ("mustard", "yellow"),
            ("canary", "yellow"),
            // off-whites
            ("cream", "cream"),
            ("ivory", "cream"),
            ("off-white", "cream"),
            ("eggshell", "cream"),
            ("vanilla", "cream"),
            ("silver", "cream"),
            // browns
            ("chocolate", "brown"),
            ("coffee", "brown"),
            ("espresso", "brown"),
            ("mahogany", "brown"),
            ("chestnut", "brown"),
            ("bronze", "brown"),
            ("rust", "brown"),
            ("copper", "brown"),
            ("tan", "brown"),
            ("beige", "brown"),
            ("khaki", "brown"),
            ("camel", "brown"),
            ("whiskey", "brown"),
            // purples
            ("violet", "purple"),
            ("lavender", "purple"),
            ("plum", "purple"),
            ("grape", "purple"),
            ("orchid", "purple"),
            ("lilac", "purple"),
            ("amethyst", "purple"),
            ("rum", "purple"),
            // oranges
            ("peach", "orange"),
            ("apricot", "orange"),
            ("tangerine", "orange"),
            ("papaya", "orange"),
            ("pumpkin", "orange"),
            ("sunset", "orange"),
            // grays
            ("charcoal", "gray"),
            ("slate", "gray"),
            ("ash", "gray"),
            ("smoke", "gray"),
            ("pewter", "gray"),
            ("steel", "gray"),
            ("graphite", "gray"),
            ("dolphin", "gray"),
            ("storm cloud", "gray"),
            // blacks and whites
            ("manatee", "black"),
            ("shark", "black"),
            ("midnight", "black"),
            ("onyx", "black"),
            ("snow", "white"),
            ("pearl", "white"),
            ("coconut", "white"),
            ("timberwolf", "white"),
        ] {
            m.insert(name, basic);
        }
        m
    };
}

/// Exact table match first, then the first basic colour word contained in the name.
/// Names matching neither are returned unchanged.
pub fn canonicalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    if let Some(basic) = SPECIFIC_COLORS.get(lowered.as_str()) {
        return basic.to_string();
    }

    BASIC_COLORS
        .iter()
        .copied()
        .find(|basic| lowered.contains(basic))
        .map(|basic| if basic == "grey" { "gray" } else { basic })
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}
