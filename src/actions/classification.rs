use super::Intent;

/// Classifies a transcript by case-insensitive substring search. The first
/// intent in [`Intent::variants`] whose keyword occurs anywhere in the text
/// wins, so "recall" counts as a call and "call with a news reminder" is a
/// reminder.
#[must_use]
pub fn classify(transcript: &str) -> Intent {
    let transcript = transcript.to_lowercase();
    Intent::variants()
        .into_iter()
        .find(|intent| {
            intent
                .keyword()
                .is_some_and(|keyword| transcript.contains(keyword))
        })
        .unwrap_or(Intent::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_each_keyword() {
        assert_eq!(classify("set a reminder"), Intent::Reminder);
        assert_eq!(classify("what's the weather"), Intent::Weather);
        assert_eq!(classify("tell me the news"), Intent::News);
        assert_eq!(classify("call someone"), Intent::Call);
        assert_eq!(classify("how tall is mount everest"), Intent::Fallback);
    }

    #[test]
    fn ignores_case() {
        assert_eq!(classify("REMINDER please"), Intent::Reminder);
        assert_eq!(classify("Weather In Paris"), Intent::Weather);
        assert_eq!(classify("Latest NeWs"), Intent::News);
    }

    #[test]
    fn reminder_wins_over_everything_else() {
        assert_eq!(classify("call with a news reminder"), Intent::Reminder);
        assert_eq!(classify("weather reminder"), Intent::Reminder);
    }

    #[test]
    fn weather_wins_over_news_and_call() {
        assert_eq!(classify("call me with weather news"), Intent::Weather);
    }

    #[test]
    fn news_wins_over_call() {
        assert_eq!(classify("call and read the news"), Intent::News);
    }

    #[test]
    fn keywords_match_inside_words() {
        assert_eq!(classify("I can't recall"), Intent::Call);
        assert_eq!(classify("newsletter"), Intent::News);
    }

    #[test]
    fn empty_text_falls_back() {
        assert_eq!(classify(""), Intent::Fallback);
        assert_eq!(classify("   "), Intent::Fallback);
    }
}
