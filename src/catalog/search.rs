//! Search-as-you-type over the bird list.
//!
//! Filtering is a plain case-insensitive substring match over both name
//! fields. The debouncer delays acting on a query until the typist pauses;
//! superseded queries are not cancelled mid-timer, their completions are
//! simply ignored (the same stale-completion guard the image binding
//! uses).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::DEFAULT_SEARCH_DEBOUNCE_MS;

use super::client::Bird;

/// Case-insensitive substring filter over english and latin names.
///
/// A blank query matches everything.
pub fn filter_birds<'a>(birds: &'a [Bird], query: &str) -> Vec<&'a Bird> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return birds.iter().collect();
    }

    birds
        .iter()
        .filter(|bird| {
            bird.english_name.to_lowercase().contains(&term)
                || bird.latin_name.to_lowercase().contains(&term)
        })
        .collect()
}

/// Debounces successive queries: only the query still current after the
/// delay is acted on.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    /// Create a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit a query. Resolves to `Some(query)` after the delay if no
    /// newer query arrived in the meantime, `None` if superseded.
    pub async fn submit(&self, query: &str) -> Option<String> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::SeqCst) == generation {
            Some(query.to_string())
        } else {
            None
        }
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird(english: &str, latin: &str) -> Bird {
        Bird {
            id: english.to_lowercase(),
            thumb_url: format!("https://cdn.example.com/{}.jpg", english.to_lowercase()),
            image_url: String::new(),
            english_name: english.to_string(),
            latin_name: latin.to_string(),
            notes: vec![],
        }
    }

    fn aviary() -> Vec<Bird> {
        vec![
            bird("Barn Owl", "Tyto alba"),
            bird("Common Kingfisher", "Alcedo atthis"),
            bird("Eurasian Magpie", "Pica pica"),
        ]
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let birds = aviary();
        assert_eq!(filter_birds(&birds, "").len(), 3);
        assert_eq!(filter_birds(&birds, "   ").len(), 3);
    }

    #[test]
    fn test_filter_is_case_insensitive_on_english_name() {
        let birds = aviary();
        let matches = filter_birds(&birds, "OWL");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].english_name, "Barn Owl");
    }

    #[test]
    fn test_filter_matches_latin_name() {
        let birds = aviary();
        let matches = filter_birds(&birds, "pica");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].english_name, "Eurasian Magpie");
    }

    #[test]
    fn test_filter_matches_substrings() {
        let birds = aviary();
        let matches = filter_birds(&birds, "king");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].english_name, "Common Kingfisher");
    }

    #[test]
    fn test_filter_no_match_returns_empty() {
        let birds = aviary();
        assert!(filter_birds(&birds, "penguin").is_empty());
    }

    #[tokio::test]
    async fn test_lone_query_survives_debounce() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(10));
        assert_eq!(debouncer.submit("owl").await, Some("owl".to_string()));
    }

    #[tokio::test]
    async fn test_superseded_query_is_dropped() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(50));

        let stale = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.submit("ow").await })
        };
        // A newer keystroke arrives before the first delay elapses
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fresh = debouncer.submit("owl").await;

        assert_eq!(stale.await.unwrap(), None);
        assert_eq!(fresh, Some("owl".to_string()));
    }

    #[test]
    fn test_default_debounce_delay() {
        let debouncer = SearchDebouncer::default();
        assert_eq!(
            debouncer.delay,
            Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS)
        );
    }
}
