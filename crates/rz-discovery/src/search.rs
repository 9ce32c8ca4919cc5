use crate::catalog::CatalogEntry;

pub const SEARCH_DEBOUNCE_MS: u128 = 250;

/// Case-insensitive substring filter; source order is kept.
pub fn filter_entries<'a, E: CatalogEntry>(entries: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|entry| {
            entry
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Holds keystrokes back until the input has been quiet for the debounce delay.
///
/// Time is passed in as epoch milliseconds so the same logic runs natively and
/// under `js_sys::Date::now()`.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    delay_ms: u128,
    pending: Option<(String, u128)>,
    applied: String,
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE_MS)
    }
}

impl QueryDebouncer {
    pub fn new(delay_ms: u128) -> Self {
        Self {
            delay_ms,
            pending: None,
            applied: String::new(),
        }
    }

    /// Record a keystroke; restarts the quiet period.
    pub fn input(&mut self, query: &str, now_ms: u128) {
        self.pending = Some((query.to_owned(), now_ms + self.delay_ms));
    }

    /// When the pending query becomes due, if any.
    pub fn deadline(&self) -> Option<u128> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Apply the pending query if its quiet period elapsed.
    ///
    /// Returns the newly applied query, or `None` when nothing changed.
    pub fn poll(&mut self, now_ms: u128) -> Option<&str> {
        match self.pending.take() {
            Some((query, due)) if due <= now_ms => {
                if query == self.applied {
                    return None;
                }
                self.applied = query;
                Some(self.applied.as_str())
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn applied(&self) -> &str {
        &self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rz_api_types::{AiService, Restaurant};

    fn restaurant(id: &str, name: &str, address: &str) -> Restaurant {
        Restaurant {
            id: id.to_owned(),
            name: name.to_owned(),
            address: address.to_owned(),
            description: None,
            domain: None,
            lat: None,
            lon: None,
            cashback_rate: None,
            logo_url: None,
            handle: None,
            currency: None,
        }
    }

    #[test]
    fn matches_name_case_insensitively() {
        let catalog = vec![
            restaurant("1", "Cafe Aroma", ""),
            restaurant("2", "Bistro Noir", ""),
        ];

        let hits = filter_entries(&catalog, "aroma");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        let hits = filter_entries(&catalog, "AROMA");
        assert_eq!(hits[0].id, "1");
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let catalog = vec![
            restaurant("1", "Cafe Aroma", ""),
            restaurant("2", "Bistro Noir", ""),
        ];

        let ids: Vec<&str> = filter_entries(&catalog, "")
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2"]);

        assert_eq!(filter_entries(&catalog, "   ").len(), 2);
    }

    #[test]
    fn matches_address_and_domain() {
        let mut noir = restaurant("2", "Bistro Noir", "55 Market Street");
        noir.domain = Some("bistronoir.example".to_owned());
        let catalog = vec![restaurant("1", "Cafe Aroma", "1 Main St"), noir];

        assert_eq!(filter_entries(&catalog, "market")[0].id, "2");
        assert_eq!(filter_entries(&catalog, "noir.example")[0].id, "2");
        assert!(filter_entries(&catalog, "sushi").is_empty());
    }

    #[test]
    fn ai_services_match_category_and_description() {
        let catalog = vec![AiService {
            id: "a1".into(),
            name: "Scribe".into(),
            category: "Writing".into(),
            description: "Drafts emails".into(),
            domain: None,
            cashback_rate: None,
            logo_url: None,
            handle: None,
        }];

        assert_eq!(filter_entries(&catalog, "writing").len(), 1);
        assert_eq!(filter_entries(&catalog, "emails").len(), 1);
    }

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut debouncer = QueryDebouncer::default();

        debouncer.input("a", 1_000);
        debouncer.input("ar", 1_100);
        debouncer.input("aro", 1_200);

        assert_eq!(debouncer.poll(1_300), None);
        assert_eq!(debouncer.poll(1_449), None);
        assert_eq!(debouncer.deadline(), Some(1_450));
        assert_eq!(debouncer.poll(1_450), Some("aro"));
        assert_eq!(debouncer.applied(), "aro");
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn early_poll_keeps_pending_query_for_a_later_one() {
        let mut debouncer = QueryDebouncer::new(250);
        debouncer.input("taco", 1_000);

        // A clock rounded down to 100 ms reads 1_200 although 250 ms have passed.
        assert_eq!(debouncer.poll(1_200), None);
        assert_eq!(debouncer.deadline(), Some(1_250));
        assert_eq!(debouncer.applied(), "");

        assert_eq!(debouncer.poll(1_300), Some("taco"));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn unchanged_query_is_not_reapplied() {
        let mut debouncer = QueryDebouncer::new(250);
        debouncer.input("noir", 0);
        assert_eq!(debouncer.poll(250), Some("noir"));

        debouncer.input("noir", 300);
        assert_eq!(debouncer.poll(600), None);
    }
}
